use crate::analysis::{stats, Analyzer};
use crate::types::{AnomalyFinding, Category, Severity, TelemetryTable};

/// Absolute single-step change above which altitude movement is flagged (m)
const LARGE_CHANGE_M: f64 = 20.0;
/// A large change beyond this is high severity (m)
const HIGH_CHANGE_M: f64 = 50.0;
/// Rise and fall needed on either side of a sample to call it a spike (m)
const SPIKE_DELTA_M: f64 = 15.0;
/// Lowest altitude tolerated below the takeoff point (m)
const NEGATIVE_ALTITUDE_M: f64 = -5.0;

/// Sudden altitude changes, single-sample spikes and descents below takeoff
pub struct AltitudeAnalyzer;

impl Analyzer for AltitudeAnalyzer {
    fn name(&self) -> &'static str {
        "altitude"
    }

    fn category(&self) -> Category {
        Category::Altitude
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &["Alt"]
    }

    fn analyze(&self, table: &TelemetryTable) -> Vec<AnomalyFinding> {
        let alt = table.numeric_column("Alt");
        let mut issues = Vec::new();
        if alt.len() < 2 {
            return issues;
        }

        let changes = stats::abs_diffs(&alt);
        let occurrences = stats::count_where(&changes, |c| c > LARGE_CHANGE_M);
        if occurrences > 0 {
            let max_change = stats::max(&changes).unwrap_or_default();
            let severity = if max_change > HIGH_CHANGE_M {
                Severity::High
            } else {
                Severity::Medium
            };
            issues.push(
                AnomalyFinding::new(
                    "large_altitude_change",
                    severity,
                    format!("Sudden altitude change of {:.1}m detected", max_change),
                )
                .with_metric("max_change_m", max_change)
                .with_metric("occurrences", occurrences),
            );
        }

        for i in 1..alt.len() - 1 {
            let rise = alt[i] - alt[i - 1];
            let fall = alt[i + 1] - alt[i];
            if rise > SPIKE_DELTA_M && fall < -SPIKE_DELTA_M {
                issues.push(
                    AnomalyFinding::new(
                        "altitude_spike",
                        Severity::Medium,
                        format!("Altitude spike detected at sample {}", i),
                    )
                    .with_metric("spike_magnitude_m", rise),
                );
            }
        }

        if let Some(min_alt) = stats::min(&alt).filter(|m| *m < NEGATIVE_ALTITUDE_M) {
            issues.push(
                AnomalyFinding::new(
                    "negative_altitude",
                    Severity::High,
                    format!("Aircraft went below takeoff altitude: {:.1}m", min_alt),
                )
                .with_metric("min_altitude_m", min_alt),
            );
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Metric, TelemetryFrame};

    fn table(alts: &[f64]) -> TelemetryTable {
        TelemetryTable::from_frames(
            alts.iter()
                .map(|a| TelemetryFrame::new("BARO").with_field("Alt", *a)),
        )
    }

    #[test]
    fn test_large_change_counts_and_severity() {
        let issues = AltitudeAnalyzer.analyze(&table(&[0.0, 25.0, 25.0, 90.0]));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, "large_altitude_change");
        assert_eq!(issues[0].severity, Severity::High);
        assert_eq!(issues[0].metric("max_change_m"), Some(&Metric::Value(65.0)));
        assert_eq!(issues[0].metric("occurrences"), Some(&Metric::Count(2)));
    }

    #[test]
    fn test_spike_needs_strict_rise_and_fall() {
        // Index 1 falls by exactly 15 afterwards, index 3 is a real spike
        let issues = AltitudeAnalyzer.analyze(&table(&[10.0, 26.0, 11.0, 27.0, 11.5]));
        let spikes: Vec<_> = issues
            .iter()
            .filter(|i| i.kind == "altitude_spike")
            .collect();
        assert_eq!(spikes.len(), 1);
        assert_eq!(spikes[0].description, "Altitude spike detected at sample 3");
        assert_eq!(spikes[0].metric("spike_magnitude_m"), Some(&Metric::Value(16.0)));
    }

    #[test]
    fn test_negative_altitude() {
        let issues = AltitudeAnalyzer.analyze(&table(&[0.0, -3.0, -6.0]));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, "negative_altitude");
        assert_eq!(issues[0].description, "Aircraft went below takeoff altitude: -6.0m");

        assert!(AltitudeAnalyzer.analyze(&table(&[0.0, -5.0])).is_empty());
    }

    #[test]
    fn test_single_value_is_ignored() {
        assert!(AltitudeAnalyzer.analyze(&table(&[-100.0])).is_empty());
    }
}
