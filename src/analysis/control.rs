use crate::analysis::{stats, Analyzer};
use crate::types::{AnomalyFinding, Category, Severity, TelemetryTable};

const ATTITUDE_AXES: [&str; 3] = ["Roll", "Pitch", "Yaw"];
/// Single-step attitude change flagged as instability (deg)
const UNSTABLE_CHANGE_DEG: f64 = 30.0;
const SEVERE_CHANGE_DEG: f64 = 60.0;
/// Attitude magnitude considered extreme (deg)
const EXTREME_ATTITUDE_DEG: f64 = 45.0;

/// Attitude instability and extreme attitudes, per axis
pub struct ControlAnalyzer;

fn analyze_axis(axis: &str, values: &[f64], issues: &mut Vec<AnomalyFinding>) {
    let label = axis.to_lowercase();

    let changes = stats::abs_diffs(values);
    if stats::count_where(&changes, |c| c > UNSTABLE_CHANGE_DEG) > 0 {
        let max_change = stats::max(&changes).unwrap_or_default();
        let severity = if max_change > SEVERE_CHANGE_DEG {
            Severity::High
        } else {
            Severity::Medium
        };
        issues.push(
            AnomalyFinding::new(
                format!("{}_instability", label),
                severity,
                format!("Large {} change detected: {:.1}°", axis, max_change),
            )
            .with_metric("max_change_deg", max_change)
            .with_metric("axis", label.as_str()),
        );
    }

    let magnitudes: Vec<f64> = values.iter().map(|v| v.abs()).collect();
    let max_attitude = stats::max(&magnitudes).unwrap_or_default();
    if max_attitude > EXTREME_ATTITUDE_DEG {
        issues.push(
            AnomalyFinding::new(
                format!("extreme_{}", label),
                Severity::High,
                format!("Extreme {} attitude: {:.1}°", axis, max_attitude),
            )
            .with_metric("max_attitude_deg", max_attitude)
            .with_metric("axis", label.as_str()),
        );
    }
}

impl Analyzer for ControlAnalyzer {
    fn name(&self) -> &'static str {
        "control"
    }

    fn category(&self) -> Category {
        Category::Control
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &["Roll", "Pitch", "Yaw", "DesRoll", "DesPitch"]
    }

    fn analyze(&self, table: &TelemetryTable) -> Vec<AnomalyFinding> {
        let mut issues = Vec::new();
        for axis in ATTITUDE_AXES {
            let values = table.numeric_column(axis);
            if values.len() > 1 {
                analyze_axis(axis, &values, &mut issues);
            }
        }
        issues
    }
}
