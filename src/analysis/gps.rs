use crate::analysis::{stats, Analyzer};
use crate::types::{AnomalyFinding, Category, Severity, TelemetryTable};

const POOR_HDOP: f64 = 3.0;
const VERY_POOR_HDOP: f64 = 5.0;
const MIN_SATELLITES: f64 = 6.0;
/// Flat-earth conversion from degrees of latitude to meters
const METERS_PER_DEGREE: f64 = 111_000.0;
const POSITION_JUMP_M: f64 = 100.0;

/// GPS fix quality, satellite count and position jumps
pub struct GpsAnalyzer;

impl GpsAnalyzer {
    fn hdop(&self, table: &TelemetryTable, issues: &mut Vec<AnomalyFinding>) {
        let hdop = table.numeric_column("HDop");
        let poor: Vec<f64> = hdop.iter().copied().filter(|h| *h > POOR_HDOP).collect();
        let Some(avg_poor) = stats::mean(&poor) else {
            return;
        };

        let severity = if avg_poor > VERY_POOR_HDOP {
            Severity::High
        } else {
            Severity::Medium
        };
        issues.push(
            AnomalyFinding::new(
                "poor_gps_accuracy",
                severity,
                "Poor GPS accuracy detected (HDop > 3.0)",
            )
            .with_metric("max_hdop", stats::max(&hdop).unwrap_or_default())
            .with_metric("avg_poor_hdop", avg_poor)
            .with_metric("poor_samples", poor.len()),
        );
    }

    fn satellites(&self, table: &TelemetryTable, issues: &mut Vec<AnomalyFinding>) {
        let nsats = table.numeric_column("NSats");
        let low = stats::count_where(&nsats, |n| n < MIN_SATELLITES);
        if low == 0 {
            return;
        }

        let min_sats = stats::min(&nsats).unwrap_or_default().max(0.0) as usize;
        issues.push(
            AnomalyFinding::new(
                "insufficient_satellites",
                Severity::High,
                "Low satellite count detected (< 6 satellites)",
            )
            .with_metric("min_satellites", min_sats)
            .with_metric("low_sat_samples", low),
        );
    }

    /// Step distances pair the k-th latitude delta with the k-th longitude delta
    fn position_jumps(&self, table: &TelemetryTable, issues: &mut Vec<AnomalyFinding>) {
        let lat = table.numeric_column("Lat");
        let lng = table.numeric_column("Lng");
        if lat.len() < 2 || lng.len() < 2 {
            return;
        }

        let lng_scale = stats::mean(&lat).unwrap_or_default().to_radians().cos();
        let distances: Vec<f64> = stats::diffs(&lat)
            .into_iter()
            .zip(stats::diffs(&lng))
            .map(|(d_lat, d_lng)| {
                let lat_m = d_lat * METERS_PER_DEGREE;
                let lng_m = d_lng * METERS_PER_DEGREE * lng_scale;
                (lat_m * lat_m + lng_m * lng_m).sqrt()
            })
            .collect();

        let jump_count = stats::count_where(&distances, |d| d > POSITION_JUMP_M);
        if jump_count == 0 {
            return;
        }

        let max_jump = stats::max(&distances).unwrap_or_default();
        issues.push(
            AnomalyFinding::new(
                "gps_position_jump",
                Severity::Critical,
                format!("Large GPS position jump detected: {:.0}m", max_jump),
            )
            .with_metric("max_jump_m", max_jump)
            .with_metric("jump_count", jump_count),
        );
    }
}

impl Analyzer for GpsAnalyzer {
    fn name(&self) -> &'static str {
        "gps"
    }

    fn category(&self) -> Category {
        Category::Gps
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &["HDop", "NSats", "Lat", "Lng"]
    }

    fn analyze(&self, table: &TelemetryTable) -> Vec<AnomalyFinding> {
        let mut issues = Vec::new();
        self.hdop(table, &mut issues);
        self.satellites(table, &mut issues);
        self.position_jumps(table, &mut issues);
        issues
    }
}
