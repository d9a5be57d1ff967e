use crate::analysis::{stats, Analyzer};
use crate::types::{AnomalyFinding, Category, Severity, TelemetryTable};

/// Step increase in waypoint distance counted as moving away (m)
const WP_RECEDE_STEP: f64 = 10.0;
/// Share of samples that must be receding steps
const WP_RECEDE_RATIO: f64 = 0.3;
const MAX_CLIMB_RATE_CMS: f64 = 500.0;

/// Waypoint tracking and climb rate
pub struct NavigationAnalyzer;

impl Analyzer for NavigationAnalyzer {
    fn name(&self) -> &'static str {
        "navigation"
    }

    fn category(&self) -> Category {
        Category::Navigation
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &["WPDst", "CRt", "VelX", "VelY"]
    }

    fn analyze(&self, table: &TelemetryTable) -> Vec<AnomalyFinding> {
        let mut issues = Vec::new();

        let wp_dist = table.numeric_column("WPDst");
        if wp_dist.len() > 1 {
            let receding = stats::count_where(&stats::diffs(&wp_dist), |d| d > WP_RECEDE_STEP);
            if receding as f64 > wp_dist.len() as f64 * WP_RECEDE_RATIO {
                issues.push(
                    AnomalyFinding::new(
                        "waypoint_navigation_error",
                        Severity::Medium,
                        "Aircraft moving away from waypoint frequently",
                    )
                    .with_metric("max_wp_distance_m", stats::max(&wp_dist).unwrap_or_default()),
                );
            }
        }

        let climb: Vec<f64> = table
            .numeric_column("CRt")
            .into_iter()
            .map(f64::abs)
            .collect();
        if let Some(max_rate) = stats::max(&climb).filter(|r| *r > MAX_CLIMB_RATE_CMS) {
            issues.push(
                AnomalyFinding::new(
                    "excessive_climb_rate",
                    Severity::High,
                    format!("Excessive climb rate: {:.0} cm/s", max_rate),
                )
                .with_metric("max_climb_rate_cms", max_rate),
            );
        }

        issues
    }
}
