use crate::analysis::{stats, Analyzer};
use crate::types::{AnomalyFinding, Category, Severity, TelemetryTable};

/// Critical pack voltage for a 3S LiPo (V)
const CRITICAL_VOLTAGE: f64 = 11.1;
/// Warning pack voltage for a 3S LiPo (V)
const WARNING_VOLTAGE: f64 = 11.5;
/// Single-step voltage decrease treated as a sudden drop (V)
const SUDDEN_DROP_V: f64 = -0.5;
const HIGH_CURRENT_A: f64 = 30.0;

/// Pack voltage level, sudden sag and current draw
pub struct BatteryAnalyzer;

impl BatteryAnalyzer {
    fn voltage(&self, table: &TelemetryTable, issues: &mut Vec<AnomalyFinding>) {
        let volt = table.numeric_column("Volt");
        let (Some(min_v), Some(max_v)) = (stats::min(&volt), stats::max(&volt)) else {
            return;
        };

        if min_v < CRITICAL_VOLTAGE {
            issues.push(
                AnomalyFinding::new(
                    "low_battery_voltage",
                    Severity::Critical,
                    format!("Critical low voltage detected: {:.2}V", min_v),
                )
                .with_metric("min_voltage", min_v)
                .with_metric("voltage_drop", max_v - min_v),
            );
        } else if min_v < WARNING_VOLTAGE {
            issues.push(
                AnomalyFinding::new(
                    "low_battery_warning",
                    Severity::Medium,
                    format!("Low battery warning: {:.2}V", min_v),
                )
                .with_metric("min_voltage", min_v),
            );
        }

        let steps = stats::diffs(&volt);
        let drop_count = stats::count_where(&steps, |d| d < SUDDEN_DROP_V);
        if drop_count > 0 {
            let max_drop = stats::min(&steps).unwrap_or_default().abs();
            issues.push(
                AnomalyFinding::new(
                    "voltage_drop",
                    Severity::Medium,
                    format!("Sudden voltage drop detected: {:.2}V", max_drop),
                )
                .with_metric("max_drop_v", max_drop)
                .with_metric("drop_count", drop_count),
            );
        }
    }

    fn current(&self, table: &TelemetryTable, issues: &mut Vec<AnomalyFinding>) {
        let curr = table.numeric_column("Curr");
        let Some(max_a) = stats::max(&curr).filter(|a| *a > HIGH_CURRENT_A) else {
            return;
        };

        issues.push(
            AnomalyFinding::new(
                "high_current_draw",
                Severity::Medium,
                format!("High current draw detected: {:.1}A", max_a),
            )
            .with_metric("max_current_a", max_a)
            .with_metric("avg_current_a", stats::mean(&curr).unwrap_or_default()),
        );
    }
}

impl Analyzer for BatteryAnalyzer {
    fn name(&self) -> &'static str {
        "battery"
    }

    fn category(&self) -> Category {
        Category::Battery
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &["Volt", "Curr", "CurrTot"]
    }

    fn analyze(&self, table: &TelemetryTable) -> Vec<AnomalyFinding> {
        let mut issues = Vec::new();
        self.voltage(table, &mut issues);
        self.current(table, &mut issues);
        issues
    }
}
