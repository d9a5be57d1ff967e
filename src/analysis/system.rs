use crate::analysis::Analyzer;
use crate::types::{
    AnomalyFinding, Category, FieldValue, Severity, TelemetryTable, MSG_TYPE_COLUMN,
};

/// More MODE messages than a normal takeoff and landing produce
const MAX_ROUTINE_MODE_CHANGES: usize = 3;

/// ERR messages and frequent flight mode changes
pub struct SystemEventAnalyzer;

impl SystemEventAnalyzer {
    /// Distinct `SubSys` values of the given rows in first-seen order
    fn subsystems(table: &TelemetryTable, rows: &[usize]) -> Vec<FieldValue> {
        let mut distinct: Vec<FieldValue> = Vec::new();
        let Some(cells) = table.cells("SubSys") else {
            return distinct;
        };
        for value in rows.iter().filter_map(|row| cells[*row].as_ref()) {
            if value.as_f64().is_none() && value.as_str().is_none() {
                continue;
            }
            if !distinct.contains(value) {
                distinct.push(value.clone());
            }
        }
        distinct
    }
}

impl Analyzer for SystemEventAnalyzer {
    fn name(&self) -> &'static str {
        "system"
    }

    fn category(&self) -> Category {
        Category::System
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[MSG_TYPE_COLUMN]
    }

    fn analyze(&self, table: &TelemetryTable) -> Vec<AnomalyFinding> {
        let mut issues = Vec::new();

        let error_rows: Vec<usize> = table.rows_with_msg_type("ERR").collect();
        if !error_rows.is_empty() {
            issues.push(
                AnomalyFinding::new(
                    "system_errors_detected",
                    Severity::High,
                    format!("{} system error messages found", error_rows.len()),
                )
                .with_metric("error_count", error_rows.len())
                .with_metric("error_types", Self::subsystems(table, &error_rows)),
            );
        }

        let mode_changes = table.count_msg_type("MODE");
        if mode_changes > MAX_ROUTINE_MODE_CHANGES {
            issues.push(
                AnomalyFinding::new(
                    "frequent_mode_changes",
                    Severity::Medium,
                    format!(
                        "Frequent flight mode changes detected: {} changes",
                        mode_changes
                    ),
                )
                .with_metric("mode_change_count", mode_changes),
            );
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Metric, TelemetryFrame};

    fn err(subsys: f64, code: f64) -> TelemetryFrame {
        TelemetryFrame::new("ERR")
            .with_field("SubSys", subsys)
            .with_field("ECode", code)
    }

    #[test]
    fn test_error_subsystems_are_distinct_in_order() {
        let table = TelemetryTable::from_frames(vec![
            err(11.0, 2.0),
            TelemetryFrame::new("GPS").with_field("SubSys", 99.0),
            err(6.0, 1.0),
            err(11.0, 0.0),
        ]);
        let issues = SystemEventAnalyzer.analyze(&table);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].description, "3 system error messages found");
        assert_eq!(issues[0].metric("error_count"), Some(&Metric::Count(3)));
        assert_eq!(
            issues[0].metric("error_types"),
            Some(&Metric::List(vec![FieldValue::Number(11.0), FieldValue::Number(6.0)]))
        );
    }

    #[test]
    fn test_errors_without_subsystem_column() {
        let table = TelemetryTable::from_frames(vec![TelemetryFrame::new("ERR")]);
        let issues = SystemEventAnalyzer.analyze(&table);
        assert_eq!(issues[0].metric("error_types"), Some(&Metric::List(Vec::new())));
    }

    #[test]
    fn test_mode_changes_need_more_than_three() {
        let modes = |n: usize| {
            TelemetryTable::from_frames(
                (0..n).map(|i| TelemetryFrame::new("MODE").with_field("Mode", i as f64)),
            )
        };
        assert!(SystemEventAnalyzer.analyze(&modes(3)).is_empty());

        let issues = SystemEventAnalyzer.analyze(&modes(4));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, "frequent_mode_changes");
        assert_eq!(issues[0].metric("mode_change_count"), Some(&Metric::Count(4)));
    }
}
