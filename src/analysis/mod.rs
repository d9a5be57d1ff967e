//! Rule-based anomaly detection over a [`TelemetryTable`]
//!
//! Each subsystem is covered by one [`Analyzer`]. An analyzer declares the columns it
//! works from and the engine only runs it when at least one of them is present, so a
//! log lacking a subsystem contributes no findings rather than an error. Analyzers write
//! into disjoint report categories and share no state, which lets
//! [`AnomalyEngine::run_parallel`] evaluate them concurrently.

pub mod altitude;
pub mod battery;
pub mod control;
pub mod gps;
pub mod navigation;
pub mod stats;
pub mod system;

pub use altitude::AltitudeAnalyzer;
pub use battery::BatteryAnalyzer;
pub use control::ControlAnalyzer;
pub use gps::GpsAnalyzer;
pub use navigation::NavigationAnalyzer;
pub use system::SystemEventAnalyzer;

use crate::types::{AnomalyFinding, AnomalyReport, Category, TelemetryTable};
use tracing::debug;

/// Tables shorter than this always produce an empty report
pub const MIN_FRAMES_FOR_ANALYSIS: usize = 2;

/// One subsystem's anomaly rules
pub trait Analyzer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Report category the findings are filed under
    fn category(&self) -> Category;

    /// Columns of which at least one must be present for the analyzer to run
    fn required_columns(&self) -> &'static [&'static str];

    fn is_applicable(&self, table: &TelemetryTable) -> bool {
        self.required_columns()
            .iter()
            .any(|column| table.has_column(column))
    }

    fn analyze(&self, table: &TelemetryTable) -> Vec<AnomalyFinding>;
}

/// Registry of analyzers producing an [`AnomalyReport`]
pub struct AnomalyEngine {
    analyzers: Vec<Box<dyn Analyzer>>,
}

impl AnomalyEngine {
    /// Engine with the six built-in subsystem analyzers
    pub fn new() -> Self {
        Self::with_analyzers(vec![
            Box::new(AltitudeAnalyzer),
            Box::new(GpsAnalyzer),
            Box::new(BatteryAnalyzer),
            Box::new(ControlAnalyzer),
            Box::new(NavigationAnalyzer),
            Box::new(SystemEventAnalyzer),
        ])
    }

    pub fn with_analyzers(analyzers: Vec<Box<dyn Analyzer>>) -> Self {
        Self { analyzers }
    }

    pub fn register(&mut self, analyzer: Box<dyn Analyzer>) {
        self.analyzers.push(analyzer);
    }

    pub fn analyzers(&self) -> impl Iterator<Item = &dyn Analyzer> {
        self.analyzers.iter().map(|analyzer| analyzer.as_ref())
    }

    fn applicable<'a>(
        &'a self,
        table: &'a TelemetryTable,
    ) -> impl Iterator<Item = &'a dyn Analyzer> {
        self.analyzers().filter(move |analyzer| {
            let applicable = analyzer.is_applicable(table);
            if !applicable {
                debug!("Skipping {} analysis: no required columns", analyzer.name());
            }
            applicable
        })
    }

    /// Evaluate every applicable analyzer in registration order
    pub fn run(&self, table: &TelemetryTable) -> AnomalyReport {
        if table.len() < MIN_FRAMES_FOR_ANALYSIS {
            return AnomalyReport::empty();
        }

        let findings: Vec<(Category, Vec<AnomalyFinding>)> = self
            .applicable(table)
            .map(|analyzer| (analyzer.category(), analyzer.analyze(table)))
            .collect();
        Self::assemble(findings)
    }

    /// Evaluate applicable analyzers on scoped threads; the result equals [`run`](Self::run)
    pub fn run_parallel(&self, table: &TelemetryTable) -> AnomalyReport {
        if table.len() < MIN_FRAMES_FOR_ANALYSIS {
            return AnomalyReport::empty();
        }

        let findings = std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .applicable(table)
                .map(|analyzer| scope.spawn(move || (analyzer.category(), analyzer.analyze(table))))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect::<Vec<_>>()
        });
        Self::assemble(findings)
    }

    fn assemble(findings: Vec<(Category, Vec<AnomalyFinding>)>) -> AnomalyReport {
        for (category, items) in &findings {
            debug!("{}: {} finding(s)", category.field_name(), items.len());
        }
        AnomalyReport::from_findings(findings)
    }
}

impl Default for AnomalyEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the built-in analyzers over `table`
pub fn detect_anomalies(table: &TelemetryTable) -> AnomalyReport {
    AnomalyEngine::new().run(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::fallback_table;
    use crate::types::{Metric, OverallSeverity, Severity, TelemetryFrame};

    struct AlwaysFlags;

    impl Analyzer for AlwaysFlags {
        fn name(&self) -> &'static str {
            "always"
        }

        fn category(&self) -> Category {
            Category::Navigation
        }

        fn required_columns(&self) -> &'static [&'static str] {
            &["Custom"]
        }

        fn analyze(&self, _table: &TelemetryTable) -> Vec<AnomalyFinding> {
            vec![AnomalyFinding::new("custom", Severity::Low, "custom rule")]
        }
    }

    #[test]
    fn test_fallback_dataset_report() {
        let report = detect_anomalies(&fallback_table());

        assert_eq!(report.altitude_issues.len(), 2);
        let change = &report.altitude_issues[0];
        assert_eq!(change.kind, "large_altitude_change");
        assert_eq!(change.severity, Severity::Medium);
        assert_eq!(change.metric("max_change_m"), Some(&Metric::Value(30.0)));
        assert_eq!(change.metric("occurrences"), Some(&Metric::Count(3)));
        assert_eq!(report.altitude_issues[1].kind, "altitude_spike");

        assert!(report.gps_problems.is_empty());
        assert!(report.battery_concerns.is_empty());
        assert!(report.control_anomalies.is_empty());
        assert!(report.navigation_issues.is_empty());
        assert!(report.system_errors.is_empty());
        assert_eq!(report.summary.total_anomalies, 2);
        assert_eq!(report.summary.severity, OverallSeverity::Minor);
    }

    #[test]
    fn test_short_tables_are_normal() {
        let table = TelemetryTable::from_frames(vec![TelemetryFrame::new("ERR")
            .with_field("Alt", -50.0)]);
        let report = detect_anomalies(&table);
        assert_eq!(report, AnomalyReport::empty());
        assert_eq!(detect_anomalies(&TelemetryTable::new()), AnomalyReport::empty());
    }

    #[test]
    fn test_registered_analyzer_runs_only_when_applicable() {
        let mut engine = AnomalyEngine::new();
        engine.register(Box::new(AlwaysFlags));

        let without = engine.run(&fallback_table());
        assert!(without.navigation_issues.is_empty());

        let table = TelemetryTable::from_frames(vec![
            TelemetryFrame::new("X").with_field("Custom", 1.0),
            TelemetryFrame::new("X").with_field("Custom", 2.0),
        ]);
        let with = engine.run(&table);
        assert_eq!(with.navigation_issues.len(), 1);
        assert_eq!(with.summary.total_anomalies, 1);
    }

    #[test]
    fn test_parallel_run_matches_sequential() {
        let mut frames: Vec<TelemetryFrame> = (0..30)
            .map(|i| {
                TelemetryFrame::new("ATT")
                    .with_field("Roll", if i % 7 == 0 { 80.0 } else { 2.0 })
                    .with_field("Alt", (i * 13 % 40) as f64)
            })
            .collect();
        frames.push(TelemetryFrame::new("ERR").with_field("SubSys", 3.0));
        frames.extend((0..5).map(|_| TelemetryFrame::new("MODE")));
        let table = TelemetryTable::from_frames(frames);

        let engine = AnomalyEngine::new();
        let sequential = engine.run(&table);
        assert_eq!(sequential, engine.run_parallel(&table));
        assert_eq!(sequential, engine.run(&table));
        assert!(sequential.summary.total_anomalies > 0);
    }
}
