use crate::types::frame::FieldValue;
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Severity of a single finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Overall report severity, derived only from the total finding count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OverallSeverity {
    #[default]
    Normal,
    Minor,
    Moderate,
    Critical,
}

impl OverallSeverity {
    /// 0 → normal, 1-2 → minor, 3-5 → moderate, more → critical
    pub fn from_total(total: usize) -> Self {
        match total {
            0 => OverallSeverity::Normal,
            1..=2 => OverallSeverity::Minor,
            3..=5 => OverallSeverity::Moderate,
            _ => OverallSeverity::Critical,
        }
    }
}

impl fmt::Display for OverallSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OverallSeverity::Normal => "normal",
            OverallSeverity::Minor => "minor",
            OverallSeverity::Moderate => "moderate",
            OverallSeverity::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// A metric attached to a finding
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Metric {
    Count(u64),
    Value(f64),
    Label(String),
    List(Vec<FieldValue>),
}

impl Metric {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Metric::Count(n) => Some(*n as f64),
            Metric::Value(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<usize> for Metric {
    fn from(value: usize) -> Self {
        Metric::Count(value as u64)
    }
}

impl From<f64> for Metric {
    fn from(value: f64) -> Self {
        Metric::Value(value)
    }
}

impl From<&str> for Metric {
    fn from(value: &str) -> Self {
        Metric::Label(value.to_string())
    }
}

impl From<Vec<FieldValue>> for Metric {
    fn from(value: Vec<FieldValue>) -> Self {
        Metric::List(value)
    }
}

/// One detected anomaly
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnomalyFinding {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    pub severity: Severity,
    pub description: String,
    pub metrics: BTreeMap<String, Metric>,
}

impl AnomalyFinding {
    pub fn new(
        kind: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            severity,
            description: description.into(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_metric(mut self, name: &str, value: impl Into<Metric>) -> Self {
        self.metrics.insert(name.to_string(), value.into());
        self
    }

    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.get(name)
    }
}

/// Report category each analyzer writes into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Altitude,
    Gps,
    Battery,
    Control,
    Navigation,
    System,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Altitude,
        Category::Gps,
        Category::Battery,
        Category::Control,
        Category::Navigation,
        Category::System,
    ];

    /// Report field name of the category
    pub fn field_name(&self) -> &'static str {
        match self {
            Category::Altitude => "altitude_issues",
            Category::Gps => "gps_problems",
            Category::Battery => "battery_concerns",
            Category::Control => "control_anomalies",
            Category::Navigation => "navigation_issues",
            Category::System => "system_errors",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReportSummary {
    pub total_anomalies: usize,
    pub severity: OverallSeverity,
}

/// Aggregated result of all analyzers
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnomalyReport {
    pub summary: ReportSummary,
    pub altitude_issues: Vec<AnomalyFinding>,
    pub gps_problems: Vec<AnomalyFinding>,
    pub battery_concerns: Vec<AnomalyFinding>,
    pub control_anomalies: Vec<AnomalyFinding>,
    pub navigation_issues: Vec<AnomalyFinding>,
    pub system_errors: Vec<AnomalyFinding>,
}

impl AnomalyReport {
    /// Report with no findings and `normal` severity
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assemble a report from per-category findings, computing the summary
    pub fn from_findings(
        findings: impl IntoIterator<Item = (Category, Vec<AnomalyFinding>)>,
    ) -> Self {
        let mut report = Self::default();
        for (category, mut items) in findings {
            report.category_mut(category).append(&mut items);
        }
        let total = Category::ALL
            .iter()
            .map(|category| report.findings(*category).len())
            .sum();
        report.summary = ReportSummary {
            total_anomalies: total,
            severity: OverallSeverity::from_total(total),
        };
        report
    }

    pub fn findings(&self, category: Category) -> &[AnomalyFinding] {
        match category {
            Category::Altitude => &self.altitude_issues,
            Category::Gps => &self.gps_problems,
            Category::Battery => &self.battery_concerns,
            Category::Control => &self.control_anomalies,
            Category::Navigation => &self.navigation_issues,
            Category::System => &self.system_errors,
        }
    }

    fn category_mut(&mut self, category: Category) -> &mut Vec<AnomalyFinding> {
        match category {
            Category::Altitude => &mut self.altitude_issues,
            Category::Gps => &mut self.gps_problems,
            Category::Battery => &mut self.battery_concerns,
            Category::Control => &mut self.control_anomalies,
            Category::Navigation => &mut self.navigation_issues,
            Category::System => &mut self.system_errors,
        }
    }

    /// All findings across categories, in report field order
    pub fn all_findings(&self) -> impl Iterator<Item = &AnomalyFinding> {
        Category::ALL
            .into_iter()
            .flat_map(move |category| self.findings(category).iter())
    }
}
