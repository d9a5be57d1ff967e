//! Export functionality for parsed logs
//!
//! Writes the telemetry table as CSV and the anomaly report as JSON next to the input
//! log, or into a configured output directory.

use crate::types::{AnomalyReport, TelemetryTable, MSG_TYPE_COLUMN};
use crate::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Export options for controlling output formats
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub csv: bool,
    pub json: bool,
    pub output_dir: Option<String>,
}

/// Paths written by an export run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    pub csv_path: Option<PathBuf>,
    pub json_path: Option<PathBuf>,
}

/// Compute `(csv_path, json_path)` for an input log: `<stem>.csv` and
/// `<stem>.anomalies.json`, placed in `output_dir` or beside the input
pub fn compute_export_paths(
    input_path: &Path,
    export_options: &ExportOptions,
) -> (PathBuf, PathBuf) {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("log");
    let dir = match &export_options.output_dir {
        Some(dir) => PathBuf::from(dir),
        None => input_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    (
        dir.join(format!("{}.csv", stem)),
        dir.join(format!("{}.anomalies.json", stem)),
    )
}

/// Column order used for CSV output: `msg_type` first, then first-seen order
pub fn csv_columns(table: &TelemetryTable) -> Vec<&str> {
    let mut columns = Vec::with_capacity(table.column_names().len());
    if table.has_column(MSG_TYPE_COLUMN) {
        columns.push(MSG_TYPE_COLUMN);
    }
    columns.extend(
        table
            .column_names()
            .iter()
            .map(String::as_str)
            .filter(|name| *name != MSG_TYPE_COLUMN),
    );
    columns
}

/// Write the table as CSV; absent cells are empty
#[cfg(feature = "csv")]
pub fn write_table_csv<W: std::io::Write>(table: &TelemetryTable, writer: W) -> Result<()> {
    let columns = csv_columns(table);
    let cells: Vec<_> = columns
        .iter()
        .map(|name| table.cells(name).unwrap_or(&[]))
        .collect();

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&columns)?;
    for row in 0..table.len() {
        let record = cells.iter().map(|column| {
            column
                .get(row)
                .and_then(Option::as_ref)
                .map(ToString::to_string)
                .unwrap_or_default()
        });
        csv_writer.write_record(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Export the telemetry table to `<stem>.csv`
#[cfg(feature = "csv")]
pub fn export_table_csv(
    table: &TelemetryTable,
    input_path: &Path,
    export_options: &ExportOptions,
) -> Result<PathBuf> {
    let (csv_path, _) = compute_export_paths(input_path, export_options);
    ensure_parent_dir(&csv_path)?;
    let file = std::fs::File::create(&csv_path)
        .with_context(|| format!("Failed to create CSV file: {:?}", csv_path))?;
    write_table_csv(table, std::io::BufWriter::new(file))?;
    tracing::info!("Exported {} rows to {:?}", table.len(), csv_path);
    Ok(csv_path)
}

/// Serialize a report with its stable field names
#[cfg(feature = "json")]
pub fn report_to_json(report: &AnomalyReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Export the anomaly report to `<stem>.anomalies.json`
#[cfg(feature = "json")]
pub fn export_report_json(
    report: &AnomalyReport,
    input_path: &Path,
    export_options: &ExportOptions,
) -> Result<PathBuf> {
    let (_, json_path) = compute_export_paths(input_path, export_options);
    ensure_parent_dir(&json_path)?;
    std::fs::write(&json_path, report_to_json(report)?)
        .with_context(|| format!("Failed to write report file: {:?}", json_path))?;
    tracing::info!("Exported anomaly report to {:?}", json_path);
    Ok(json_path)
}

/// Run every export enabled in `export_options`. Formats compiled out are skipped.
#[allow(unused_variables, unused_mut)]
pub fn export_log(
    table: &TelemetryTable,
    report: &AnomalyReport,
    input_path: &Path,
    export_options: &ExportOptions,
) -> Result<ExportReport> {
    let mut written = ExportReport::default();

    #[cfg(feature = "csv")]
    {
        if export_options.csv {
            written.csv_path = Some(export_table_csv(table, input_path, export_options)?);
        }
    }

    #[cfg(feature = "json")]
    {
        if export_options.json {
            written.json_path = Some(export_report_json(report, input_path, export_options)?);
        }
    }

    Ok(written)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }
    Ok(())
}
