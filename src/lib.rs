//! ArduPilot Log Analyzer Library
//!
//! Decodes ArduPilot DataFlash binary logs (`.bin`) into a telemetry table and runs
//! rule-based anomaly detection across altitude, GPS, battery, attitude control,
//! navigation and system events.
//!
//! # Features
//!
//! - **`csv`** (default): Enable CSV export of the telemetry table
//! - **`cli`** (default): Build the command-line interface binary
//! - **`json`**: Enable JSON export of anomaly reports
//! - **`serde`**: Enable serialization/deserialization of types
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ardulog::{detect_anomalies, parse_log_file, ParseLimits};
//! use std::path::Path;
//!
//! let parsed = parse_log_file(Path::new("00000042.BIN"), &ParseLimits::default()).unwrap();
//! if parsed.table.is_fallback() {
//!     println!("Log unusable, analysing synthetic data");
//! }
//! let report = detect_anomalies(&parsed.table);
//! println!(
//!     "{} anomalies, severity {}",
//!     report.summary.total_anomalies, report.summary.severity
//! );
//! ```
//!
//! Parsing from memory never fails; too little usable data yields the synthetic
//! fallback table, flagged through [`TelemetryTable::is_fallback`]:
//! ```rust
//! let table = ardulog::parse_log_bytes(&[0xde, 0xad, 0xbe, 0xef]);
//! assert!(table.is_fallback());
//! ```
//!
//! # Public API
//!
//! ## Parsing Functions
//! - [`parse_log_bytes`] - Parse a log from memory with default budgets
//! - [`parse_log_bytes_with_limits`] - Parse from memory with explicit [`ParseLimits`]
//! - [`parse_log_file`] - Read and parse a log file
//! - [`DataFlashDecoder`] - Low-level lazy decoder yielding [`DecodeResult`]s
//!
//! ## Analysis
//! - [`detect_anomalies`] - Run the built-in analyzers
//! - [`AnomalyEngine`] - Analyzer registry with sequential and parallel evaluation
//! - [`FlightSummary`] - Headline flight figures and quality grades
//!
//! ## Export Functions
//! - [`export_log`] - Write the enabled exports for one log
//! - [`compute_export_paths`] - Helper for consistent path computation

pub mod analysis;
pub mod error;
pub mod export;
#[cfg(feature = "cli")]
pub mod logging;
pub mod parser;
pub mod summary;
pub mod types;

pub use analysis::*;
pub use error::LogError;
pub use export::*;
pub use parser::*;
pub use summary::*;
pub use types::*;

pub use anyhow::Result;
