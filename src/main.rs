//! CLI binary for the ArduPilot log analyzer
//!
//! Parses DataFlash `.bin` logs, prints a flight summary and anomaly report, and
//! optionally exports the decoded table and report.

use anyhow::Result;
use ardulog::logging::{init_logging, Verbosity};
use ardulog::{
    export_log, parse_log_file, report_to_json, AnomalyEngine, AnomalyReport, ExportOptions,
    FlightSummary, ParseLimits, ParsedLog,
};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use glob::glob;
use std::path::{Path, PathBuf};
use std::time::Duration;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    ")"
);

fn cli() -> Command {
    Command::new("ardulog")
        .version(VERSION)
        .about("Decode ArduPilot DataFlash logs and report flight anomalies.")
        .arg(
            Arg::new("files")
                .help("Log files to analyze (.bin, case-insensitive, supports globbing)")
                .required(true)
                .num_args(1..)
                .index(1),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug output; repeat for per-frame trace output")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only log errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the anomaly report as JSON instead of text")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("csv")
                .long("csv")
                .help("Export the decoded telemetry table to <name>.csv")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("export-json")
                .long("export-json")
                .help("Export the anomaly report to <name>.anomalies.json")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .help("Directory for exported files (default: same as input file)")
                .value_name("DIR"),
        )
        .arg(
            Arg::new("max-messages")
                .long("max-messages")
                .help("Stop after this many valid messages")
                .value_parser(value_parser!(usize))
                .default_value("2000"),
        )
        .arg(
            Arg::new("max-bad")
                .long("max-bad")
                .help("Stop after this many corrupt messages")
                .value_parser(value_parser!(usize))
                .default_value("100"),
        )
        .arg(
            Arg::new("max-consecutive-bad")
                .long("max-consecutive-bad")
                .help("Stop after this many corrupt messages in a row")
                .value_parser(value_parser!(usize))
                .default_value("10"),
        )
        .arg(
            Arg::new("timeout-secs")
                .long("timeout-secs")
                .help("Wall-clock limit for decoding one log")
                .value_parser(value_parser!(u64))
                .default_value("20"),
        )
}

/// Expand glob patterns and keep existing `.bin` files
fn collect_input_paths(patterns: &[&String]) -> Vec<PathBuf> {
    let mut valid_paths = Vec::new();
    for pattern in patterns {
        let paths: Vec<PathBuf> = if pattern.contains('*') || pattern.contains('?') {
            match glob(pattern).map(|paths| paths.collect::<Result<Vec<_>, _>>()) {
                Ok(Ok(paths)) => paths,
                Ok(Err(e)) => {
                    eprintln!("Error expanding glob pattern '{pattern}': {e}");
                    continue;
                }
                Err(e) => {
                    eprintln!("Invalid glob pattern '{pattern}': {e}");
                    continue;
                }
            }
        } else {
            vec![PathBuf::from(pattern.as_str())]
        };

        for path in paths {
            if !path.exists() {
                eprintln!("Warning: File does not exist: {path:?}");
                continue;
            }
            let is_bin = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("bin"))
                .unwrap_or(false);
            if !is_bin {
                eprintln!("Warning: Skipping file without .bin extension: {path:?}");
                continue;
            }
            valid_paths.push(path);
        }
    }
    valid_paths
}

fn count_arg(matches: &ArgMatches, name: &str, default: usize) -> usize {
    matches.get_one::<usize>(name).copied().unwrap_or(default)
}

fn print_summary(path: &Path, parsed: &ParsedLog, summary: &FlightSummary) {
    let stats = &parsed.stats;
    println!("Log: {}", path.display());
    println!(
        "  Decoded: {} valid, {} corrupt, stopped on {:?} after {:.2}s",
        stats.valid_frames,
        stats.bad_frames,
        stats.stop_reason,
        stats.elapsed.as_secs_f64()
    );
    if stats.used_fallback {
        println!("  WARNING: too little usable data, showing synthetic fallback flight");
    }
    println!(
        "  Table: {} rows x {} columns",
        parsed.table.len(),
        parsed.table.column_names().len()
    );
    if let Some(duration) = summary.flight_duration_sec {
        println!("  Duration: {:.1}s", duration);
    }
    if let (Some(lo), Some(hi)) = (summary.min_altitude_m, summary.max_altitude_m) {
        println!("  Altitude: {:.1}m to {:.1}m", lo, hi);
    }
    println!(
        "  GPS quality: {}, battery health: {}, data quality: {}",
        summary.gps_quality, summary.battery_health, summary.data_quality
    );
}

fn print_report(report: &AnomalyReport) {
    println!(
        "  Anomalies: {} (severity: {})",
        report.summary.total_anomalies, report.summary.severity
    );
    for finding in report.all_findings() {
        println!(
            "    [{}] {}: {}",
            finding.severity, finding.kind, finding.description
        );
    }
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    init_logging(Verbosity::from_flags(
        matches.get_count("debug"),
        matches.get_flag("quiet"),
    ));

    let defaults = ParseLimits::default();
    let timeout_secs = matches.get_one::<u64>("timeout-secs").copied();
    let limits = ParseLimits {
        max_messages: count_arg(&matches, "max-messages", defaults.max_messages),
        max_bad_frames: count_arg(&matches, "max-bad", defaults.max_bad_frames),
        max_consecutive_bad: count_arg(
            &matches,
            "max-consecutive-bad",
            defaults.max_consecutive_bad,
        ),
        max_parse_time: timeout_secs.map_or(defaults.max_parse_time, Duration::from_secs),
        ..defaults
    };
    let export_options = ExportOptions {
        csv: matches.get_flag("csv"),
        json: matches.get_flag("export-json"),
        output_dir: matches.get_one::<String>("output-dir").cloned(),
    };
    let print_json = matches.get_flag("json");

    let patterns: Vec<&String> = matches
        .get_many::<String>("files")
        .map(|files| files.collect())
        .unwrap_or_default();
    let valid_paths = collect_input_paths(&patterns);
    if valid_paths.is_empty() {
        eprintln!("Error: No valid files found to process.");
        eprintln!("Input patterns were: {patterns:?}");
        std::process::exit(1);
    }

    let engine = AnomalyEngine::new();
    let mut processed_files = 0;

    for (index, path) in valid_paths.iter().enumerate() {
        if index > 0 {
            println!();
        }

        let parsed = match parse_log_file(path, &limits) {
            Ok(parsed) => parsed,
            Err(e) => {
                eprintln!("Error processing {}: {e:#}", path.display());
                eprintln!("Continuing with next file...");
                continue;
            }
        };

        let report = engine.run_parallel(&parsed.table);
        if print_json {
            println!("{}", report_to_json(&report)?);
        } else {
            let summary = FlightSummary::from_table(&parsed.table);
            print_summary(path, &parsed, &summary);
            print_report(&report);
        }

        match export_log(&parsed.table, &report, path, &export_options) {
            Ok(written) => {
                for exported in written.csv_path.iter().chain(written.json_path.iter()) {
                    println!("  Exported: {}", exported.display());
                }
            }
            Err(e) => eprintln!("Export failed for {}: {e:#}", path.display()),
        }

        processed_files += 1;
    }

    if processed_files == 0 {
        eprintln!(
            "Error: No files were successfully processed out of {} files found.",
            valid_paths.len()
        );
        std::process::exit(1);
    }

    Ok(())
}
