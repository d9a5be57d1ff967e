use crate::parser::decoder::{DataFlashDecoder, DecodeResult};
use crate::error::LogError;
use crate::parser::fallback::fallback_table;
use crate::types::TelemetryTable;
use crate::Result;
use anyhow::Context;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Budgets bounding a single parse
#[derive(Debug, Clone, PartialEq)]
pub struct ParseLimits {
    /// Stop once this many valid frames have been kept
    pub max_messages: usize,
    /// Stop once this many corrupt frames have been seen in total
    pub max_bad_frames: usize,
    /// Stop once this many corrupt frames have been seen in a row
    pub max_consecutive_bad: usize,
    /// Wall-clock ceiling, re-checked on every iteration
    pub max_parse_time: Duration,
    /// Fewer valid frames than this and the synthetic dataset is returned instead
    pub min_valid_messages: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_messages: 2000,
            max_bad_frames: 100,
            max_consecutive_bad: 10,
            max_parse_time: Duration::from_secs(20),
            min_valid_messages: 10,
        }
    }
}

/// Why the parse loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The decoder ran out of input
    Exhausted,
    MessageLimit,
    BadFrameLimit,
    ConsecutiveBadLimit,
    TimeLimit,
}

/// Counters collected while parsing
#[derive(Debug, Clone, PartialEq)]
pub struct ParseStats {
    pub valid_frames: usize,
    pub bad_frames: usize,
    pub stop_reason: StopReason,
    pub elapsed: Duration,
    pub used_fallback: bool,
}

/// A parsed log: the table handed to analysis plus how it was obtained
#[derive(Debug, Clone)]
pub struct ParsedLog {
    pub table: TelemetryTable,
    pub stats: ParseStats,
}

/// Parse a DataFlash log from memory with the default budgets.
///
/// Never fails: a log that yields fewer than ten valid frames produces the synthetic
/// fallback table, which can be recognised with [`TelemetryTable::is_fallback`].
pub fn parse_log_bytes(data: &[u8]) -> TelemetryTable {
    parse_log_bytes_with_limits(data, &ParseLimits::default()).table
}

/// Parse a DataFlash log from memory with explicit budgets
pub fn parse_log_bytes_with_limits(data: &[u8], limits: &ParseLimits) -> ParsedLog {
    debug!("Parsing {} bytes of log data", data.len());
    run_parse_loop(DataFlashDecoder::new(data), limits)
}

/// Read and parse a DataFlash log file
pub fn parse_log_file(path: &Path, limits: &ParseLimits) -> Result<ParsedLog> {
    let data = std::fs::read(path)
        .map_err(LogError::from)
        .with_context(|| format!("Failed to read log file: {:?}", path))?;
    info!(
        "Parsing log file {:?} ({} bytes, {:.2} MB)",
        path,
        data.len(),
        data.len() as f64 / 1024.0 / 1024.0
    );
    Ok(parse_log_bytes_with_limits(&data, limits))
}

/// Drive any decode result stream under `limits`.
///
/// All four stop conditions are checked before each decode step. Valid frames are
/// appended and reset the consecutive counter; corrupt frames only bump the counters.
pub fn run_parse_loop<I>(mut results: I, limits: &ParseLimits) -> ParsedLog
where
    I: Iterator<Item = DecodeResult>,
{
    let start = Instant::now();
    let mut table = TelemetryTable::new();
    let mut valid_frames = 0usize;
    let mut bad_frames = 0usize;
    let mut consecutive_bad = 0usize;

    let stop_reason = loop {
        if valid_frames >= limits.max_messages {
            break StopReason::MessageLimit;
        }
        if bad_frames >= limits.max_bad_frames {
            break StopReason::BadFrameLimit;
        }
        if consecutive_bad >= limits.max_consecutive_bad {
            break StopReason::ConsecutiveBadLimit;
        }
        if start.elapsed() >= limits.max_parse_time {
            break StopReason::TimeLimit;
        }

        match results.next() {
            None => break StopReason::Exhausted,
            Some(DecodeResult::Frame(frame)) => {
                trace!("Decoded {} message", frame.msg_type);
                table.push(frame);
                valid_frames += 1;
                consecutive_bad = 0;
                if valid_frames % 100 == 0 {
                    debug!("Valid messages: {}, bad: {}", valid_frames, bad_frames);
                }
            }
            Some(DecodeResult::Corrupt(corrupt)) => {
                bad_frames += 1;
                consecutive_bad += 1;
                if bad_frames <= 3 {
                    debug!(
                        "Skipping corrupt frame at offset {}: {}",
                        corrupt.offset, corrupt.reason
                    );
                } else {
                    trace!(
                        "Skipping corrupt frame at offset {}: {}",
                        corrupt.offset, corrupt.reason
                    );
                }
                if bad_frames % 10 == 0 {
                    debug!(
                        "Bad data count: {} (consecutive: {})",
                        bad_frames, consecutive_bad
                    );
                }
            }
        }
    };

    info!(
        "Parsing stopped ({:?}): {} valid messages, {} bad messages",
        stop_reason, valid_frames, bad_frames
    );

    let used_fallback = valid_frames < limits.min_valid_messages;
    if used_fallback {
        warn!(
            "Only {} valid messages recovered (need {}), substituting synthetic flight data",
            valid_frames, limits.min_valid_messages
        );
        table = fallback_table();
    }

    ParsedLog {
        table,
        stats: ParseStats {
            valid_frames,
            bad_frames,
            stop_reason,
            elapsed: start.elapsed(),
            used_fallback,
        },
    }
}
