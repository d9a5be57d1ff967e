//! Integration tests for DataFlash decoding
//!
//! Logs are assembled byte by byte so each test controls exactly where corruption sits.

use ardulog::{
    detect_anomalies, parse_log_bytes, parse_log_bytes_with_limits, DataFlashDecoder, DataSource,
    DecodeResult, FieldValue, LogError, ParseLimits, StopReason,
};

const BARO_ID: u8 = 10;
const GPS_ID: u8 = 11;

fn padded(text: &str, width: usize) -> Vec<u8> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.resize(width, 0);
    bytes
}

/// FMT message announcing a layout for `type_id`
fn fmt_message(type_id: u8, length: u8, name: &str, format: &str, columns: &str) -> Vec<u8> {
    let mut bytes = vec![0xA3, 0x95, 128, type_id, length];
    bytes.extend(padded(name, 4));
    bytes.extend(padded(format, 16));
    bytes.extend(padded(columns, 64));
    bytes
}

fn message(type_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0xA3, 0x95, type_id];
    bytes.extend_from_slice(payload);
    bytes
}

fn baro_fmt() -> Vec<u8> {
    fmt_message(BARO_ID, 15, "BARO", "Qf", "TimeUS,Alt")
}

fn baro(time_us: u64, alt: f32) -> Vec<u8> {
    let mut payload = time_us.to_le_bytes().to_vec();
    payload.extend_from_slice(&alt.to_le_bytes());
    message(BARO_ID, &payload)
}

fn gps_fmt() -> Vec<u8> {
    fmt_message(GPS_ID, 27, "GPS", "QLLff", "TimeUS,Lat,Lng,Alt,HDop")
}

fn gps(time_us: u64, lat_e7: i32, lng_e7: i32, alt: f32, hdop: f32) -> Vec<u8> {
    let mut payload = time_us.to_le_bytes().to_vec();
    payload.extend_from_slice(&lat_e7.to_le_bytes());
    payload.extend_from_slice(&lng_e7.to_le_bytes());
    payload.extend_from_slice(&alt.to_le_bytes());
    payload.extend_from_slice(&hdop.to_le_bytes());
    message(GPS_ID, &payload)
}

/// FMT followed by `count` BARO samples climbing one meter per sample
fn steady_baro_log(count: usize) -> Vec<u8> {
    let mut log = baro_fmt();
    for i in 0..count {
        log.extend(baro(i as u64 * 100_000, 10.0 + i as f32));
    }
    log
}

fn collect(data: &[u8]) -> Vec<DecodeResult> {
    DataFlashDecoder::new(data).collect()
}

#[test]
fn test_decodes_valid_log_into_table() {
    let table = parse_log_bytes(&steady_baro_log(12));

    assert_eq!(table.source(), DataSource::Decoded);
    // The FMT message is a row of its own
    assert_eq!(table.len(), 13);
    assert_eq!(table.count_msg_type("FMT"), 1);
    assert_eq!(table.count_msg_type("BARO"), 12);

    let alt = table.numeric_column("Alt");
    assert_eq!(alt.len(), 12);
    assert_eq!(alt[0], 10.0);
    assert_eq!(alt[11], 21.0);
    assert_eq!(table.numeric_column("TimeUS")[11], 1_100_000.0);
}

#[test]
fn test_fmt_frame_carries_definition_fields() {
    let results = collect(&baro_fmt());
    assert_eq!(results.len(), 1);
    match &results[0] {
        DecodeResult::Frame(frame) => {
            assert_eq!(frame.msg_type, "FMT");
            assert_eq!(frame.get("Name"), Some(&FieldValue::from("BARO")));
            assert_eq!(frame.get("Type"), Some(&FieldValue::Number(BARO_ID as f64)));
            assert_eq!(frame.get("Columns"), Some(&FieldValue::from("TimeUS,Alt")));
        }
        other => panic!("expected FMT frame, got {:?}", other),
    }
}

#[test]
fn test_bad_header_resyncs_to_next_marker() {
    let mut log = vec![0x00, 0x11, 0x22];
    log.extend(baro_fmt());
    log.extend(baro(1, 5.0));

    let results = collect(&log);
    assert_eq!(results.len(), 3);
    match &results[0] {
        DecodeResult::Corrupt(corrupt) => {
            assert_eq!(corrupt.offset, 0);
            assert!(matches!(corrupt.reason, LogError::BadHeader { offset: 0 }));
        }
        other => panic!("expected corrupt frame, got {:?}", other),
    }
    assert!(matches!(&results[1], DecodeResult::Frame(f) if f.msg_type == "FMT"));
    assert!(matches!(&results[2], DecodeResult::Frame(f) if f.msg_type == "BARO"));
}

#[test]
fn test_unknown_message_id_is_skipped() {
    let mut log = baro_fmt();
    let unknown_offset = log.len();
    log.extend(message(99, &[0u8; 6]));
    log.extend(baro(1, 5.0));

    let results = collect(&log);
    assert_eq!(results.len(), 3);
    match &results[1] {
        DecodeResult::Corrupt(corrupt) => {
            assert_eq!(corrupt.offset, unknown_offset);
            assert!(matches!(
                corrupt.reason,
                LogError::UnknownMessage { id: 99, offset } if offset == unknown_offset
            ));
        }
        other => panic!("expected corrupt frame, got {:?}", other),
    }
    assert!(matches!(&results[2], DecodeResult::Frame(f) if f.msg_type == "BARO"));
}

#[test]
fn test_truncated_tail_ends_decoding() {
    let mut log = baro_fmt();
    log.extend(baro(1, 5.0));
    let mut tail = baro(2, 6.0);
    tail.truncate(8);
    log.extend(tail);

    let mut decoder = DataFlashDecoder::new(&log);
    assert!(matches!(decoder.next(), Some(DecodeResult::Frame(_))));
    assert!(matches!(decoder.next(), Some(DecodeResult::Frame(_))));
    match decoder.next() {
        Some(DecodeResult::Corrupt(corrupt)) => {
            assert!(matches!(
                corrupt.reason,
                LogError::Truncated { needed: 12, available: 5, .. }
            ));
        }
        other => panic!("expected truncated frame, got {:?}", other),
    }
    assert!(decoder.next().is_none());
    assert_eq!(decoder.position(), log.len());
}

#[test]
fn test_invalid_fmt_does_not_register_layout() {
    // "Qf" needs 15 bytes including the header, not 20
    let mut log = fmt_message(BARO_ID, 20, "BARO", "Qf", "TimeUS,Alt");
    log.extend(baro(1, 5.0));

    let mut decoder = DataFlashDecoder::new(&log);
    match decoder.next() {
        Some(DecodeResult::Corrupt(corrupt)) => {
            assert!(matches!(corrupt.reason, LogError::InvalidFormat { .. }));
        }
        other => panic!("expected invalid format, got {:?}", other),
    }
    assert!(!decoder.formats().contains_key(&BARO_ID));
    match decoder.next() {
        Some(DecodeResult::Corrupt(corrupt)) => {
            assert!(matches!(
                corrupt.reason,
                LogError::UnknownMessage { id: BARO_ID, .. }
            ));
        }
        other => panic!("expected unknown message, got {:?}", other),
    }
}

fn frame_tags(results: &[DecodeResult]) -> Vec<&str> {
    results
        .iter()
        .filter_map(|result| match result {
            DecodeResult::Frame(frame) => Some(frame.msg_type.as_str()),
            DecodeResult::Corrupt(_) => None,
        })
        .collect()
}

#[test]
fn test_every_result_advances_the_cursor() {
    let mut log = vec![0xA3, 0x95];
    log.extend(steady_baro_log(3));
    log.extend([0xA3, 0x95, 200, 0xA3]);

    let mut decoder = DataFlashDecoder::new(&log);
    let mut last = decoder.position();
    let mut results = Vec::new();
    while let Some(result) = decoder.next() {
        assert!(decoder.position() > last);
        last = decoder.position();
        results.push(result);
        assert!(results.len() <= log.len());
    }
    assert_eq!(decoder.position(), log.len());

    // The leading stray header must not swallow the FMT that follows it
    assert_eq!(frame_tags(&results), vec!["FMT", "BARO", "BARO", "BARO"]);
}

#[test]
fn test_orphan_header_before_message_is_recovered() {
    let mut log = baro_fmt();
    let orphan_offset = log.len();
    log.extend([0xA3, 0x95]);
    log.extend(baro(7, 42.0));

    let results = collect(&log);
    assert_eq!(results.len(), 3);
    match &results[1] {
        DecodeResult::Corrupt(corrupt) => {
            assert!(matches!(
                corrupt.reason,
                LogError::UnknownMessage { id: 0xA3, offset } if offset == orphan_offset
            ));
        }
        other => panic!("expected corrupt frame, got {:?}", other),
    }
    match &results[2] {
        DecodeResult::Frame(frame) => {
            assert_eq!(frame.msg_type, "BARO");
            assert_eq!(frame.get("Alt"), Some(&FieldValue::Number(42.0)));
        }
        other => panic!("expected BARO frame, got {:?}", other),
    }
}

#[test]
fn test_garbage_input_falls_back() {
    let garbage: Vec<u8> = (0..4096u32).map(|i| (i * 7 % 251) as u8).collect();
    let parsed = parse_log_bytes_with_limits(&garbage, &ParseLimits::default());

    assert!(parsed.stats.used_fallback);
    assert!(parsed.table.is_fallback());
    assert_eq!(parsed.table.len(), 5);
}

#[test]
fn test_too_few_frames_falls_back() {
    // FMT plus eight samples is nine frames, one short of the minimum
    let parsed = parse_log_bytes_with_limits(&steady_baro_log(8), &ParseLimits::default());
    assert_eq!(parsed.stats.valid_frames, 9);
    assert_eq!(parsed.stats.stop_reason, StopReason::Exhausted);
    assert!(parsed.table.is_fallback());

    let parsed = parse_log_bytes_with_limits(&steady_baro_log(9), &ParseLimits::default());
    assert_eq!(parsed.stats.valid_frames, 10);
    assert!(!parsed.table.is_fallback());
}

#[test]
fn test_consecutive_corruption_stops_parse() {
    let mut log = steady_baro_log(12);
    for _ in 0..15 {
        log.extend(message(77, &[0u8; 4]));
    }
    log.extend(baro(99, 1.0));

    let parsed = parse_log_bytes_with_limits(&log, &ParseLimits::default());
    assert_eq!(parsed.stats.stop_reason, StopReason::ConsecutiveBadLimit);
    assert_eq!(parsed.stats.valid_frames, 13);
    assert_eq!(parsed.stats.bad_frames, 10);
    assert!(!parsed.table.is_fallback());
}

#[test]
fn test_position_jump_detected_end_to_end() {
    let mut log = gps_fmt();
    for i in 0..12 {
        // One degree of latitude is 1e7 units; 0.01 deg is roughly 1.1 km
        let lat = if i < 6 { 100_000_000 } else { 100_100_000 };
        log.extend(gps(i * 200_000, lat, 200_000_000, 30.0, 0.9));
    }

    let table = parse_log_bytes(&log);
    assert!(!table.is_fallback());

    let report = detect_anomalies(&table);
    assert_eq!(report.gps_problems.len(), 1);
    assert_eq!(report.gps_problems[0].kind, "gps_position_jump");
    assert!(report.altitude_issues.is_empty());
    assert_eq!(report.summary.total_anomalies, 1);
}
