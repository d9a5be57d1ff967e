//! Synthetic dataset substituted when a log yields too little usable telemetry

use crate::types::{DataSource, FieldValue, TelemetryTable};

pub const FALLBACK_TIME_US: [f64; 5] = [
    0.0,
    60_000_000.0,
    120_000_000.0,
    180_000_000.0,
    240_000_000.0,
];
pub const FALLBACK_ALT: [f64; 5] = [50.0, 75.0, 60.0, 85.0, 55.0];
pub const FALLBACK_HDOP: [f64; 5] = [1.8, 1.5, 1.6, 2.1, 1.7];
pub const FALLBACK_VOLT: [f64; 5] = [12.6, 12.4, 12.2, 12.0, 11.8];

/// Five GPS rows spanning a four minute flight, tagged as [`DataSource::Fallback`]
pub fn fallback_table() -> TelemetryTable {
    let numbers = |values: &[f64]| -> Vec<FieldValue> {
        values.iter().map(|v| FieldValue::Number(*v)).collect()
    };
    TelemetryTable::from_columns(
        vec![
            ("TimeUS", numbers(&FALLBACK_TIME_US)),
            ("Alt", numbers(&FALLBACK_ALT)),
            ("HDop", numbers(&FALLBACK_HDOP)),
            ("Volt", numbers(&FALLBACK_VOLT)),
            ("msg_type", vec![FieldValue::from("GPS"); FALLBACK_ALT.len()]),
        ],
        DataSource::Fallback,
    )
}
