//! DataFlash message layout definitions
//!
//! Each message type is described by an FMT message whose format string uses one
//! character per field. This module knows the width and scaling of every character.

use crate::error::{LogError, Result};
use crate::parser::stream::LogDataStream;
use crate::types::{FieldValue, MessageFormat};

/// Two-byte marker preceding every message
pub const HEADER_MAGIC: [u8; 2] = [0xA3, 0x95];
/// Marker plus message id
pub const HEADER_LEN: usize = 3;

pub const FMT_TYPE_ID: u8 = 128;
pub const FMT_NAME: &str = "FMT";
pub const FMT_LENGTH: usize = 89;
pub const FMT_FORMAT: &str = "BBnNZ";
pub const FMT_COLUMNS: [&str; 5] = ["Type", "Length", "Name", "Format", "Columns"];

/// Width in bytes of a format character, `None` if the character is not part of the dialect
pub fn format_char_size(format_char: char) -> Option<usize> {
    let size = match format_char {
        'b' | 'B' | 'M' => 1,
        'h' | 'H' | 'c' | 'C' => 2,
        'i' | 'I' | 'f' | 'e' | 'E' | 'L' => 4,
        'd' | 'q' | 'Q' => 8,
        'n' => 4,
        'N' => 16,
        'Z' => 64,
        'a' => 64,
        _ => return None,
    };
    Some(size)
}

/// The self-describing definition of FMT messages
pub fn fmt_definition() -> MessageFormat {
    MessageFormat {
        type_id: FMT_TYPE_ID,
        length: FMT_LENGTH,
        name: FMT_NAME.to_string(),
        format: FMT_FORMAT.to_string(),
        columns: FMT_COLUMNS.iter().map(|c| c.to_string()).collect(),
    }
}

/// Check that a definition can be decoded: known characters, one column per
/// character, and a payload width matching the declared length
pub fn validate_format(def: &MessageFormat) -> Result<()> {
    let mut payload = 0usize;
    for format_char in def.format.chars() {
        payload += format_char_size(format_char).ok_or_else(|| LogError::UnsupportedFormatChar {
            name: def.name.clone(),
            format_char,
        })?;
    }

    let field_count = def.format.chars().count();
    if field_count != def.columns.len() {
        return Err(LogError::InvalidFormat {
            name: def.name.clone(),
            reason: format!(
                "{} format characters but {} columns",
                field_count,
                def.columns.len()
            ),
        });
    }

    if payload + HEADER_LEN != def.length {
        return Err(LogError::InvalidFormat {
            name: def.name.clone(),
            reason: format!(
                "declared length {} but fields need {}",
                def.length,
                payload + HEADER_LEN
            ),
        });
    }

    Ok(())
}

/// Decode one field of the given format character, applying the dialect's scaling
pub fn decode_field(
    stream: &mut LogDataStream,
    format_char: char,
    name: &str,
) -> Result<FieldValue> {
    let value = match format_char {
        'b' => FieldValue::Number(stream.read_i8()? as f64),
        'B' | 'M' => FieldValue::Number(stream.read_u8()? as f64),
        'h' => FieldValue::Number(stream.read_i16()? as f64),
        'H' => FieldValue::Number(stream.read_u16()? as f64),
        'i' => FieldValue::Number(stream.read_i32()? as f64),
        'I' => FieldValue::Number(stream.read_u32()? as f64),
        'f' => FieldValue::Number(stream.read_f32()? as f64),
        'd' => FieldValue::Number(stream.read_f64()?),
        'q' => FieldValue::Number(stream.read_i64()? as f64),
        'Q' => FieldValue::Number(stream.read_u64()? as f64),
        'c' => FieldValue::Number(stream.read_i16()? as f64 / 100.0),
        'C' => FieldValue::Number(stream.read_u16()? as f64 / 100.0),
        'e' => FieldValue::Number(stream.read_i32()? as f64 / 100.0),
        'E' => FieldValue::Number(stream.read_u32()? as f64 / 100.0),
        'L' => FieldValue::Number(stream.read_i32()? as f64 * 1.0e-7),
        'n' => FieldValue::Text(stream.read_string(4)?),
        'N' => FieldValue::Text(stream.read_string(16)?),
        'Z' => FieldValue::Text(stream.read_string(64)?),
        'a' => {
            let mut values = Vec::with_capacity(32);
            for _ in 0..32 {
                values.push(stream.read_i16()? as f64);
            }
            FieldValue::Array(values)
        }
        _ => {
            return Err(LogError::UnsupportedFormatChar {
                name: name.to_string(),
                format_char,
            })
        }
    };
    Ok(value)
}
