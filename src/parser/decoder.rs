use crate::error::LogError;
use crate::parser::format::{
    decode_field, fmt_definition, validate_format, FMT_TYPE_ID, HEADER_MAGIC,
};
use crate::parser::stream::LogDataStream;
use crate::types::{FieldValue, MessageFormat, TelemetryFrame};
use std::collections::HashMap;

/// A message that could not be decoded and was skipped
#[derive(Debug)]
pub struct CorruptFrame {
    pub offset: usize,
    pub reason: LogError,
}

/// Outcome of decoding one message
#[derive(Debug)]
pub enum DecodeResult {
    Frame(TelemetryFrame),
    Corrupt(CorruptFrame),
}

/// Lazy decoder over a DataFlash binary log.
///
/// Yields one [`DecodeResult`] per message. Corruption never stops the iterator; every
/// result advances the cursor by at least one byte, so the sequence is finite and ends
/// once the buffer is exhausted.
pub struct DataFlashDecoder<'a> {
    stream: LogDataStream<'a>,
    formats: HashMap<u8, MessageFormat>,
}

impl<'a> DataFlashDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        let mut formats = HashMap::new();
        formats.insert(FMT_TYPE_ID, fmt_definition());
        Self {
            stream: LogDataStream::new(data),
            formats,
        }
    }

    /// Byte offset of the next message
    pub fn position(&self) -> usize {
        self.stream.pos
    }

    /// Message layouts registered so far, keyed by message id
    pub fn formats(&self) -> &HashMap<u8, MessageFormat> {
        &self.formats
    }

    fn corrupt(offset: usize, reason: LogError) -> DecodeResult {
        DecodeResult::Corrupt(CorruptFrame { offset, reason })
    }

    fn decode_message(&mut self, offset: usize) -> DecodeResult {
        if !self.stream.peek_matches(&HEADER_MAGIC) {
            self.stream.skip_to_marker(offset + 1, &HEADER_MAGIC);
            return Self::corrupt(offset, LogError::BadHeader { offset });
        }

        self.stream.set_position(offset + HEADER_MAGIC.len());
        let id = match self.stream.read_u8() {
            Ok(id) => id,
            Err(reason) => return Self::corrupt(offset, reason),
        };

        let def = match self.formats.get(&id) {
            Some(def) => def.clone(),
            None => {
                self.stream.skip_to_marker(offset + 1, &HEADER_MAGIC);
                return Self::corrupt(offset, LogError::UnknownMessage { id, offset });
            }
        };

        let payload = match self.stream.read_bytes(def.payload_len()) {
            Ok(payload) => payload,
            Err(reason) => return Self::corrupt(offset, reason),
        };

        let mut frame = TelemetryFrame::new(def.name.clone());
        let mut fields = LogDataStream::new(payload);
        for (format_char, column) in def.format.chars().zip(def.columns.iter()) {
            match decode_field(&mut fields, format_char, column) {
                Ok(value) => frame.fields.push((column.clone(), value)),
                Err(reason) => return Self::corrupt(offset, reason),
            }
        }

        if id == FMT_TYPE_ID {
            if let Err(reason) = self.register_format(&frame) {
                return Self::corrupt(offset, reason);
            }
        }

        DecodeResult::Frame(frame)
    }

    fn register_format(&mut self, frame: &TelemetryFrame) -> crate::error::Result<()> {
        let number = |name: &str| frame.get(name).and_then(FieldValue::as_f64).unwrap_or(0.0);
        let text = |name: &str| {
            frame
                .get(name)
                .and_then(FieldValue::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let def = MessageFormat {
            type_id: number("Type") as u8,
            length: number("Length") as usize,
            name: text("Name"),
            format: text("Format"),
            columns: text("Columns")
                .split(',')
                .map(str::trim)
                .filter(|column| !column.is_empty())
                .map(str::to_string)
                .collect(),
        };
        validate_format(&def)?;
        self.formats.insert(def.type_id, def);
        Ok(())
    }
}

impl<'a> Iterator for DataFlashDecoder<'a> {
    type Item = DecodeResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stream.eof {
            return None;
        }
        let offset = self.stream.pos;
        Some(self.decode_message(offset))
    }
}
