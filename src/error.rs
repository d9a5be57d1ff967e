use std::fmt;

/// Reasons a DataFlash log, or a single message inside it, could not be decoded
#[derive(Debug)]
pub enum LogError {
    /// I/O errors while reading a log from disk
    Io(std::io::Error),
    /// The two-byte message header was not found where a message should start
    BadHeader { offset: usize },
    /// A message id with no preceding FMT definition
    UnknownMessage { id: u8, offset: usize },
    /// The buffer ended in the middle of a message
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// An FMT message whose declared layout is self-inconsistent
    InvalidFormat { name: String, reason: String },
    /// A format character outside the DataFlash dialect
    UnsupportedFormatChar { name: String, format_char: char },
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::Io(err) => write!(f, "I/O error: {}", err),
            LogError::BadHeader { offset } => {
                write!(f, "Missing message header at offset {}", offset)
            }
            LogError::UnknownMessage { id, offset } => {
                write!(f, "Unknown message id {} at offset {}", id, offset)
            }
            LogError::Truncated {
                offset,
                needed,
                available,
            } => write!(
                f,
                "Truncated message at offset {}: needed {} bytes, {} available",
                offset, needed, available
            ),
            LogError::InvalidFormat { name, reason } => {
                write!(f, "Invalid format definition '{}': {}", name, reason)
            }
            LogError::UnsupportedFormatChar { name, format_char } => write!(
                f,
                "Unsupported format character '{}' in message '{}'",
                format_char, name
            ),
        }
    }
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LogError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, LogError>;
