use crate::error::{LogError, Result};

/// Little-endian cursor over an in-memory DataFlash log
pub struct LogDataStream<'a> {
    data: &'a [u8],
    pub pos: usize,
    end: usize,
    pub eof: bool,
}

impl<'a> LogDataStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            end: data.len(),
            eof: data.is_empty(),
        }
    }

    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.end);
        self.eof = self.pos >= self.end;
    }

    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    /// Borrow the next `len` bytes and advance past them
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            let err = LogError::Truncated {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            };
            self.set_position(self.end);
            return Err(err);
        }
        let data = self.data;
        let slice = &data[self.pos..self.pos + len];
        self.set_position(self.pos + len);
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    /// Read a fixed-width NUL-padded string
    pub fn read_string(&mut self, width: usize) -> Result<String> {
        let raw = self.read_bytes(width)?;
        let text_end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(String::from_utf8_lossy(&raw[..text_end]).into_owned())
    }

    /// Does the stream continue with `pattern` at the current position?
    pub fn peek_matches(&self, pattern: &[u8]) -> bool {
        self.data[self.pos..self.end].starts_with(pattern)
    }

    /// Advance to the next occurrence of `marker` at or after `from`, or to the end.
    /// Returns whether a marker was found.
    pub fn skip_to_marker(&mut self, from: usize, marker: &[u8]) -> bool {
        let start = from.min(self.end);
        let found = self.data[start..self.end]
            .windows(marker.len())
            .position(|window| window == marker);
        match found {
            Some(offset) => {
                self.set_position(start + offset);
                true
            }
            None => {
                self.set_position(self.end);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_reads() {
        let data = [0x34, 0x12, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x80, 0x3f];
        let mut stream = LogDataStream::new(&data);
        assert_eq!(stream.read_u16().unwrap(), 0x1234);
        assert_eq!(stream.read_i32().unwrap(), -1);
        assert_eq!(stream.read_f32().unwrap(), 1.0);
        assert!(stream.eof);
    }

    #[test]
    fn test_truncated_read_consumes_rest() {
        let data = [1u8, 2, 3];
        let mut stream = LogDataStream::new(&data);
        stream.read_u8().unwrap();
        let err = stream.read_u32().unwrap_err();
        assert!(matches!(
            err,
            LogError::Truncated {
                offset: 1,
                needed: 4,
                available: 2
            }
        ));
        assert!(stream.eof);
    }

    #[test]
    fn test_read_string_trims_nul_padding() {
        let data = *b"GPS\0";
        let mut stream = LogDataStream::new(&data);
        assert_eq!(stream.read_string(4).unwrap(), "GPS");
    }

    #[test]
    fn test_skip_to_marker() {
        let data = [0u8, 1, 0xA3, 0x95, 7];
        let mut stream = LogDataStream::new(&data);
        assert!(stream.skip_to_marker(1, &[0xA3, 0x95]));
        assert_eq!(stream.pos, 2);
        assert!(!stream.skip_to_marker(3, &[0xA3, 0x95]));
        assert!(stream.eof);
    }
}
