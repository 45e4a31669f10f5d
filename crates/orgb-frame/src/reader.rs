use crate::error::{FrameError, Result};

/// Cursor over a received payload.
///
/// All integers are little-endian. Every getter is bounds-checked; running off
/// the end returns [`FrameError::OutOfBounds`] and leaves the cursor where it was.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(FrameError::OutOfBounds {
                offset: self.pos,
                needed: len,
                remaining: self.remaining(),
            });
        }
        let out = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn get_u8(&mut self) -> Result<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn get_u16(&mut self) -> Result<u16> {
        self.take_array().map(u16::from_le_bytes)
    }

    pub fn get_u32(&mut self) -> Result<u32> {
        self.take_array().map(u32::from_le_bytes)
    }

    pub fn get_i32(&mut self) -> Result<i32> {
        self.take_array().map(i32::from_le_bytes)
    }

    /// Borrow the next `len` raw bytes.
    pub fn get_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        self.take(len)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    /// Read a u16 length-prefixed string whose length counts a trailing NUL.
    ///
    /// A zero prefix yields the empty string. Bytes outside ASCII are replaced
    /// rather than rejected, since device names come from firmware.
    pub fn get_string(&mut self) -> Result<String> {
        let len = self.get_u16()? as usize;
        if len == 0 {
            return Ok(String::new());
        }
        let bytes = self.take(len)?;
        let text = match bytes.split_last() {
            Some((0, text)) => text,
            _ => bytes,
        };
        Ok(String::from_utf8_lossy(text).into_owned())
    }

    /// Read everything that is left.
    pub fn rest(&mut self) -> &'a [u8] {
        let out = &self.buf[self.pos..];
        self.pos = self.buf.len();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_primitives() {
        let bytes = [0x7F, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut reader = WireReader::new(&bytes);

        assert_eq!(reader.get_u8().unwrap(), 0x7F);
        assert_eq!(reader.get_u16().unwrap(), 0x1234);
        assert_eq!(reader.get_u32().unwrap(), 0x1234_5678);
        assert_eq!(reader.get_i32().unwrap(), -1);
        assert!(reader.is_empty());
    }

    #[test]
    fn reads_string_without_terminator() {
        let bytes = [0x04, 0x00, b'D', b'R', b'A', 0x00, 0xAA];
        let mut reader = WireReader::new(&bytes);

        assert_eq!(reader.get_string().unwrap(), "DRA");
        assert_eq!(reader.position(), 6);
        assert_eq!(reader.get_u8().unwrap(), 0xAA);
    }

    #[test]
    fn zero_length_string_is_empty() {
        let mut reader = WireReader::new(&[0x00, 0x00]);
        assert_eq!(reader.get_string().unwrap(), "");
        assert!(reader.is_empty());
    }

    #[test]
    fn overrun_reports_offset_and_keeps_cursor() {
        let mut reader = WireReader::new(&[0x01, 0x02, 0x03]);
        reader.get_u8().unwrap();

        let err = reader.get_u32().unwrap_err();
        assert!(matches!(
            err,
            FrameError::OutOfBounds {
                offset: 1,
                needed: 4,
                remaining: 2
            }
        ));
        assert_eq!(reader.position(), 1);
        assert_eq!(reader.get_u16().unwrap(), 0x0302);
    }

    #[test]
    fn string_longer_than_buffer_fails() {
        let mut reader = WireReader::new(&[0x10, 0x00, b'a', 0x00]);
        assert!(matches!(
            reader.get_string(),
            Err(FrameError::OutOfBounds { needed: 16, .. })
        ));
    }

    #[test]
    fn slices_skip_and_rest() {
        let bytes = [1, 2, 3, 4, 5, 6];
        let mut reader = WireReader::new(&bytes);

        assert_eq!(reader.get_slice(2).unwrap(), &[1, 2]);
        reader.skip(1).unwrap();
        assert_eq!(reader.rest(), &[4, 5, 6]);
        assert_eq!(reader.remaining(), 0);
    }
}
