use crate::error::{FrameError, Result};

/// Largest string accepted by [`WireWriter::put_string`]: the u16 prefix also counts the NUL.
pub const MAX_STRING_LEN: usize = u16::MAX as usize - 1;

/// Number of bytes [`WireWriter::put_string`] emits for `s`.
pub fn string_wire_len(s: &str) -> usize {
    2 + s.len() + 1
}

/// Number of bytes [`WireWriter::put_cstr`] emits for `s`.
pub fn cstr_wire_len(s: &str) -> usize {
    s.len() + 1
}

/// Cursor over a fixed-capacity output region.
///
/// Outgoing buffers are sized up front to header + payload; the writer never
/// grows them. Writing past the end returns [`FrameError::OutOfBounds`].
#[derive(Debug)]
pub struct WireWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> WireWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Write raw bytes.
    pub fn put_slice(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.remaining() {
            return Err(FrameError::OutOfBounds {
                offset: self.pos,
                needed: bytes.len(),
                remaining: self.remaining(),
            });
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    pub fn put_u8(&mut self, value: u8) -> Result<()> {
        self.put_slice(&[value])
    }

    pub fn put_u16(&mut self, value: u16) -> Result<()> {
        self.put_slice(&value.to_le_bytes())
    }

    pub fn put_u32(&mut self, value: u32) -> Result<()> {
        self.put_slice(&value.to_le_bytes())
    }

    pub fn put_i32(&mut self, value: i32) -> Result<()> {
        self.put_slice(&value.to_le_bytes())
    }

    /// Write `len(s) + 1` as u16, the ASCII bytes, then a NUL.
    pub fn put_string(&mut self, s: &str) -> Result<()> {
        check_ascii(s)?;
        if s.len() > MAX_STRING_LEN {
            return Err(FrameError::StringTooLong(s.len()));
        }
        if string_wire_len(s) > self.remaining() {
            return Err(FrameError::OutOfBounds {
                offset: self.pos,
                needed: string_wire_len(s),
                remaining: self.remaining(),
            });
        }
        self.put_u16((s.len() + 1) as u16)?;
        self.put_slice(s.as_bytes())?;
        self.put_u8(0)
    }

    /// Write the ASCII bytes followed by a NUL, without a length prefix.
    ///
    /// Client name and profile commands carry their string this way.
    pub fn put_cstr(&mut self, s: &str) -> Result<()> {
        check_ascii(s)?;
        if cstr_wire_len(s) > self.remaining() {
            return Err(FrameError::OutOfBounds {
                offset: self.pos,
                needed: cstr_wire_len(s),
                remaining: self.remaining(),
            });
        }
        self.put_slice(s.as_bytes())?;
        self.put_u8(0)
    }
}

fn check_ascii(s: &str) -> Result<()> {
    if s.is_ascii() {
        Ok(())
    } else {
        Err(FrameError::NonAscii(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::WireReader;

    #[test]
    fn writes_little_endian_primitives() {
        let mut buf = [0u8; 11];
        let mut writer = WireWriter::new(&mut buf);

        writer.put_u8(0x7F).unwrap();
        writer.put_u16(0x1234).unwrap();
        writer.put_u32(0x1234_5678).unwrap();
        writer.put_i32(-2).unwrap();
        assert_eq!(writer.remaining(), 0);

        assert_eq!(
            buf,
            [0x7F, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xFE, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn string_prefix_counts_terminator() {
        let mut buf = [0u8; 6];
        let mut writer = WireWriter::new(&mut buf);
        writer.put_string("RGB").unwrap();
        assert_eq!(writer.position(), string_wire_len("RGB"));
        assert_eq!(buf, [0x04, 0x00, b'R', b'G', b'B', 0x00]);
    }

    #[test]
    fn strings_read_back() {
        for s in ["", "a", "Corsair Vengeance RGB", &"x".repeat(300)] {
            let mut buf = vec![0u8; string_wire_len(s)];
            WireWriter::new(&mut buf).put_string(s).unwrap();

            let mut reader = WireReader::new(&buf);
            assert_eq!(reader.get_string().unwrap(), s);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn cstr_has_no_prefix() {
        let mut buf = [0u8; 4];
        WireWriter::new(&mut buf).put_cstr("cli").unwrap();
        assert_eq!(&buf, b"cli\0");
    }

    #[test]
    fn overflow_is_rejected_without_partial_write() {
        let mut buf = [0u8; 5];
        let mut writer = WireWriter::new(&mut buf);
        writer.put_u16(1).unwrap();

        let err = writer.put_string("abc").unwrap_err();
        assert!(matches!(
            err,
            FrameError::OutOfBounds {
                offset: 2,
                needed: 6,
                remaining: 3
            }
        ));
        assert_eq!(writer.position(), 2);
        assert!(writer.put_u32(0).is_err());
    }

    #[test]
    fn non_ascii_rejected() {
        let mut buf = [0u8; 32];
        let mut writer = WireWriter::new(&mut buf);
        assert!(matches!(
            writer.put_string("Grün"),
            Err(FrameError::NonAscii(_))
        ));
        assert!(matches!(writer.put_cstr("é"), Err(FrameError::NonAscii(_))));
    }
}
