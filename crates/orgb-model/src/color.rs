use std::fmt;
use std::str::FromStr;

use orgb_frame::{WireReader, WireWriter};

use crate::error::{ModelError, Result};

/// An RGB color.
///
/// On the wire a color takes 4 bytes, `R, G, B, 0`; the fourth byte is
/// written as zero and ignored on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WIRE_LEN: usize = 4;

    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let bytes = reader.get_slice(Self::WIRE_LEN)?;
        Ok(Self::new(bytes[0], bytes[1], bytes[2]))
    }

    pub fn write(&self, writer: &mut WireWriter<'_>) -> Result<()> {
        writer.put_slice(&[self.r, self.g, self.b, 0])?;
        Ok(())
    }

    /// Decode `count` consecutive colors.
    pub fn decode_many(reader: &mut WireReader<'_>, count: usize) -> Result<Vec<Self>> {
        (0..count).map(|_| Self::decode(reader)).collect()
    }

    /// Write a u16 count followed by the colors.
    pub fn write_list(colors: &[Self], writer: &mut WireWriter<'_>) -> Result<()> {
        let count = list_len(colors.len(), "color list")?;
        writer.put_u16(count)?;
        for color in colors {
            color.write(writer)?;
        }
        Ok(())
    }

    /// Wire length of a counted color list.
    pub fn list_wire_len(count: usize) -> usize {
        2 + count * Self::WIRE_LEN
    }
}

/// Check that a list fits a u16 count prefix.
pub(crate) fn list_len(len: usize, what: &str) -> Result<u16> {
    u16::try_from(len).map_err(|_| ModelError::Argument(format!("{what} too long ({len} entries)")))
}

impl FromStr for Color {
    type Err = ModelError;

    /// Parse `RRGGBB`, optionally prefixed with `#`.
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ModelError::Argument(format!("invalid color '{s}' (expected RRGGBB)")));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| ModelError::Argument(format!("invalid color '{s}' (expected RRGGBB)")))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
