use orgb_frame::WireReader;

use crate::error::Result;

/// A single LED as reported by a device.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Led {
    pub index: usize,
    pub name: String,
    /// Device-specific value (often a key code or channel number).
    pub value: u32,
}

impl Led {
    pub fn decode(reader: &mut WireReader<'_>, index: usize) -> Result<Self> {
        let name = reader.get_string()?;
        let value = reader.get_u32()?;
        Ok(Self { index, name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_name_and_value() {
        let bytes = [0x04, 0x00, b'K', b'e', b'y', 0x00, 0x2A, 0x00, 0x00, 0x00];
        let mut reader = WireReader::new(&bytes);
        let led = Led::decode(&mut reader, 3).unwrap();

        assert_eq!(led.index, 3);
        assert_eq!(led.name, "Key");
        assert_eq!(led.value, 42);
        assert!(reader.is_empty());
    }
}
