//! Request payload encoders.
//!
//! Every outgoing payload implements [`Writable`]: it reports its exact size
//! up front so the connection can allocate header + payload as one buffer,
//! then fills that buffer through a [`WireWriter`].

use orgb_frame::{cstr_wire_len, WireWriter};

use crate::color::Color;
use crate::error::{ModelError, Result};
use crate::mode::Mode;
use crate::version::ProtocolVersion;

/// A request payload that knows its own wire size.
pub trait Writable: Sync {
    /// Exact number of bytes [`Writable::write`] will emit.
    fn wire_len(&self) -> usize;

    fn write(&self, writer: &mut WireWriter<'_>) -> Result<()>;
}

/// Zero-length payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct Empty;

impl Writable for Empty {
    fn wire_len(&self) -> usize {
        0
    }

    fn write(&self, _writer: &mut WireWriter<'_>) -> Result<()> {
        Ok(())
    }
}

/// Payload of `RequestControllerData`.
///
/// Servers that speak v1+ expect the client's protocol version so they can
/// pick the device layout; a v0 request carries no payload at all.
#[derive(Debug, Clone, Copy)]
pub struct ControllerDataRequest(pub ProtocolVersion);

impl Writable for ControllerDataRequest {
    fn wire_len(&self) -> usize {
        if self.0.number() == 0 {
            0
        } else {
            4
        }
    }

    fn write(&self, writer: &mut WireWriter<'_>) -> Result<()> {
        if self.0.number() != 0 {
            writer.put_u32(self.0.number())?;
        }
        Ok(())
    }
}

/// Payload of `RequestProtocolVersion`: the highest version the client speaks.
#[derive(Debug, Clone, Copy)]
pub struct ProtocolVersionRequest(pub u32);

impl Writable for ProtocolVersionRequest {
    fn wire_len(&self) -> usize {
        4
    }

    fn write(&self, writer: &mut WireWriter<'_>) -> Result<()> {
        writer.put_u32(self.0)?;
        Ok(())
    }
}

/// A bare NUL-terminated ASCII string with no length prefix.
///
/// Payload of `SetClientName`, `SaveProfile`, `LoadProfile` and
/// `DeleteProfile`.
#[derive(Debug, Clone, Copy)]
pub struct NulString<'a>(pub &'a str);

impl Writable for NulString<'_> {
    fn wire_len(&self) -> usize {
        cstr_wire_len(self.0)
    }

    fn write(&self, writer: &mut WireWriter<'_>) -> Result<()> {
        writer.put_cstr(self.0)?;
        Ok(())
    }
}

/// Payload of `UpdateLeds`: every LED of a device, in LED order.
#[derive(Debug, Clone, Copy)]
pub struct UpdateLedsArgs<'a> {
    pub colors: &'a [Color],
}

impl Writable for UpdateLedsArgs<'_> {
    fn wire_len(&self) -> usize {
        4 + Color::list_wire_len(self.colors.len())
    }

    fn write(&self, writer: &mut WireWriter<'_>) -> Result<()> {
        writer.put_u32(size_field(self.wire_len())?)?;
        Color::write_list(self.colors, writer)
    }
}

/// Payload of `UpdateZoneLeds`: the LEDs of one zone.
#[derive(Debug, Clone, Copy)]
pub struct UpdateZoneLedsArgs<'a> {
    pub zone: u32,
    pub colors: &'a [Color],
}

impl Writable for UpdateZoneLedsArgs<'_> {
    fn wire_len(&self) -> usize {
        4 + 4 + Color::list_wire_len(self.colors.len())
    }

    fn write(&self, writer: &mut WireWriter<'_>) -> Result<()> {
        writer.put_u32(size_field(self.wire_len())?)?;
        writer.put_u32(self.zone)?;
        Color::write_list(self.colors, writer)
    }
}

/// Payload of `UpdateSingleLed`.
#[derive(Debug, Clone, Copy)]
pub struct UpdateSingleLedArgs {
    pub led: i32,
    pub color: Color,
}

impl Writable for UpdateSingleLedArgs {
    fn wire_len(&self) -> usize {
        4 + Color::WIRE_LEN
    }

    fn write(&self, writer: &mut WireWriter<'_>) -> Result<()> {
        writer.put_i32(self.led)?;
        self.color.write(writer)
    }
}

/// Payload of `ResizeZone`.
#[derive(Debug, Clone, Copy)]
pub struct ResizeZoneArgs {
    pub zone: i32,
    pub size: i32,
}

impl Writable for ResizeZoneArgs {
    fn wire_len(&self) -> usize {
        8
    }

    fn write(&self, writer: &mut WireWriter<'_>) -> Result<()> {
        writer.put_i32(self.zone)?;
        writer.put_i32(self.size)?;
        Ok(())
    }
}

/// Payload of `UpdateMode` and `SaveMode`.
///
/// The mode is laid out for `version`, so it must be the negotiated one.
#[derive(Debug, Clone, Copy)]
pub struct UpdateModeArgs<'a> {
    pub mode: &'a Mode,
    pub version: ProtocolVersion,
}

impl Writable for UpdateModeArgs<'_> {
    fn wire_len(&self) -> usize {
        4 + 4 + self.mode.wire_len(self.version)
    }

    fn write(&self, writer: &mut WireWriter<'_>) -> Result<()> {
        let index = i32::try_from(self.mode.index())
            .map_err(|_| ModelError::Argument(format!("mode index {} too large", self.mode.index())))?;
        writer.put_u32(size_field(self.wire_len())?)?;
        writer.put_i32(index)?;
        self.mode.write(writer, self.version)
    }
}

/// Payload of `PluginSpecific`: a plugin-defined packet type and body.
#[derive(Debug, Clone, Copy)]
pub struct PluginSpecificArgs<'a> {
    pub packet_type: u32,
    pub data: &'a [u8],
}

impl Writable for PluginSpecificArgs<'_> {
    fn wire_len(&self) -> usize {
        4 + self.data.len()
    }

    fn write(&self, writer: &mut WireWriter<'_>) -> Result<()> {
        writer.put_u32(self.packet_type)?;
        writer.put_slice(self.data)?;
        Ok(())
    }
}

/// Payload passed through untouched.
#[derive(Debug, Clone, Copy)]
pub struct RawBytes<'a>(pub &'a [u8]);

impl Writable for RawBytes<'_> {
    fn wire_len(&self) -> usize {
        self.0.len()
    }

    fn write(&self, writer: &mut WireWriter<'_>) -> Result<()> {
        writer.put_slice(self.0)?;
        Ok(())
    }
}

/// Serialize a writable into a freshly sized buffer.
pub fn to_vec(writable: &dyn Writable) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; writable.wire_len()];
    let mut writer = WireWriter::new(&mut buf);
    writable.write(&mut writer)?;
    debug_assert_eq!(writer.remaining(), 0, "wire_len overestimated the payload");
    Ok(buf)
}

fn size_field(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| ModelError::Argument(format!("payload of {len} bytes too large")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgb_frame::WireReader;

    #[test]
    fn controller_data_request_empty_at_v0() {
        assert!(to_vec(&ControllerDataRequest(ProtocolVersion::V0)).unwrap().is_empty());
        assert_eq!(
            to_vec(&ControllerDataRequest(ProtocolVersion::V3)).unwrap(),
            [3, 0, 0, 0]
        );
    }

    #[test]
    fn client_name_is_bare_cstr() {
        assert_eq!(to_vec(&NulString("orgb")).unwrap(), b"orgb\0");
        assert!(to_vec(&NulString("caf\u{e9}")).is_err());
    }

    #[test]
    fn update_leds_layout() {
        let colors = [Color::new(1, 2, 3), Color::new(4, 5, 6)];
        let bytes = to_vec(&UpdateLedsArgs { colors: &colors }).unwrap();

        assert_eq!(bytes.len(), 4 + 2 + 8);
        let mut reader = WireReader::new(&bytes);
        assert_eq!(reader.get_u32().unwrap() as usize, bytes.len());
        assert_eq!(reader.get_u16().unwrap(), 2);
        assert_eq!(reader.rest(), [1, 2, 3, 0, 4, 5, 6, 0]);
    }

    #[test]
    fn update_zone_leds_layout() {
        let colors = [Color::WHITE];
        let bytes = to_vec(&UpdateZoneLedsArgs { zone: 3, colors: &colors }).unwrap();
        assert_eq!(
            bytes,
            [14, 0, 0, 0, 3, 0, 0, 0, 1, 0, 255, 255, 255, 0]
        );
    }

    #[test]
    fn single_led_and_resize() {
        let bytes = to_vec(&UpdateSingleLedArgs {
            led: 7,
            color: Color::new(0xAA, 0xBB, 0xCC),
        })
        .unwrap();
        assert_eq!(bytes, [7, 0, 0, 0, 0xAA, 0xBB, 0xCC, 0]);

        let bytes = to_vec(&ResizeZoneArgs { zone: 1, size: 60 }).unwrap();
        assert_eq!(bytes, [1, 0, 0, 0, 60, 0, 0, 0]);
    }

    #[test]
    fn plugin_specific_prefixes_packet_type() {
        let bytes = to_vec(&PluginSpecificArgs {
            packet_type: 2,
            data: &[9, 9],
        })
        .unwrap();
        assert_eq!(bytes, [2, 0, 0, 0, 9, 9]);
        assert_eq!(to_vec(&RawBytes(&[1, 2])).unwrap(), [1, 2]);
        assert!(to_vec(&Empty).unwrap().is_empty());
    }

    #[test]
    fn update_mode_prefixes_size_and_index() {
        // "Static", value 1, per-LED color only, all numeric fields zero, no colors.
        let mut mode_bytes = vec![7, 0];
        mode_bytes.extend_from_slice(b"Static\0");
        mode_bytes.extend_from_slice(&1i32.to_le_bytes());
        mode_bytes.extend_from_slice(&(1u32 << 5).to_le_bytes());
        mode_bytes.extend_from_slice(&[0u8; 4 * 6]);
        mode_bytes.extend_from_slice(&1u32.to_le_bytes());
        mode_bytes.extend_from_slice(&0u16.to_le_bytes());

        let mode = Mode::decode(&mut WireReader::new(&mode_bytes), ProtocolVersion::V2, 3).unwrap();
        let bytes = to_vec(&UpdateModeArgs {
            mode: &mode,
            version: ProtocolVersion::V2,
        })
        .unwrap();

        let mut reader = WireReader::new(&bytes);
        assert_eq!(reader.get_u32().unwrap() as usize, bytes.len());
        assert_eq!(reader.get_i32().unwrap(), 3);
        assert_eq!(reader.rest(), &mode_bytes[..]);
    }
}
