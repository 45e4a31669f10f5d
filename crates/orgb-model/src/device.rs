use orgb_frame::WireReader;
use tracing::{debug, warn};

use crate::color::Color;
use crate::error::Result;
use crate::led::Led;
use crate::mode::Mode;
use crate::version::ProtocolVersion;
use crate::zone::Zone;

/// Kind of hardware a controller drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DeviceType {
    Motherboard,
    Dram,
    Gpu,
    Cooler,
    LedStrip,
    Keyboard,
    Mouse,
    Mousemat,
    Headset,
    HeadsetStand,
    Gamepad,
    Light,
    Speaker,
    Virtual,
    Storage,
    Case,
    Microphone,
    Accessory,
    Keypad,
    Unknown,
}

impl DeviceType {
    /// Map a wire value; anything unrecognised becomes [`DeviceType::Unknown`].
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::Motherboard,
            1 => Self::Dram,
            2 => Self::Gpu,
            3 => Self::Cooler,
            4 => Self::LedStrip,
            5 => Self::Keyboard,
            6 => Self::Mouse,
            7 => Self::Mousemat,
            8 => Self::Headset,
            9 => Self::HeadsetStand,
            10 => Self::Gamepad,
            11 => Self::Light,
            12 => Self::Speaker,
            13 => Self::Virtual,
            14 => Self::Storage,
            15 => Self::Case,
            16 => Self::Microphone,
            17 => Self::Accessory,
            18 => Self::Keypad,
            _ => Self::Unknown,
        }
    }
}

/// Snapshot of one controller as returned by `RequestControllerData`.
///
/// Decoded wholesale from a single payload; refresh it by requesting again
/// rather than patching it in place.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Device {
    pub index: u32,
    pub device_type: DeviceType,
    pub name: String,
    /// Only transmitted from protocol v1.
    pub vendor: Option<String>,
    pub description: String,
    pub version: String,
    pub serial: String,
    pub location: String,
    pub active_mode: i32,
    pub modes: Vec<Mode>,
    pub zones: Vec<Zone>,
    pub leds: Vec<Led>,
    pub colors: Vec<Color>,
}

impl Device {
    /// Decode a full controller-data payload for controller `index`.
    pub fn from_payload(payload: &[u8], version: ProtocolVersion, index: u32) -> Result<Self> {
        let mut reader = WireReader::new(payload);
        let device = Self::decode(&mut reader, version, index)?;
        if !reader.is_empty() {
            debug!(
                index,
                trailing = reader.remaining(),
                "ignoring trailing bytes after device data"
            );
        }
        Ok(device)
    }

    /// Decode a device starting at the reader's cursor.
    pub fn decode(reader: &mut WireReader<'_>, version: ProtocolVersion, index: u32) -> Result<Self> {
        let start = reader.position();
        let declared = reader.get_u32()? as usize;
        let available = reader.remaining() + 4;
        if declared != available {
            warn!(
                index,
                declared,
                available,
                offset = start,
                "device data size disagrees with payload length"
            );
        }

        let device_type = DeviceType::from_i32(reader.get_i32()?);
        let name = reader.get_string()?;
        let vendor = if version.supports_vendor_string() {
            Some(reader.get_string()?)
        } else {
            None
        };
        let description = reader.get_string()?;
        let fw_version = reader.get_string()?;
        let serial = reader.get_string()?;
        let location = reader.get_string()?;

        let mode_count = reader.get_u16()? as usize;
        let active_mode = reader.get_i32()?;
        let modes = (0..mode_count)
            .map(|i| Mode::decode(reader, version, i))
            .collect::<Result<Vec<_>>>()?;

        let zone_count = reader.get_u16()? as usize;
        let zones = (0..zone_count)
            .map(|i| Zone::decode(reader, version, i))
            .collect::<Result<Vec<_>>>()?;

        let led_count = reader.get_u16()? as usize;
        let leds = (0..led_count)
            .map(|i| Led::decode(reader, i))
            .collect::<Result<Vec<_>>>()?;

        let color_count = reader.get_u16()? as usize;
        let colors = Color::decode_many(reader, color_count)?;

        Ok(Self {
            index,
            device_type,
            name,
            vendor,
            description,
            version: fw_version,
            serial,
            location,
            active_mode,
            modes,
            zones,
            leds,
            colors,
        })
    }

    /// The currently active mode, if the index is in range.
    pub fn active_mode(&self) -> Option<&Mode> {
        usize::try_from(self.active_mode)
            .ok()
            .and_then(|i| self.modes.get(i))
    }

    /// Find a mode by name, ignoring ASCII case.
    pub fn mode_by_name(&self, name: &str) -> Option<&Mode> {
        self.modes
            .iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(name))
    }

    /// Find the index of the "Direct" (or failing that "Custom"/"Static") mode.
    pub fn direct_mode_index(&self) -> Option<usize> {
        ["Direct", "Custom", "Static"]
            .iter()
            .find_map(|name| self.mode_by_name(name))
            .map(Mode::index)
    }
}

#[cfg(test)]
mod tests {
    use orgb_frame::FrameError;

    use super::*;
    use crate::error::ModelError;
    use crate::zone::ZoneType;

    /// Builds device payloads in server field order.
    struct PayloadBuilder {
        body: Vec<u8>,
    }

    impl PayloadBuilder {
        fn new() -> Self {
            Self { body: Vec::new() }
        }

        fn string(mut self, s: &str) -> Self {
            self.body.extend_from_slice(&((s.len() + 1) as u16).to_le_bytes());
            self.body.extend_from_slice(s.as_bytes());
            self.body.push(0);
            self
        }

        fn u16(mut self, v: u16) -> Self {
            self.body.extend_from_slice(&v.to_le_bytes());
            self
        }

        fn u32(mut self, v: u32) -> Self {
            self.body.extend_from_slice(&v.to_le_bytes());
            self
        }

        fn i32(mut self, v: i32) -> Self {
            self.body.extend_from_slice(&v.to_le_bytes());
            self
        }

        fn bytes(mut self, b: &[u8]) -> Self {
            self.body.extend_from_slice(b);
            self
        }

        fn finish(self) -> Vec<u8> {
            let mut out = ((self.body.len() + 4) as u32).to_le_bytes().to_vec();
            out.extend_from_slice(&self.body);
            out
        }
    }

    fn direct_mode(b: PayloadBuilder, version: ProtocolVersion) -> PayloadBuilder {
        let b = b
            .string("Direct")
            .i32(0)
            .u32(1 << 5) // per-LED color
            .u32(0)
            .u32(0);
        let b = if version.supports_brightness_and_save_mode() {
            b.u32(0).u32(0)
        } else {
            b
        };
        let b = b.u32(0).u32(0).u32(0);
        let b = if version.supports_brightness_and_save_mode() {
            b.u32(0)
        } else {
            b
        };
        b.u32(0).u32(1).u16(0)
    }

    fn device_payload(version: ProtocolVersion) -> Vec<u8> {
        let b = PayloadBuilder::new().i32(1).string("Vengeance");
        let b = if version.supports_vendor_string() {
            b.string("Corsair")
        } else {
            b
        };
        let b = b
            .string("DDR4 module")
            .string("1.0")
            .string("SN123")
            .string("I2C: /dev/i2c-1")
            .u16(1)
            .i32(0);
        let b = direct_mode(b, version);
        let b = b
            .u16(1)
            .string("DRAM")
            .i32(1)
            .u32(2)
            .u32(2)
            .u32(2)
            .u16(0);
        let b = if version.supports_segments_and_plugins() {
            b.u16(0)
        } else {
            b
        };
        b.u16(2)
            .string("LED 1")
            .u32(0)
            .string("LED 2")
            .u32(1)
            .u16(2)
            .bytes(&[255, 0, 0, 0, 0, 255, 0, 0])
            .finish()
    }

    #[test]
    fn decodes_every_version() {
        for number in 0..=4 {
            let version = ProtocolVersion::from_number(number).unwrap();
            let payload = device_payload(version);
            let mut reader = WireReader::new(&payload);
            let device = Device::decode(&mut reader, version, 7).unwrap();

            assert!(reader.is_empty(), "{version}: {} bytes left", reader.remaining());
            assert_eq!(device.index, 7);
            assert_eq!(device.device_type, DeviceType::Dram);
            assert_eq!(device.name, "Vengeance");
            assert_eq!(device.description, "DDR4 module");
            assert_eq!(device.version, "1.0");
            assert_eq!(device.serial, "SN123");
            assert_eq!(device.location, "I2C: /dev/i2c-1");
            assert_eq!(device.modes.len(), 1);
            assert_eq!(device.active_mode().map(Mode::name), Some("Direct"));
            assert_eq!(device.zones.len(), 1);
            assert_eq!(device.zones[0].zone_type, ZoneType::Linear);
            assert_eq!(
                device.zones[0].segments.is_some(),
                version.supports_segments_and_plugins()
            );
            assert_eq!(device.leds[1].name, "LED 2");
            assert_eq!(device.colors, vec![Color::new(255, 0, 0), Color::new(0, 255, 0)]);
        }
    }

    #[test]
    fn v0_payload_has_no_vendor() {
        let payload = device_payload(ProtocolVersion::V0);
        let device = Device::from_payload(&payload, ProtocolVersion::V0, 0).unwrap();
        assert_eq!(device.vendor, None);
        assert_eq!(device.description, "DDR4 module");
    }

    #[test]
    fn v1_payload_has_vendor() {
        let payload = device_payload(ProtocolVersion::V1);
        let device = Device::from_payload(&payload, ProtocolVersion::V1, 0).unwrap();
        assert_eq!(device.vendor.as_deref(), Some("Corsair"));
    }

    #[test]
    fn wrong_version_desynchronizes() {
        // A v1 payload read as v0 takes the vendor string for the description
        // and every later field shifts by one string: the location's length
        // prefix becomes the mode count and the first mode name overruns.
        let payload = device_payload(ProtocolVersion::V1);
        let err = Device::from_payload(&payload, ProtocolVersion::V0, 0).unwrap_err();
        assert!(
            matches!(err, ModelError::Frame(FrameError::OutOfBounds { .. })),
            "{err:?}"
        );
    }

    #[test]
    fn truncated_payload_fails() {
        let payload = device_payload(ProtocolVersion::V3);
        assert!(Device::from_payload(&payload[..payload.len() - 1], ProtocolVersion::V3, 0).is_err());
    }

    #[test]
    fn unknown_device_type_maps_to_unknown() {
        assert_eq!(DeviceType::from_i32(5), DeviceType::Keyboard);
        assert_eq!(DeviceType::from_i32(99), DeviceType::Unknown);
        assert_eq!(DeviceType::from_i32(-1), DeviceType::Unknown);
    }

    #[test]
    fn direct_mode_lookup() {
        let payload = device_payload(ProtocolVersion::V4);
        let device = Device::from_payload(&payload, ProtocolVersion::V4, 0).unwrap();
        assert_eq!(device.direct_mode_index(), Some(0));
        assert!(device.mode_by_name("direct").is_some());
        assert!(device.mode_by_name("Rainbow").is_none());
    }
}
