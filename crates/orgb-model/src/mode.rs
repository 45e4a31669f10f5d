//! Lighting modes.
//!
//! A mode carries a flags word saying which of its optional parameters mean
//! anything. The server always transmits every numeric field (brightness ones
//! only from protocol v3); the flags decide which decoded values are exposed.
//! Values behind an absent flag decode to `None` and are written back as zero.

use std::fmt;
use std::ops::BitOr;

use orgb_frame::{string_wire_len, WireReader, WireWriter};

use crate::color::{list_len, Color};
use crate::error::{ModelError, Result};
use crate::version::ProtocolVersion;

/// Flags word of a [`Mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ModeFlags(u32);

impl ModeFlags {
    pub const NONE: Self = Self(0);
    pub const HAS_SPEED: Self = Self(1 << 0);
    pub const HAS_DIRECTION_LR: Self = Self(1 << 1);
    pub const HAS_DIRECTION_UD: Self = Self(1 << 2);
    pub const HAS_DIRECTION_HV: Self = Self(1 << 3);
    pub const HAS_BRIGHTNESS: Self = Self(1 << 4);
    pub const HAS_PER_LED_COLOR: Self = Self(1 << 5);
    pub const HAS_MODE_SPECIFIC_COLOR: Self = Self(1 << 6);
    pub const HAS_RANDOM_COLOR: Self = Self(1 << 7);
    pub const MANUAL_SAVE: Self = Self(1 << 8);
    pub const AUTOMATIC_SAVE: Self = Self(1 << 9);

    const DIRECTIONS: Self =
        Self(Self::HAS_DIRECTION_LR.0 | Self::HAS_DIRECTION_UD.0 | Self::HAS_DIRECTION_HV.0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any direction flag is set.
    pub const fn has_direction(self) -> bool {
        self.0 & Self::DIRECTIONS.0 != 0
    }
}

impl BitOr for ModeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Effect direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Direction {
    Left = 0,
    Right = 1,
    Up = 2,
    Down = 3,
    Horizontal = 4,
    Vertical = 5,
}

impl Direction {
    pub fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::Left,
            1 => Self::Right,
            2 => Self::Up,
            3 => Self::Down,
            4 => Self::Horizontal,
            5 => Self::Vertical,
            _ => return None,
        })
    }

    /// The flag a mode must carry for this direction to be selectable.
    pub fn required_flag(self) -> ModeFlags {
        match self {
            Self::Left | Self::Right => ModeFlags::HAS_DIRECTION_LR,
            Self::Up | Self::Down => ModeFlags::HAS_DIRECTION_UD,
            Self::Horizontal | Self::Vertical => ModeFlags::HAS_DIRECTION_HV,
        }
    }
}

/// Where a mode takes its colors from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ColorMode {
    #[default]
    None = 0,
    PerLed = 1,
    ModeSpecific = 2,
    Random = 3,
}

impl ColorMode {
    pub fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::None,
            1 => Self::PerLed,
            2 => Self::ModeSpecific,
            3 => Self::Random,
            _ => return None,
        })
    }

    fn required_flag(self) -> ModeFlags {
        match self {
            Self::None => ModeFlags::NONE,
            Self::PerLed => ModeFlags::HAS_PER_LED_COLOR,
            Self::ModeSpecific => ModeFlags::HAS_MODE_SPECIFIC_COLOR,
            Self::Random => ModeFlags::HAS_RANDOM_COLOR,
        }
    }
}

/// A lighting effect configuration of a device.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Mode {
    index: usize,
    name: String,
    value: i32,
    flags: ModeFlags,
    speed_min: Option<u32>,
    speed_max: Option<u32>,
    brightness_min: Option<u32>,
    brightness_max: Option<u32>,
    colors_min: Option<u32>,
    colors_max: Option<u32>,
    speed: Option<u32>,
    brightness: Option<u32>,
    direction: Option<Direction>,
    color_mode: ColorMode,
    colors: Vec<Color>,
}

impl Mode {
    /// Decode mode number `index` of a device payload.
    pub fn decode(reader: &mut WireReader<'_>, version: ProtocolVersion, index: usize) -> Result<Self> {
        let name = reader.get_string()?;
        let value = reader.get_i32()?;
        let flags = ModeFlags::from_bits(reader.get_u32()?);
        let speed_min = reader.get_u32()?;
        let speed_max = reader.get_u32()?;
        let brightness_range = if version.supports_brightness_and_save_mode() {
            Some((reader.get_u32()?, reader.get_u32()?))
        } else {
            None
        };
        let colors_min = reader.get_u32()?;
        let colors_max = reader.get_u32()?;
        let speed = reader.get_u32()?;
        let brightness = if version.supports_brightness_and_save_mode() {
            Some(reader.get_u32()?)
        } else {
            None
        };
        let direction = reader.get_u32()?;
        let color_mode = reader.get_u32()?;
        let color_count = reader.get_u16()? as usize;
        let colors = Color::decode_many(reader, color_count)?;

        let color_mode = ColorMode::from_u32(color_mode).ok_or(ModelError::InvalidEnum {
            field: "color mode",
            value: color_mode,
        })?;

        let has_speed = flags.contains(ModeFlags::HAS_SPEED);
        let has_brightness = flags.contains(ModeFlags::HAS_BRIGHTNESS);
        let has_colors = flags.contains(ModeFlags::HAS_MODE_SPECIFIC_COLOR);

        let direction = if flags.has_direction() {
            Some(Direction::from_u32(direction).ok_or(ModelError::InvalidEnum {
                field: "direction",
                value: direction,
            })?)
        } else {
            None
        };

        Ok(Self {
            index,
            name,
            value,
            flags,
            speed_min: has_speed.then_some(speed_min),
            speed_max: has_speed.then_some(speed_max),
            brightness_min: brightness_range.filter(|_| has_brightness).map(|(min, _)| min),
            brightness_max: brightness_range.filter(|_| has_brightness).map(|(_, max)| max),
            colors_min: has_colors.then_some(colors_min),
            colors_max: has_colors.then_some(colors_max),
            speed: has_speed.then_some(speed),
            brightness: brightness.filter(|_| has_brightness),
            direction,
            color_mode,
            colors: if has_colors { colors } else { Vec::new() },
        })
    }

    /// Number of bytes [`Mode::write`] emits at `version`.
    pub fn wire_len(&self, version: ProtocolVersion) -> usize {
        let brightness_fields = if version.supports_brightness_and_save_mode() {
            3 * 4
        } else {
            0
        };
        string_wire_len(&self.name)
            + 4 // value
            + 4 // flags
            + 2 * 4 // speed min/max
            + 2 * 4 // colors min/max
            + 4 // speed
            + 4 // direction
            + 4 // color mode
            + brightness_fields
            + Color::list_wire_len(self.colors.len())
    }

    /// Serialize in the same field order the server sends.
    pub fn write(&self, writer: &mut WireWriter<'_>, version: ProtocolVersion) -> Result<()> {
        let colors_len = list_len(self.colors.len(), "mode colors")?;

        writer.put_string(&self.name)?;
        writer.put_i32(self.value)?;
        writer.put_u32(self.flags.bits())?;
        writer.put_u32(self.speed_min.unwrap_or(0))?;
        writer.put_u32(self.speed_max.unwrap_or(0))?;
        if version.supports_brightness_and_save_mode() {
            writer.put_u32(self.brightness_min.unwrap_or(0))?;
            writer.put_u32(self.brightness_max.unwrap_or(0))?;
        }
        writer.put_u32(self.colors_min.unwrap_or(0))?;
        writer.put_u32(self.colors_max.unwrap_or(0))?;
        writer.put_u32(self.speed.unwrap_or(0))?;
        if version.supports_brightness_and_save_mode() {
            writer.put_u32(self.brightness.unwrap_or(0))?;
        }
        writer.put_u32(self.direction.map_or(0, |d| d as u32))?;
        writer.put_u32(self.color_mode as u32)?;
        writer.put_u16(colors_len)?;
        for color in &self.colors {
            color.write(writer)?;
        }
        Ok(())
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Device-specific mode value.
    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn flags(&self) -> ModeFlags {
        self.flags
    }

    pub fn speed_min(&self) -> Option<u32> {
        self.speed_min
    }

    pub fn speed_max(&self) -> Option<u32> {
        self.speed_max
    }

    pub fn brightness_min(&self) -> Option<u32> {
        self.brightness_min
    }

    pub fn brightness_max(&self) -> Option<u32> {
        self.brightness_max
    }

    pub fn colors_min(&self) -> Option<u32> {
        self.colors_min
    }

    pub fn colors_max(&self) -> Option<u32> {
        self.colors_max
    }

    pub fn speed(&self) -> Option<u32> {
        self.speed
    }

    pub fn brightness(&self) -> Option<u32> {
        self.brightness
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn set_speed(&mut self, speed: u32) -> Result<()> {
        let (Some(min), Some(max)) = (self.speed_min, self.speed_max) else {
            return Err(self.unsupported("speed"));
        };
        // Some devices report an inverted range (min > max).
        check_range("speed", speed, min, max)?;
        self.speed = Some(speed);
        Ok(())
    }

    pub fn set_brightness(&mut self, brightness: u32) -> Result<()> {
        let (Some(min), Some(max)) = (self.brightness_min, self.brightness_max) else {
            return Err(self.unsupported("brightness"));
        };
        check_range("brightness", brightness, min, max)?;
        self.brightness = Some(brightness);
        Ok(())
    }

    pub fn set_direction(&mut self, direction: Direction) -> Result<()> {
        if !self.flags.contains(direction.required_flag()) {
            return Err(self.unsupported(&format!("direction {direction:?}")));
        }
        self.direction = Some(direction);
        Ok(())
    }

    pub fn set_color_mode(&mut self, color_mode: ColorMode) -> Result<()> {
        if !self.flags.contains(color_mode.required_flag()) {
            return Err(self.unsupported(&format!("color mode {color_mode:?}")));
        }
        self.color_mode = color_mode;
        Ok(())
    }

    /// Replace the mode-specific colors; the count must lie within the mode's bounds.
    pub fn set_colors(&mut self, colors: Vec<Color>) -> Result<()> {
        let (Some(min), Some(max)) = (self.colors_min, self.colors_max) else {
            return Err(self.unsupported("mode-specific colors"));
        };
        let count = u32::try_from(colors.len()).unwrap_or(u32::MAX);
        check_range("color count", count, min, max)?;
        self.colors = colors;
        Ok(())
    }

    fn unsupported(&self, what: &str) -> ModelError {
        ModelError::Argument(format!("mode '{}' does not support {what}", self.name))
    }
}

fn check_range(what: &str, value: u32, a: u32, b: u32) -> Result<()> {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(ModelError::Argument(format!(
            "{what} {value} out of range {lo}..={hi}"
        )))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.index)
    }
}
