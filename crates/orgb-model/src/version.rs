//! Protocol version descriptor.
//!
//! | Version | Adds                                   |
//! |---------|----------------------------------------|
//! | 0       | base protocol                          |
//! | 1       | device vendor string                   |
//! | 2       | profile list / save / load / delete    |
//! | 3       | mode brightness fields, save-mode      |
//! | 4       | zone segments, plugin commands         |

use std::fmt;

use crate::error::{ModelError, Result};

/// Highest protocol version this client speaks.
pub const MAX_PROTOCOL_VERSION: u32 = 4;

/// Capability set of a negotiated protocol version.
///
/// Every capability is a pure function of `number`, and each version is a
/// superset of the one below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProtocolVersion {
    number: u32,
    supports_vendor_string: bool,
    supports_profile_controls: bool,
    supports_brightness_and_save_mode: bool,
    supports_segments_and_plugins: bool,
}

impl ProtocolVersion {
    pub const V0: Self = Self::table(0, false, false, false, false);
    pub const V1: Self = Self::table(1, true, false, false, false);
    pub const V2: Self = Self::table(2, true, true, false, false);
    pub const V3: Self = Self::table(3, true, true, true, false);
    pub const V4: Self = Self::table(4, true, true, true, true);

    /// The highest version this client supports.
    pub const MAX: Self = Self::V4;

    const fn table(number: u32, vendor: bool, profiles: bool, brightness: bool, segments: bool) -> Self {
        Self {
            number,
            supports_vendor_string: vendor,
            supports_profile_controls: profiles,
            supports_brightness_and_save_mode: brightness,
            supports_segments_and_plugins: segments,
        }
    }

    /// Look up the capability set for `number`.
    pub fn from_number(number: u32) -> Result<Self> {
        match number {
            0 => Ok(Self::V0),
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            4 => Ok(Self::V4),
            other => Err(ModelError::InvalidVersion(other)),
        }
    }

    /// Effective version for a client declaring `client_max` against a server
    /// reporting `server`: the lower of the two.
    pub fn negotiate(client_max: Self, server: u32) -> Self {
        if server >= client_max.number {
            return client_max;
        }
        // server < client_max <= MAX_PROTOCOL_VERSION, so the lookup cannot fail.
        Self::from_number(server).unwrap_or(Self::V0)
    }

    pub const fn number(&self) -> u32 {
        self.number
    }

    pub const fn supports_vendor_string(&self) -> bool {
        self.supports_vendor_string
    }

    pub const fn supports_profile_controls(&self) -> bool {
        self.supports_profile_controls
    }

    pub const fn supports_brightness_and_save_mode(&self) -> bool {
        self.supports_brightness_and_save_mode
    }

    pub const fn supports_segments_and_plugins(&self) -> bool {
        self.supports_segments_and_plugins
    }

    #[cfg(test)]
    fn capabilities(&self) -> [bool; 4] {
        [
            self.supports_vendor_string,
            self.supports_profile_controls,
            self.supports_brightness_and_save_mode,
            self.supports_segments_and_plugins,
        ]
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::V0
    }
}

impl TryFrom<u32> for ProtocolVersion {
    type Error = ModelError;

    fn try_from(number: u32) -> Result<Self> {
        Self::from_number(number)
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_exhaustive() {
        for number in 0..=MAX_PROTOCOL_VERSION {
            assert_eq!(ProtocolVersion::from_number(number).unwrap().number(), number);
        }
        assert!(matches!(
            ProtocolVersion::from_number(5),
            Err(ModelError::InvalidVersion(5))
        ));
        assert!(ProtocolVersion::try_from(u32::MAX).is_err());
    }

    #[test]
    fn capabilities_are_monotonic() {
        for a in 0..=MAX_PROTOCOL_VERSION {
            for b in a + 1..=MAX_PROTOCOL_VERSION {
                let lower = ProtocolVersion::from_number(a).unwrap().capabilities();
                let higher = ProtocolVersion::from_number(b).unwrap().capabilities();
                for (lo, hi) in lower.iter().zip(higher.iter()) {
                    assert!(!lo | hi, "v{a} capability lost at v{b}");
                }
            }
        }
    }

    #[test]
    fn each_version_adds_its_capability() {
        assert_eq!(ProtocolVersion::V0.capabilities(), [false; 4]);
        assert!(ProtocolVersion::V1.supports_vendor_string());
        assert!(!ProtocolVersion::V1.supports_profile_controls());
        assert!(ProtocolVersion::V2.supports_profile_controls());
        assert!(!ProtocolVersion::V2.supports_brightness_and_save_mode());
        assert!(ProtocolVersion::V3.supports_brightness_and_save_mode());
        assert!(!ProtocolVersion::V3.supports_segments_and_plugins());
        assert_eq!(ProtocolVersion::V4.capabilities(), [true; 4]);
    }

    #[test]
    fn negotiation_takes_minimum() {
        for client in 0..=MAX_PROTOCOL_VERSION {
            let client_max = ProtocolVersion::from_number(client).unwrap();
            for server in 0..=6 {
                let effective = ProtocolVersion::negotiate(client_max, server);
                assert_eq!(effective.number(), client.min(server));
            }
        }
    }

    #[test]
    fn ordering_follows_number() {
        assert!(ProtocolVersion::V1 < ProtocolVersion::V3);
        assert_eq!(ProtocolVersion::default(), ProtocolVersion::V0);
        assert_eq!(ProtocolVersion::V4.to_string(), "v4");
    }
}
