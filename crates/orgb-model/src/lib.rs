//! OpenRGB SDK records, decoded per negotiated protocol version.
//!
//! Each record decoder consumes exactly the bytes its layout defines from a
//! [`orgb_frame::WireReader`]. Optional fields are read or skipped according
//! to the [`ProtocolVersion`] (and for modes, the mode's own flags word), so a
//! wrong version desynchronizes everything after the first gated field.
//!
//! Outgoing payloads implement [`Writable`].

pub mod args;
pub mod color;
pub mod device;
pub mod error;
pub mod led;
pub mod mode;
pub mod plugin;
pub mod profile;
pub mod version;
pub mod zone;

pub use args::{
    to_vec, ControllerDataRequest, Empty, NulString, PluginSpecificArgs, ProtocolVersionRequest,
    RawBytes, ResizeZoneArgs, UpdateLedsArgs, UpdateModeArgs, UpdateSingleLedArgs,
    UpdateZoneLedsArgs, Writable,
};
pub use color::Color;
pub use device::{Device, DeviceType};
pub use error::{ModelError, Result};
pub use led::Led;
pub use mode::{ColorMode, Direction, Mode, ModeFlags};
pub use plugin::Plugin;
pub use profile::decode_profile_list;
pub use version::{ProtocolVersion, MAX_PROTOCOL_VERSION};
pub use zone::{MatrixMap, Segment, Zone, ZoneType};
