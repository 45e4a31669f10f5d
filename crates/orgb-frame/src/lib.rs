//! ORGB framing and wire primitives.
//!
//! Every message on an SDK connection is framed with a fixed 16-byte header:
//! - 4 bytes of magic (`"ORGB"`) for stream synchronization
//! - a little-endian u32 target (controller) id
//! - a little-endian u32 command id
//! - a little-endian u32 payload length
//!
//! Payload bodies are built and parsed with [`WireWriter`] and [`WireReader`],
//! bounds-checked cursors over contiguous buffers.

pub mod codec;
pub mod command;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, Frame, FrameConfig, Header, OrgbCodec, DEFAULT_MAX_PAYLOAD,
    HEADER_SIZE, MAGIC,
};
pub use command::{command_name, is_notification, Command};
pub use error::{FrameError, Result};
pub use reader::WireReader;
pub use writer::{cstr_wire_len, string_wire_len, WireWriter, MAX_STRING_LEN};
