//! OpenRGB SDK client.
//!
//! # Crate Structure
//!
//! - [`transport`] - TCP connect with timeout and exact-length reads
//! - [`frame`] - 16-byte `ORGB` header codec, command ids, wire cursors
//! - [`model`] - Protocol versions and version-aware device records
//! - [`client`] - Async connection engine and the named SDK operations

/// Re-export transport types.
pub mod transport {
    pub use orgb_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use orgb_frame::*;
}

/// Re-export record and protocol version types.
pub mod model {
    pub use orgb_model::*;
}

/// Re-export connection and client types.
pub mod client {
    pub use orgb_client::*;
}

pub use orgb_client::{ClientConfig, ClientError, Connection, OrgbClient};
pub use orgb_model::{Color, Device, Mode, ProtocolVersion};
