//! TCP transport for the OpenRGB SDK protocol.
//!
//! This is the lowest layer of orgb. It knows how to open a connection with a
//! deadline, push a whole buffer onto the wire and pull an exact number of bytes
//! off it. It has no knowledge of headers, commands or payload layouts; that
//! lives in `orgb-frame`.

pub mod error;
pub mod tcp;

pub use error::{Result, TransportError};
pub use tcp::{read_exact_from, write_all_to, TcpTransport, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT};
