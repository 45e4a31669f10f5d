/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame header does not start with the `ORGB` magic.
    #[error("invalid frame magic {found:02X?} (expected \"ORGB\")")]
    InvalidMagic { found: [u8; 4] },

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A cursor tried to read or write past the end of its buffer.
    #[error("buffer overrun at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// A string handed to the writer contains non-ASCII characters.
    #[error("string is not ASCII: {0:?}")]
    NonAscii(String),

    /// A string is too long for its u16 length prefix.
    #[error("string too long ({0} bytes, max 65534)")]
    StringTooLong(usize),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
