use orgb_frame::FrameError;

/// Errors raised while decoding records or validating arguments.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The payload ran out, or a string could not be written.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// A protocol version number outside 0..=4.
    #[error("unsupported protocol version {0} (supported 0..={max})", max = crate::version::MAX_PROTOCOL_VERSION)]
    InvalidVersion(u32),

    /// An enumerated field carried a value this client does not know.
    #[error("invalid {field} value {value}")]
    InvalidEnum { field: &'static str, value: u32 },

    /// A zone's matrix map length disagrees with its declared dimensions.
    #[error("matrix map length {declared} does not match {height}x{width} grid")]
    MatrixLength {
        declared: u16,
        height: u32,
        width: u32,
    },

    /// A caller-supplied value is out of range or not allowed by the record.
    #[error("invalid argument: {0}")]
    Argument(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
