use std::time::Duration;

/// Errors surfaced by a [`Connection`](crate::Connection) or [`OrgbClient`](crate::OrgbClient).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Could not reach the server.
    #[error("transport error: {0}")]
    Transport(#[from] orgb_transport::TransportError),

    /// Bad magic, truncated frame, or a payload that could not be serialized.
    #[error("protocol error: {0}")]
    Frame(#[from] orgb_frame::FrameError),

    /// A reply could not be decoded, or a record rejected a value.
    #[error(transparent)]
    Model(#[from] orgb_model::ModelError),

    /// An index or id was out of range.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// The operation needs a newer protocol than the one negotiated.
    #[error("{operation} requires protocol v{required}, connection negotiated v{negotiated}")]
    NotSupported {
        operation: &'static str,
        required: u32,
        negotiated: u32,
    },

    /// The connection was disposed while the call was waiting.
    #[error("operation cancelled: connection disposed")]
    OperationCancelled,

    /// The read loop hit a fatal error; every pending and later call sees it.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// The connection was used after `dispose`.
    #[error("connection has been disposed")]
    Disposed,

    /// A bounded wait elapsed.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, ClientError>;
