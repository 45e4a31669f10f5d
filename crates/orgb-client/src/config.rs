use std::time::Duration;

use orgb_frame::DEFAULT_MAX_PAYLOAD;
use orgb_model::ProtocolVersion;
use orgb_transport::DEFAULT_CONNECT_TIMEOUT;

/// Name announced to the server with `SetClientName`.
pub const DEFAULT_CLIENT_NAME: &str = "orgb";

/// How long to wait for the server to answer `RequestProtocolVersion`.
///
/// Servers that predate the version command never answer, so this is kept
/// short and expiry falls back to v0.
pub const DEFAULT_NEGOTIATION_TIMEOUT: Duration = Duration::from_secs(1);

/// Connection settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub client_name: String,
    pub connect_timeout: Duration,
    pub negotiation_timeout: Duration,
    /// Highest protocol version offered during negotiation.
    pub max_protocol_version: ProtocolVersion,
    /// Frames announcing a larger payload are treated as a protocol error.
    pub max_payload_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            negotiation_timeout: DEFAULT_NEGOTIATION_TIMEOUT,
            max_protocol_version: ProtocolVersion::MAX,
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

impl ClientConfig {
    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_negotiation_timeout(mut self, timeout: Duration) -> Self {
        self.negotiation_timeout = timeout;
        self
    }

    pub fn with_max_protocol_version(mut self, version: ProtocolVersion) -> Self {
        self.max_protocol_version = version;
        self
    }

    pub fn with_max_payload_size(mut self, size: usize) -> Self {
        self.max_payload_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.client_name, "orgb");
        assert_eq!(config.negotiation_timeout, Duration::from_secs(1));
        assert_eq!(config.max_protocol_version, ProtocolVersion::V4);
        assert_eq!(config.max_payload_size, DEFAULT_MAX_PAYLOAD);
    }

    #[test]
    fn builder_overrides() {
        let config = ClientConfig::default()
            .with_client_name("lights")
            .with_max_protocol_version(ProtocolVersion::V2)
            .with_negotiation_timeout(Duration::from_millis(50));
        assert_eq!(config.client_name, "lights");
        assert_eq!(config.max_protocol_version, ProtocolVersion::V2);
        assert_eq!(config.negotiation_timeout, Duration::from_millis(50));
    }
}
