use orgb_frame::{Command, WireReader};
use orgb_model::{NulString, ProtocolVersion, ProtocolVersionRequest};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::error::Result;

/// Announce the client name, then agree on a protocol version.
///
/// The server reports the highest version it speaks and the connection uses
/// the lower of that and the client's maximum. Servers too old to know the
/// version command stay silent; after `negotiation_timeout` the connection
/// settles on v0.
pub(crate) async fn negotiate(conn: &Connection, config: &ClientConfig) -> Result<ProtocolVersion> {
    conn.send(Command::SetClientName, 0, &NulString(&config.client_name))
        .await?;

    let client_max = config.max_protocol_version;
    let version_request = ProtocolVersionRequest(client_max.number());
    let request = conn.request_raw(Command::RequestProtocolVersion, 0, &version_request);

    match tokio::time::timeout(config.negotiation_timeout, request).await {
        Ok(reply) => {
            let reply = reply?;
            let server = WireReader::new(&reply).get_u32()?;
            let negotiated = ProtocolVersion::negotiate(client_max, server);
            debug!(
                server,
                client = client_max.number(),
                %negotiated,
                "protocol version negotiated"
            );
            Ok(negotiated)
        }
        Err(_) => {
            info!(
                timeout = ?config.negotiation_timeout,
                "server did not report a protocol version, assuming v0"
            );
            Ok(ProtocolVersion::V0)
        }
    }
}
