use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{lookup_host, TcpStream};
use tracing::debug;

use crate::error::{Result, TransportError};

/// Default OpenRGB SDK server port.
pub const DEFAULT_PORT: u16 = 6742;

/// Default time allowed for establishing the TCP connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// A connected TCP stream to an SDK server.
///
/// Owns the socket until [`TcpTransport::into_split`] hands the two halves to
/// the connection engine (reader task and serialized writer).
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    peer: SocketAddr,
}

impl TcpTransport {
    /// Resolve `endpoint` (`host:port`) and connect, giving up after `timeout`.
    ///
    /// The deadline covers name resolution and every address tried.
    pub async fn connect(endpoint: &str, timeout: Duration) -> Result<Self> {
        let attempt = async {
            let addrs = lookup_host(endpoint)
                .await
                .map_err(|source| TransportError::Resolve {
                    endpoint: endpoint.to_string(),
                    source,
                })?;

            let mut last_err = None;
            for addr in addrs {
                match TcpStream::connect(addr).await {
                    Ok(stream) => return Ok((stream, addr)),
                    Err(source) => {
                        debug!(%addr, %source, "connect attempt failed");
                        last_err = Some(TransportError::Connect { addr, source });
                    }
                }
            }

            Err(last_err.unwrap_or_else(|| TransportError::Resolve {
                endpoint: endpoint.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "endpoint resolved to no addresses",
                ),
            }))
        };

        let (stream, peer) = tokio::time::timeout(timeout, attempt)
            .await
            .map_err(|_| TransportError::Timeout {
                endpoint: endpoint.to_string(),
                timeout,
            })??;

        stream.set_nodelay(true)?;
        debug!(%peer, "connected to sdk server");
        Ok(Self { stream, peer })
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        let peer = stream.peer_addr()?;
        stream.set_nodelay(true)?;
        Ok(Self { stream, peer })
    }

    /// Write the whole buffer.
    pub async fn send_all(&mut self, buf: &[u8]) -> Result<()> {
        write_all_to(&mut self.stream, buf).await
    }

    /// Read exactly `len` bytes.
    pub async fn recv_exact(&mut self, len: usize) -> Result<Bytes> {
        read_exact_from(&mut self.stream, len).await
    }

    /// Address of the remote side.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Split into independently owned read and write halves.
    pub fn into_split(self) -> (OwnedReadHalf, OwnedWriteHalf) {
        self.stream.into_split()
    }
}

/// Write all of `buf` to `writer` and flush.
pub async fn write_all_to<W: AsyncWrite + Unpin>(writer: &mut W, buf: &[u8]) -> Result<()> {
    writer.write_all(buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Read exactly `len` bytes from `reader`.
///
/// EOF before `len` bytes arrive is reported as [`TransportError::Closed`]
/// with the number of bytes that did arrive.
pub async fn read_exact_from<R: AsyncRead + Unpin>(reader: &mut R, len: usize) -> Result<Bytes> {
    let mut buf = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        let read = reader.read(&mut buf[filled..]).await?;
        if read == 0 {
            return Err(TransportError::Closed {
                expected: len,
                received: filled,
            });
        }
        filled += read;
    }
    Ok(Bytes::from(buf))
}
