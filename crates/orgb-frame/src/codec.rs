use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

use crate::error::{FrameError, Result};

/// Frame header: magic (4) + target id (4) + command (4) + length (4) = 16 bytes.
pub const HEADER_SIZE: usize = 16;

/// Magic bytes: "ORGB".
pub const MAGIC: [u8; 4] = *b"ORGB";

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Decoded frame header.
///
/// Wire format (all little-endian):
/// ```text
/// ┌──────────────┬─────────────┬─────────────┬──────────────┐
/// │ Magic (4B)   │ Target id   │ Command     │ Payload len  │
/// │ "ORGB"       │ (u32 LE)    │ (u32 LE)    │ (u32 LE)     │
/// └──────────────┴─────────────┴─────────────┴──────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Device (controller) index the frame addresses; 0 for global commands.
    pub target_id: u32,
    /// Raw command id.
    pub command: u32,
    /// Number of payload bytes following the header.
    pub payload_len: u32,
}

impl Header {
    pub fn new(target_id: u32, command: impl Into<u32>, payload_len: u32) -> Self {
        Self {
            target_id,
            command: command.into(),
            payload_len,
        }
    }

    /// Encode into the 16-byte wire form.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..8].copy_from_slice(&self.target_id.to_le_bytes());
        out[8..12].copy_from_slice(&self.command.to_le_bytes());
        out[12..16].copy_from_slice(&self.payload_len.to_le_bytes());
        out
    }

    /// Decode the first 16 bytes of `src`.
    pub fn decode(src: &[u8]) -> Result<Self> {
        if src.len() < HEADER_SIZE {
            return Err(FrameError::OutOfBounds {
                offset: 0,
                needed: HEADER_SIZE,
                remaining: src.len(),
            });
        }

        let mut found = [0u8; 4];
        found.copy_from_slice(&src[0..4]);
        if found != MAGIC {
            return Err(FrameError::InvalidMagic { found });
        }

        let mut rest = &src[4..HEADER_SIZE];
        Ok(Self {
            target_id: rest.get_u32_le(),
            command: rest.get_u32_le(),
            payload_len: rest.get_u32_le(),
        })
    }
}

/// One header + payload unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub target_id: u32,
    pub command: u32,
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(target_id: u32, command: impl Into<u32>, payload: impl Into<Bytes>) -> Self {
        Self {
            target_id,
            command: command.into(),
            payload: payload.into(),
        }
    }

    /// The header describing this frame.
    pub fn header(&self) -> Header {
        Header {
            target_id: self.target_id,
            command: self.command,
            payload_len: self.payload.len() as u32,
        }
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Encode a frame into the wire format, reserving exactly header + payload.
pub fn encode_frame(target_id: u32, command: u32, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > u32::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&Header::new(target_id, command, payload.len() as u32).encode());
    dst.put_slice(payload);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    let header = Header::decode(&src[..HEADER_SIZE])?;
    let payload_len = header.payload_len as usize;

    if payload_len > max_payload {
        debug!(
            command = header.command,
            target_id = header.target_id,
            size = payload_len,
            max = max_payload,
            "rejecting oversized frame"
        );
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        src.reserve(total - src.len());
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();
    trace!(
        command = header.command,
        target_id = header.target_id,
        len = payload_len,
        "frame decoded"
    );

    Ok(Some(Frame {
        target_id: header.target_id,
        command: header.command,
        payload,
    }))
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// `tokio_util` codec over the ORGB framing.
///
/// A frame is only yielded once its declared payload length has fully arrived,
/// so the read side never starts parsing a header in the middle of a payload.
#[derive(Debug, Clone, Default)]
pub struct OrgbCodec {
    config: FrameConfig,
}

impl OrgbCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FrameConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Decoder for OrgbCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        decode_frame(src, self.config.max_payload_size)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => Err(FrameError::ConnectionClosed),
        }
    }
}

impl Encoder<Frame> for OrgbCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<()> {
        if frame.payload.len() > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: frame.payload.len(),
                max: self.config.max_payload_size,
            });
        }
        encode_frame(frame.target_id, frame.command, &frame.payload, dst)
    }
}
