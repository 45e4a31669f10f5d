//! Command-keyed request correlation over one SDK stream.
//!
//! The protocol carries no request ids: a reply is recognised only by its
//! command id. Each command therefore gets one reply slot, and a request
//! holds that slot from the moment it is sent until its reply is taken, so at
//! most one request per command id is ever in flight. Different commands
//! proceed concurrently over the same socket.
//!
//! A single background task owns the read half. It hands each reply to its
//! command's slot, fans `DeviceListUpdated` out to subscribers, and on any
//! framing or I/O failure records the cause and cancels the connection so
//! every waiting caller fails instead of hanging.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use bytes::Bytes;
use futures_util::StreamExt;
use orgb_frame::{
    command_name, is_notification, Frame, FrameConfig, Header, OrgbCodec, WireWriter, HEADER_SIZE,
};
use orgb_model::{ProtocolVersion, Writable};
use orgb_transport::{write_all_to, TcpTransport, TransportError};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::negotiate::negotiate;

/// Buffered notifications per subscriber before older ones are coalesced.
const EVENT_CAPACITY: usize = 16;

/// Replies a slot holds while nobody is waiting for them.
const SLOT_CAPACITY: usize = 1;

/// Lifecycle of a [`Connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Negotiating = 2,
    Ready = 3,
    Closed = 4,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Disconnected,
            1 => Self::Connecting,
            2 => Self::Negotiating,
            3 => Self::Ready,
            _ => Self::Closed,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Negotiating => "negotiating",
            Self::Ready => "ready",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// The server's device list changed; previously fetched devices may be stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceListUpdated;

/// Reply slot of one command id.
///
/// The receiver mutex doubles as the per-command request lock. The channel
/// holds at most [`SLOT_CAPACITY`] unclaimed replies; the read loop drops
/// anything beyond that instead of waiting.
struct Slot {
    tx: mpsc::Sender<Bytes>,
    rx: Mutex<mpsc::Receiver<Bytes>>,
}

impl Slot {
    fn new() -> Self {
        let (tx, rx) = mpsc::channel(SLOT_CAPACITY);
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }
}

/// State shared between callers and the read loop.
struct Shared {
    slots: StdMutex<HashMap<u32, Arc<Slot>>>,
    state: AtomicU8,
    failure: StdMutex<Option<String>>,
    disposed: AtomicBool,
    events: broadcast::Sender<DeviceListUpdated>,
    cancel: CancellationToken,
}

fn lock<T>(mutex: &StdMutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            slots: StdMutex::new(HashMap::new()),
            state: AtomicU8::new(ConnectionState::Disconnected as u8),
            failure: StdMutex::new(None),
            disposed: AtomicBool::new(false),
            events,
            cancel: CancellationToken::new(),
        }
    }

    fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: ConnectionState) {
        let previous = ConnectionState::from_u8(self.state.swap(state as u8, Ordering::AcqRel));
        if previous != state {
            debug!(from = %previous, to = %state, "connection state changed");
        }
    }

    /// Move `from -> to`, failing with the current state if it was not `from`.
    fn transition(&self, from: ConnectionState, to: ConnectionState) -> std::result::Result<(), ConnectionState> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map_err(ConnectionState::from_u8)?;
        debug!(from = %from, to = %to, "connection state changed");
        Ok(())
    }

    /// Slot for `command`, created on first use and reused afterwards.
    fn slot(&self, command: u32) -> Arc<Slot> {
        Arc::clone(
            lock(&self.slots)
                .entry(command)
                .or_insert_with(|| Arc::new(Slot::new())),
        )
    }

    fn dispatch(&self, frame: Frame) {
        trace!(
            command = command_name(frame.command),
            target_id = frame.target_id,
            len = frame.payload.len(),
            "frame received"
        );

        if is_notification(frame.command) {
            debug!("server reports device list change");
            // Err only means nobody is subscribed.
            let _ = self.events.send(DeviceListUpdated);
            return;
        }

        let slot = lock(&self.slots).get(&frame.command).cloned();
        match slot {
            Some(slot) => match slot.tx.try_send(frame.payload) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(payload)) => debug!(
                    command = frame.command,
                    name = command_name(frame.command),
                    len = payload.len(),
                    "dropping reply, slot already holds an unclaimed one"
                ),
                // The receiver lives in the same slot, so the channel stays open.
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            },
            None => debug!(
                command = frame.command,
                name = command_name(frame.command),
                len = frame.payload.len(),
                "dropping reply with no pending request"
            ),
        }
    }

    /// Record a fatal read-side error and wake every waiter.
    fn fail(&self, reason: String) {
        if self.cancel.is_cancelled() {
            // Teardown in progress; the error is a side effect of it.
            return;
        }
        warn!(%reason, "connection failed");
        lock(&self.failure).get_or_insert(reason);
        self.set_state(ConnectionState::Closed);
        self.cancel.cancel();
    }

    fn failure(&self) -> Option<String> {
        lock(&self.failure).clone()
    }

    /// Error for a call woken by cancellation.
    fn interrupted(&self) -> ClientError {
        match self.failure() {
            Some(reason) => ClientError::ConnectionLost(reason),
            None => ClientError::OperationCancelled,
        }
    }

    fn check_open(&self) -> Result<()> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(ClientError::Disposed);
        }
        match self.failure() {
            Some(reason) => Err(ClientError::ConnectionLost(reason)),
            None => Ok(()),
        }
    }
}

/// One SDK connection: a TCP stream, its read loop and its reply slots.
///
/// All methods take `&self`; wrap the connection in an `Arc` to share it
/// between tasks. Two concurrent requests with the *same* command id are
/// serialized; the protocol gives no way to tell their replies apart.
pub struct Connection {
    config: ClientConfig,
    shared: Arc<Shared>,
    writer: Mutex<Option<OwnedWriteHalf>>,
    read_task: StdMutex<Option<JoinHandle<()>>>,
    version: AtomicU32,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("client_name", &self.config.client_name)
            .field("state", &self.state())
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Create an unconnected connection.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            shared: Arc::new(Shared::new()),
            writer: Mutex::new(None),
            read_task: StdMutex::new(None),
            version: AtomicU32::new(0),
        }
    }

    /// Create a connection and [`connect`](Self::connect) it to `endpoint`.
    pub async fn open(endpoint: &str, config: ClientConfig) -> Result<Self> {
        let connection = Self::new(config);
        connection.connect(endpoint).await?;
        Ok(connection)
    }

    /// Connect to `endpoint` (`host:port`), start the read loop, announce the
    /// client name and negotiate the protocol version.
    ///
    /// A transport failure leaves the connection `Disconnected` so it can be
    /// retried; a failure after the stream is up disposes it.
    pub async fn connect(&self, endpoint: &str) -> Result<ProtocolVersion> {
        self.shared.check_open()?;
        self.shared
            .transition(ConnectionState::Disconnected, ConnectionState::Connecting)
            .map_err(|state| ClientError::Argument(format!("cannot connect while {state}")))?;

        info!(endpoint, "connecting to sdk server");
        let transport = match TcpTransport::connect(endpoint, self.config.connect_timeout).await {
            Ok(transport) => transport,
            Err(err) => {
                self.shared.set_state(ConnectionState::Disconnected);
                return Err(match err {
                    TransportError::Timeout { timeout, .. } => ClientError::Timeout(timeout),
                    other => other.into(),
                });
            }
        };
        self.attach(transport).await
    }

    async fn attach(&self, transport: TcpTransport) -> Result<ProtocolVersion> {
        let peer = transport.peer_addr();
        let (read_half, mut write_half) = transport.into_split();
        {
            // Dispose takes the writer under this same lock.
            let mut writer = self.writer.lock().await;
            if self.shared.cancel.is_cancelled() {
                if let Err(err) = write_half.shutdown().await {
                    debug!(%err, "socket shutdown failed");
                }
                self.shared.set_state(ConnectionState::Closed);
                return Err(self.shared.interrupted());
            }
            *writer = Some(write_half);

            let codec = OrgbCodec::with_config(FrameConfig {
                max_payload_size: self.config.max_payload_size,
            });
            let frames = FramedRead::new(read_half, codec);
            *lock(&self.read_task) =
                Some(tokio::spawn(read_loop(frames, Arc::clone(&self.shared))));
        }

        if self
            .shared
            .transition(ConnectionState::Connecting, ConnectionState::Negotiating)
            .is_err()
        {
            return Err(self.shared.interrupted());
        }

        let negotiated = match negotiate(self, &self.config).await {
            Ok(version) => version,
            Err(err) => {
                self.dispose().await;
                return Err(err);
            }
        };
        self.version.store(negotiated.number(), Ordering::Release);

        if self
            .shared
            .transition(ConnectionState::Negotiating, ConnectionState::Ready)
            .is_err()
        {
            return Err(self.shared.interrupted());
        }
        info!(%peer, version = %negotiated, "sdk connection ready");
        Ok(negotiated)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Negotiated protocol version (v0 until negotiation completes).
    pub fn version(&self) -> ProtocolVersion {
        ProtocolVersion::from_number(self.version.load(Ordering::Acquire)).unwrap_or_default()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether the background read task is still alive.
    pub fn is_read_loop_running(&self) -> bool {
        lock(&self.read_task)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Resolve once the connection is torn down, with the reason.
    pub async fn closed(&self) -> ClientError {
        self.shared.cancel.cancelled().await;
        self.shared.interrupted()
    }

    /// Serialize header and payload into one buffer and write it.
    ///
    /// The write half is locked for the whole write, so frames from
    /// concurrent callers never interleave.
    pub async fn send(&self, command: impl Into<u32>, target_id: u32, payload: &dyn Writable) -> Result<()> {
        let command = command.into();
        self.shared.check_open()?;
        let buf = encode_request(command, target_id, payload)?;

        let mut writer = self.writer.lock().await;
        let Some(stream) = writer.as_mut() else {
            return Err(ClientError::Argument("connection is not open".to_string()));
        };
        trace!(
            command = command_name(command),
            target_id,
            len = buf.len(),
            "sending frame"
        );
        tokio::select! {
            biased;
            () = self.shared.cancel.cancelled() => Err(self.shared.interrupted()),
            written = write_all_to(stream, &buf) => written.map_err(ClientError::from),
        }
    }

    /// Send a request and wait for the reply to the same command id.
    ///
    /// There is no timeout; only dispose or a connection failure ends the
    /// wait early. Wrap the call in `tokio::time::timeout` to bound it; a reply
    /// that arrives after the caller gave up is discarded by the next request
    /// for that command.
    pub async fn request_raw(
        &self,
        command: impl Into<u32>,
        target_id: u32,
        payload: &dyn Writable,
    ) -> Result<Bytes> {
        let command = command.into();
        self.shared.check_open()?;

        let slot = self.shared.slot(command);
        let mut replies = tokio::select! {
            biased;
            () = self.shared.cancel.cancelled() => return Err(self.shared.interrupted()),
            replies = slot.rx.lock() => replies,
        };
        while let Ok(stale) = replies.try_recv() {
            debug!(
                command = command_name(command),
                len = stale.len(),
                "discarding stale reply"
            );
        }

        self.send(command, target_id, payload).await?;

        tokio::select! {
            biased;
            () = self.shared.cancel.cancelled() => Err(self.shared.interrupted()),
            reply = replies.recv() => reply.ok_or_else(|| self.shared.interrupted()),
        }
    }

    /// [`request_raw`](Self::request_raw), then decode the reply with the
    /// negotiated version and the target id.
    pub async fn request<T, F>(
        &self,
        command: impl Into<u32>,
        target_id: u32,
        payload: &dyn Writable,
        decode: F,
    ) -> Result<T>
    where
        F: FnOnce(&[u8], ProtocolVersion, u32) -> orgb_model::Result<T>,
    {
        let reply = self.request_raw(command, target_id, payload).await?;
        Ok(decode(&reply, self.version(), target_id)?)
    }

    /// Receive every `DeviceListUpdated` notification from now on.
    pub fn subscribe_device_list_updates(&self) -> broadcast::Receiver<DeviceListUpdated> {
        self.shared.events.subscribe()
    }

    /// Run `callback` on its own task for each device list notification.
    ///
    /// A slow callback never delays frame reception; notifications it falls
    /// behind on are coalesced into one call. The task ends with the connection.
    pub fn on_device_list_updated<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: Fn() + Send + 'static,
    {
        let mut events = self.shared.events.subscribe();
        let cancel = self.shared.cancel.clone();
        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    event = events.recv() => event,
                };
                match event {
                    Ok(DeviceListUpdated) => callback(),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        debug!(missed, "coalescing device list notifications");
                        callback();
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Cancel pending calls, stop the read loop and close the socket.
    ///
    /// Idempotent; later calls on the connection fail with
    /// [`ClientError::Disposed`].
    pub async fn dispose(&self) {
        if self.shared.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!("disposing connection");
        self.shared.set_state(ConnectionState::Closed);
        self.shared.cancel.cancel();

        let task = lock(&self.read_task).take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                warn!(%err, "read loop task ended abnormally");
            }
        }

        if let Some(mut writer) = self.writer.lock().await.take() {
            if let Err(err) = writer.shutdown().await {
                debug!(%err, "socket shutdown failed");
            }
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
    }
}

fn encode_request(command: u32, target_id: u32, payload: &dyn Writable) -> Result<Vec<u8>> {
    let len = payload.wire_len();
    let payload_len = u32::try_from(len)
        .map_err(|_| ClientError::Argument(format!("payload of {len} bytes does not fit a frame")))?;

    let mut buf = vec![0u8; HEADER_SIZE + len];
    buf[..HEADER_SIZE].copy_from_slice(&Header::new(target_id, command, payload_len).encode());
    payload.write(&mut WireWriter::new(&mut buf[HEADER_SIZE..]))?;
    Ok(buf)
}

async fn read_loop(mut frames: FramedRead<OwnedReadHalf, OrgbCodec>, shared: Arc<Shared>) {
    debug!("read loop started");
    loop {
        let next = tokio::select! {
            biased;
            () = shared.cancel.cancelled() => break,
            next = frames.next() => next,
        };
        match next {
            Some(Ok(frame)) => shared.dispatch(frame),
            Some(Err(err)) => {
                shared.fail(err.to_string());
                break;
            }
            None => {
                shared.fail("server closed the connection".to_string());
                break;
            }
        }
    }
    debug!("read loop stopped");
}
