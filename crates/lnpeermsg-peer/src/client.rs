use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lnpeermsg_frame::{
    Frame, FrameConfig, FrameError, FrameReader, FrameWriter, CUSTOM_EVENT, DEFAULT_MAX_PAYLOAD,
    END_OF_STREAM, ERROR, SEND_CUSTOM, SEND_CUSTOM_ACK, SUBSCRIBE_CUSTOM,
};
use lnpeermsg_transport::{RpcStream, UnixDomainSocket};
use lnpeermsg_wire::PeerId;
use tracing::debug;

use crate::error::{PeerError, Result};
use crate::rpc::{error_reason, RawCustomMessage, SubscribeRequest};
use crate::transport::{CancelHandle, EventSource, NodeTransport, Subscription};

/// Settings for talking to the node RPC socket.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Bound on each request/response exchange (connect excluded).
    /// Subscriptions wait for events without a bound.
    pub timeout: Duration,
    /// Maximum envelope payload accepted or sent.
    pub max_payload_size: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// [`NodeTransport`] over the node's Unix-socket RPC.
///
/// Nothing is opened until the first call. Sends share one request
/// connection guarded by a mutex; a connection that failed mid-exchange is
/// dropped and reopened on the next send. Every subscription gets a
/// dedicated connection.
pub struct RpcClient {
    path: PathBuf,
    config: RpcConfig,
    conn: Mutex<Option<Connection>>,
}

struct Connection {
    reader: FrameReader<RpcStream>,
    writer: FrameWriter<RpcStream>,
}

impl Connection {
    fn open(path: &Path, config: &RpcConfig, read_timeout: Option<Duration>) -> Result<Self> {
        let stream = UnixDomainSocket::connect(path)?;
        let reader_stream = stream.try_clone()?;

        let frame_config = FrameConfig {
            max_payload_size: config.max_payload_size,
            read_timeout,
            write_timeout: Some(config.timeout),
        };

        Ok(Self {
            reader: FrameReader::for_rpc(reader_stream, &frame_config)?,
            writer: FrameWriter::for_rpc(stream, &frame_config)?,
        })
    }

    fn exchange(&mut self, kind: u16, body: &[u8]) -> std::result::Result<Frame, FrameError> {
        self.writer.send(kind, body)?;
        self.reader.read_frame()
    }
}

impl RpcClient {
    /// Client for the node socket at `path` with default settings.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_config(path, RpcConfig::default())
    }

    pub fn with_config(path: impl AsRef<Path>, config: RpcConfig) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            config,
            conn: Mutex::new(None),
        }
    }

    /// Socket path of the node.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    fn request(&self, kind: u16, body: &[u8]) -> Result<Frame> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| PeerError::TransportFailure("rpc connection lock poisoned".into()))?;

        let mut conn = match guard.take() {
            Some(conn) => conn,
            None => {
                debug!(path = ?self.path, "opening rpc request connection");
                Connection::open(&self.path, &self.config, Some(self.config.timeout))?
            }
        };

        match conn.exchange(kind, body) {
            Ok(reply) => {
                *guard = Some(conn);
                Ok(reply)
            }
            Err(err) if err.is_timeout() => Err(PeerError::Timeout(self.config.timeout)),
            Err(err) => Err(err.into()),
        }
    }
}

impl NodeTransport for RpcClient {
    fn send_custom_message(&self, peer: &PeerId, msg_type: u32, data: &[u8]) -> Result<()> {
        let body = serde_json::to_vec(&RawCustomMessage::new(
            peer.as_bytes().to_vec(),
            msg_type,
            data,
        ))?;
        let reply = self.request(SEND_CUSTOM, &body)?;
        interpret_send_reply(&reply)
    }

    fn subscribe_custom_messages(&self) -> Result<Subscription> {
        let mut conn = Connection::open(&self.path, &self.config, None)?;
        let body = serde_json::to_vec(&SubscribeRequest::default())?;
        conn.writer.send(SUBSCRIBE_CUSTOM, &body)?;

        let canceller = conn.reader.get_ref().try_clone()?;
        debug!(path = ?self.path, "subscribed to custom messages");

        Ok(Subscription::new(RpcEventSource {
            conn,
            canceller: Arc::new(canceller),
            cancelled: Arc::new(AtomicBool::new(false)),
            received: false,
        }))
    }
}

/// Subscription stream over a dedicated RPC connection.
struct RpcEventSource {
    conn: Connection,
    canceller: Arc<RpcStream>,
    cancelled: Arc<AtomicBool>,
    received: bool,
}

impl EventSource for RpcEventSource {
    fn recv(&mut self) -> Result<Option<RawCustomMessage>> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Ok(None);
        }

        let frame = match self.conn.reader.read_frame() {
            Ok(frame) => frame,
            Err(_) if self.cancelled.load(Ordering::SeqCst) => {
                debug!("subscription cancelled");
                return Ok(None);
            }
            Err(FrameError::ConnectionClosed) => {
                debug!("node closed the subscription connection");
                return Ok(None);
            }
            Err(err) => {
                debug!(error = %err, "subscription connection failed");
                return Err(err.into());
            }
        };

        let event = interpret_event_frame(&frame, self.received)?;
        self.received |= event.is_some();
        Ok(event)
    }

    fn cancel_handle(&self) -> CancelHandle {
        let canceller = Arc::clone(&self.canceller);
        let cancelled = Arc::clone(&self.cancelled);
        CancelHandle::new(move || {
            cancelled.store(true, Ordering::SeqCst);
            if let Err(err) = canceller.shutdown() {
                debug!(error = %err, "subscription socket shutdown failed");
            }
        })
    }
}

/// Interpret the node's answer to a `SEND_CUSTOM` request.
pub(crate) fn interpret_send_reply(frame: &Frame) -> Result<()> {
    match frame.kind {
        SEND_CUSTOM_ACK => Ok(()),
        ERROR => Err(PeerError::TransportFailure(error_reason(&frame.payload))),
        other => Err(PeerError::UnexpectedFrame(other)),
    }
}

/// Interpret one envelope of a subscription stream.
///
/// `Ok(None)` marks the clean end of the stream. An `ERROR` before any event
/// means the subscribe request itself failed.
pub(crate) fn interpret_event_frame(
    frame: &Frame,
    received: bool,
) -> Result<Option<RawCustomMessage>> {
    match frame.kind {
        CUSTOM_EVENT => Ok(Some(serde_json::from_slice(&frame.payload)?)),
        END_OF_STREAM => Ok(None),
        ERROR if received => Err(PeerError::StreamClosed(error_reason(&frame.payload))),
        ERROR => Err(PeerError::TransportFailure(error_reason(&frame.payload))),
        other => Err(PeerError::UnexpectedFrame(other)),
    }
}
