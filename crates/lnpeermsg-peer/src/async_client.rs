//! Tokio flavour of the node RPC client.

use std::future::{poll_fn, Future};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::BytesMut;
use futures_core::Stream;
use lnpeermsg_frame::{EnvelopeCodec, Frame, FrameError, SEND_CUSTOM, SUBSCRIBE_CUSTOM};
use lnpeermsg_transport::UnixDomainSocket;
use lnpeermsg_wire::{is_custom_type, ChannelId, CustomMessage, PeerId};
use tokio::io::AsyncWriteExt;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use tokio_util::codec::{Encoder, FramedRead};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};
use tracing::{debug, warn};

use crate::client::{interpret_event_frame, interpret_send_reply, RpcConfig};
use crate::error::{PeerError, Result};
use crate::rpc::{RawCustomMessage, SubscribeRequest};
use crate::subscriber::InboundEvent;

struct AsyncConnection {
    reader: FramedRead<OwnedReadHalf, EnvelopeCodec>,
    writer: OwnedWriteHalf,
    codec: EnvelopeCodec,
}

impl AsyncConnection {
    async fn open(path: &Path, config: &RpcConfig) -> Result<Self> {
        let stream = UnixDomainSocket::connect_async(path).await?;
        let (read_half, writer) = stream.into_split();
        let codec = EnvelopeCodec::new(config.max_payload_size);
        Ok(Self {
            reader: FramedRead::new(read_half, codec.clone()),
            writer,
            codec,
        })
    }

    async fn send(&mut self, kind: u16, body: Vec<u8>) -> std::result::Result<(), FrameError> {
        let mut buf = BytesMut::new();
        self.codec.encode(Frame::new(kind, body), &mut buf)?;
        self.writer.write_all(&buf).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn recv(&mut self) -> std::result::Result<Frame, FrameError> {
        let reader = &mut self.reader;
        match poll_fn(|cx| Pin::new(&mut *reader).poll_next(cx)).await {
            Some(frame) => frame,
            None => Err(FrameError::ConnectionClosed),
        }
    }
}

/// Async client for the node's Unix-socket RPC.
///
/// Behaves like [`crate::RpcClient`] combined with
/// [`crate::MessageDispatcher`]: sends are validated locally before anything
/// is written. The request connection is opened on the first send and
/// reopened after a failed exchange.
pub struct AsyncRpcClient {
    path: PathBuf,
    config: RpcConfig,
    conn: Mutex<Option<AsyncConnection>>,
}

impl AsyncRpcClient {
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

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Send `payload` verbatim as a message of `msg_type` to `peer`.
    pub async fn send(&self, peer: &[u8], msg_type: u32, payload: &[u8]) -> Result<()> {
        let peer = PeerId::from_slice(peer)?;
        self.send_message(&peer, &CustomMessage::new(msg_type, payload.to_vec()))
            .await
    }

    /// Send an `error` for `channel_id` to `peer`.
    pub async fn send_channel_error(&self, peer: &[u8], channel_id: &ChannelId) -> Result<()> {
        let peer = PeerId::from_slice(peer)?;
        self.send_message(&peer, &CustomMessage::channel_error(channel_id))
            .await
    }

    pub async fn send_message(&self, peer: &PeerId, message: &CustomMessage) -> Result<()> {
        let wire_type = message.wire_type()?;
        if !message.is_error() && !is_custom_type(wire_type) {
            warn!(
                msg_type = wire_type,
                "message type is below the custom range; the node may refuse it"
            );
        }

        let body = serde_json::to_vec(&RawCustomMessage::new(
            peer.as_bytes().to_vec(),
            message.msg_type,
            message.payload.to_vec(),
        ))?;
        let reply = self.request(SEND_CUSTOM, body).await?;
        interpret_send_reply(&reply)?;
        debug!(%peer, msg_type = wire_type, "message accepted by node");
        Ok(())
    }

    /// Open a dedicated subscription connection.
    ///
    /// Cancelling `cancel` ends the returned stream cleanly.
    pub async fn subscribe(&self, cancel: CancellationToken) -> Result<AsyncSubscription> {
        let mut conn = AsyncConnection::open(&self.path, &self.config).await?;
        let body = serde_json::to_vec(&SubscribeRequest::default())?;
        tokio::time::timeout(self.config.timeout, conn.send(SUBSCRIBE_CUSTOM, body))
            .await
            .map_err(|_| PeerError::Timeout(self.config.timeout))??;
        debug!(path = ?self.path, "subscribed to custom messages (async)");

        Ok(AsyncSubscription {
            reader: conn.reader,
            _writer: conn.writer,
            cancelled: Box::pin(cancel.cancelled_owned()),
            received: false,
            done: false,
        })
    }

    async fn request(&self, kind: u16, body: Vec<u8>) -> Result<Frame> {
        let mut guard = self.conn.lock().await;
        let mut conn = match guard.take() {
            Some(conn) => conn,
            None => {
                debug!(path = ?self.path, "opening rpc request connection");
                AsyncConnection::open(&self.path, &self.config).await?
            }
        };

        let exchange = async {
            conn.send(kind, body).await?;
            Ok::<_, FrameError>(conn.recv().await?)
        };
        let reply = tokio::time::timeout(self.config.timeout, exchange)
            .await
            .map_err(|_| PeerError::Timeout(self.config.timeout))??;

        *guard = Some(conn);
        Ok(reply)
    }
}

/// Stream of inbound messages over an async subscription connection.
///
/// Yields items in arrival order and ends with `None` on a clean close or
/// cancellation. A connection cut inside an envelope is an error. The
/// stream is fused after the first error.
pub struct AsyncSubscription {
    reader: FramedRead<OwnedReadHalf, EnvelopeCodec>,
    _writer: OwnedWriteHalf,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
    received: bool,
    done: bool,
}

impl AsyncSubscription {
    fn finish(&mut self, item: Option<Result<InboundEvent>>) -> Poll<Option<Result<InboundEvent>>> {
        self.done = true;
        Poll::Ready(item)
    }
}

impl Stream for AsyncSubscription {
    type Item = Result<InboundEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        if this.cancelled.as_mut().poll(cx).is_ready() {
            debug!("async subscription cancelled");
            return this.finish(None);
        }

        let frame = match Pin::new(&mut this.reader).poll_next(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(None) | Poll::Ready(Some(Err(FrameError::ConnectionClosed))) => {
                debug!("node closed the subscription connection");
                return this.finish(None);
            }
            Poll::Ready(Some(Err(err))) => {
                debug!(error = %err, "subscription connection failed");
                return this.finish(Some(Err(err.into())));
            }
            Poll::Ready(Some(Ok(frame))) => frame,
        };

        match interpret_event_frame(&frame, this.received) {
            Ok(Some(raw)) => {
                this.received = true;
                match InboundEvent::try_from(raw) {
                    Ok(event) => Poll::Ready(Some(Ok(event))),
                    Err(err) => this.finish(Some(Err(err))),
                }
            }
            Ok(None) => this.finish(None),
            Err(err) => this.finish(Some(Err(err))),
        }
    }
}
