use std::iter::FusedIterator;

use lnpeermsg_wire::{CustomMessage, ErrorMessage, PeerId};
use tracing::{debug, trace};

use crate::error::{PeerError, Result};
use crate::rpc::RawCustomMessage;
use crate::transport::{CancelHandle, NodeTransport, Subscription};

/// A custom message received from a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub sender: PeerId,
    pub message: CustomMessage,
}

impl InboundEvent {
    /// Decoded `error` body, when the peer sent an error message.
    pub fn error_message(&self) -> Option<Result<ErrorMessage>> {
        self.message
            .as_error()
            .map(|decoded| decoded.map_err(PeerError::from))
    }
}

impl TryFrom<RawCustomMessage> for InboundEvent {
    type Error = PeerError;

    fn try_from(raw: RawCustomMessage) -> Result<Self> {
        let sender = PeerId::from_slice(&raw.peer)?;
        Ok(Self {
            sender,
            message: CustomMessage::new(raw.msg_type, raw.data),
        })
    }
}

/// Opens inbound message streams on a node.
pub struct MessageSubscriber<T> {
    transport: T,
}

impl<T: NodeTransport> MessageSubscriber<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Start receiving custom messages from all peers.
    ///
    /// Only messages arriving after this call are delivered.
    pub fn subscribe(&self) -> Result<InboundEvents> {
        let inner = self.transport.subscribe_custom_messages()?;
        debug!("custom message subscription open");
        Ok(InboundEvents { inner, done: false })
    }
}

/// Ordered stream of decoded inbound messages.
///
/// Ends with `None` on a clean close or after cancellation. A failure is
/// yielded once as `Some(Err(_))`, after which the stream is finished.
#[derive(Debug)]
pub struct InboundEvents {
    inner: Subscription,
    done: bool,
}

impl InboundEvents {
    pub fn cancel_handle(&self) -> CancelHandle {
        self.inner.cancel_handle()
    }
}

impl Iterator for InboundEvents {
    type Item = Result<InboundEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = match self.inner.next() {
            Some(Ok(raw)) => InboundEvent::try_from(raw),
            Some(Err(err)) => Err(err),
            None => {
                self.done = true;
                return None;
            }
        };
        match item {
            Ok(event) => {
                trace!(sender = %event.sender, msg_type = event.message.msg_type, "inbound message");
                Some(Ok(event))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for InboundEvents {}
