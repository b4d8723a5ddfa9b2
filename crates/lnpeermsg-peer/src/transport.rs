//! The capability seam between the core logic and whatever reaches the node.

use std::fmt;
use std::sync::Arc;

use lnpeermsg_wire::PeerId;

use crate::error::Result;
use crate::rpc::RawCustomMessage;

/// The two node operations the core needs.
///
/// Implementations must be usable from several threads at once.
pub trait NodeTransport: Send + Sync {
    /// Hand one message to the node for delivery to `peer`.
    ///
    /// Success means the node accepted and queued it, nothing more.
    fn send_custom_message(&self, peer: &PeerId, msg_type: u32, data: &[u8]) -> Result<()>;

    /// Open a stream of inbound custom messages from all peers.
    fn subscribe_custom_messages(&self) -> Result<Subscription>;
}

impl<T: NodeTransport + ?Sized> NodeTransport for &T {
    fn send_custom_message(&self, peer: &PeerId, msg_type: u32, data: &[u8]) -> Result<()> {
        (**self).send_custom_message(peer, msg_type, data)
    }

    fn subscribe_custom_messages(&self) -> Result<Subscription> {
        (**self).subscribe_custom_messages()
    }
}

impl<T: NodeTransport + ?Sized> NodeTransport for Arc<T> {
    fn send_custom_message(&self, peer: &PeerId, msg_type: u32, data: &[u8]) -> Result<()> {
        (**self).send_custom_message(peer, msg_type, data)
    }

    fn subscribe_custom_messages(&self) -> Result<Subscription> {
        (**self).subscribe_custom_messages()
    }
}

/// Producer side of a subscription.
pub trait EventSource: Send {
    /// Block until the next message arrives.
    ///
    /// `Ok(None)` is a clean end of stream (including local cancellation).
    fn recv(&mut self) -> Result<Option<RawCustomMessage>>;

    /// A handle that unblocks [`EventSource::recv`] from another thread.
    fn cancel_handle(&self) -> CancelHandle;
}

/// Cancels a subscription from any thread.
///
/// Cancelling is idempotent. A receive blocked at the time returns promptly
/// and the subscription then ends cleanly.
#[derive(Clone)]
pub struct CancelHandle {
    cancel: Arc<dyn Fn() + Send + Sync>,
}

impl CancelHandle {
    pub fn new(cancel: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Arc::new(cancel),
        }
    }

    pub fn cancel(&self) {
        (self.cancel)();
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle").finish_non_exhaustive()
    }
}

/// A lazy, ordered stream of raw inbound messages.
///
/// Iteration yields messages in arrival order. The first error or the end of
/// the stream is final; after it the iterator only returns `None`.
pub struct Subscription {
    source: Box<dyn EventSource>,
    done: bool,
}

impl Subscription {
    pub fn new(source: impl EventSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            done: false,
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.source.cancel_handle()
    }
}

impl Iterator for Subscription {
    type Item = Result<RawCustomMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.source.recv() {
            Ok(Some(msg)) => Some(Ok(msg)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for Subscription {}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
