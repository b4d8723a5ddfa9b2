//! In-process [`NodeTransport`] that records sends and replays scripted events.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use lnpeermsg_wire::PeerId;
use tracing::debug;

use crate::error::{PeerError, Result};
use crate::rpc::RawCustomMessage;
use crate::transport::{CancelHandle, EventSource, NodeTransport, Subscription};

/// A message handed to [`MemoryTransport::send_custom_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub peer: PeerId,
    pub msg_type: u32,
    pub data: Vec<u8>,
}

enum Inbound {
    Event(RawCustomMessage),
    Close(Option<String>),
    Cancelled,
}

/// Fake node for tests and dry runs.
///
/// Sends are recorded in order. Inbound events pushed with
/// [`MemoryTransport::push_event`] are delivered to the single subscriber in
/// push order; [`MemoryTransport::close`] ends the stream.
pub struct MemoryTransport {
    sent: Mutex<Vec<SentMessage>>,
    send_failure: Mutex<Option<String>>,
    inbound_tx: Sender<Inbound>,
    inbound_rx: Mutex<Option<Receiver<Inbound>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel();
        Self {
            sent: Mutex::new(Vec::new()),
            send_failure: Mutex::new(None),
            inbound_tx,
            inbound_rx: Mutex::new(Some(inbound_rx)),
        }
    }

    /// Queue an inbound event for the subscriber.
    pub fn push_event(&self, event: RawCustomMessage) {
        let _ = self.inbound_tx.send(Inbound::Event(event));
    }

    /// End the inbound stream, cleanly or with a failure reason.
    pub fn close(&self, reason: Option<&str>) {
        let _ = self
            .inbound_tx
            .send(Inbound::Close(reason.map(str::to_string)));
    }

    /// Make every following send fail with `reason`.
    pub fn fail_sends(&self, reason: &str) {
        if let Ok(mut failure) = self.send_failure.lock() {
            *failure = Some(reason.to_string());
        }
    }

    /// Everything sent so far, in order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTransport for MemoryTransport {
    fn send_custom_message(&self, peer: &PeerId, msg_type: u32, data: &[u8]) -> Result<()> {
        let failure = self
            .send_failure
            .lock()
            .map_err(|_| PeerError::TransportFailure("memory transport poisoned".into()))?
            .clone();
        if let Some(reason) = failure {
            return Err(PeerError::TransportFailure(reason));
        }

        self.sent
            .lock()
            .map_err(|_| PeerError::TransportFailure("memory transport poisoned".into()))?
            .push(SentMessage {
                peer: *peer,
                msg_type,
                data: data.to_vec(),
            });
        debug!(%peer, msg_type, size = data.len(), "memory transport recorded send");
        Ok(())
    }

    fn subscribe_custom_messages(&self) -> Result<Subscription> {
        let rx = self
            .inbound_rx
            .lock()
            .map_err(|_| PeerError::TransportFailure("memory transport poisoned".into()))?
            .take()
            .ok_or_else(|| PeerError::TransportFailure("already subscribed".into()))?;

        Ok(Subscription::new(MemoryEventSource {
            rx,
            cancel_tx: self.inbound_tx.clone(),
        }))
    }
}

struct MemoryEventSource {
    rx: Receiver<Inbound>,
    cancel_tx: Sender<Inbound>,
}

impl EventSource for MemoryEventSource {
    fn recv(&mut self) -> Result<Option<RawCustomMessage>> {
        match self.rx.recv() {
            Ok(Inbound::Event(event)) => Ok(Some(event)),
            Ok(Inbound::Close(Some(reason))) => Err(PeerError::StreamClosed(reason)),
            Ok(Inbound::Close(None)) | Ok(Inbound::Cancelled) | Err(_) => Ok(None),
        }
    }

    fn cancel_handle(&self) -> CancelHandle {
        let tx = self.cancel_tx.clone();
        CancelHandle::new(move || {
            let _ = tx.send(Inbound::Cancelled);
        })
    }
}
