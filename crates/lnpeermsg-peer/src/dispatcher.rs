use lnpeermsg_wire::{is_custom_type, ChannelId, CustomMessage, OutPoint, PeerId};
use tracing::{debug, warn};

use crate::error::Result;
use crate::transport::NodeTransport;

/// Validates outbound messages and hands them to the node.
///
/// All validation happens before the transport is touched, so a rejected
/// call has no side effects. Nothing is retried; calling twice sends twice.
pub struct MessageDispatcher<T> {
    transport: T,
}

impl<T: NodeTransport> MessageDispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `payload` verbatim as a message of `msg_type` to `peer`.
    pub fn send(&self, peer: &[u8], msg_type: u32, payload: &[u8]) -> Result<()> {
        let peer = PeerId::from_slice(peer)?;
        self.send_message(&peer, &CustomMessage::new(msg_type, payload.to_vec()))
    }

    /// Send an already built message.
    pub fn send_message(&self, peer: &PeerId, message: &CustomMessage) -> Result<()> {
        let wire_type = message.wire_type()?;
        if !message.is_error() && !is_custom_type(wire_type) {
            warn!(
                msg_type = wire_type,
                "message type is below the custom range; the node may refuse it"
            );
        }

        self.transport
            .send_custom_message(peer, message.msg_type, &message.payload)?;
        debug!(%peer, msg_type = wire_type, size = message.payload.len(), "message accepted by node");
        Ok(())
    }

    /// Send an `error` for `channel_id`, prompting `peer` to force close it.
    pub fn send_channel_error(&self, peer: &[u8], channel_id: &ChannelId) -> Result<()> {
        let peer = PeerId::from_slice(peer)?;
        self.send_message(&peer, &CustomMessage::channel_error(channel_id))
    }

    /// Parse `chan_point`, derive its channel id and send the channel error.
    ///
    /// Returns the channel id the error was sent for.
    pub fn request_force_close(&self, peer: &[u8], chan_point: &str) -> Result<ChannelId> {
        let peer = PeerId::from_slice(peer)?;
        let outpoint = OutPoint::parse(chan_point)?;
        let channel_id = ChannelId::from_outpoint(&outpoint);
        debug!(%outpoint, %channel_id, "derived channel id");

        self.send_message(&peer, &CustomMessage::channel_error(&channel_id))?;
        Ok(channel_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lnpeermsg_wire::{WireError, CHANNEL_ERROR_FRAME_LEN, MSG_ERROR};

    use super::*;
    use crate::error::PeerError;
    use crate::memory::MemoryTransport;

    const PEER: [u8; 33] = [0x03; 33];

    #[test]
    fn send_records_exactly_one_message() {
        let transport = MemoryTransport::new();
        let dispatcher = MessageDispatcher::new(&transport);

        dispatcher.send(&PEER, 32_770, b"\x01\x02").unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].peer, PeerId::from_bytes(PEER));
        assert_eq!(sent[0].msg_type, 32_770);
        assert_eq!(sent[0].data, vec![1, 2]);
    }

    #[test]
    fn empty_payload_goes_out_empty() {
        let transport = MemoryTransport::new();
        MessageDispatcher::new(&transport)
            .send(&PEER, 40_000, b"")
            .unwrap();
        assert!(transport.sent()[0].data.is_empty());
    }

    #[test]
    fn sending_twice_sends_twice() {
        let transport = MemoryTransport::new();
        let dispatcher = MessageDispatcher::new(&transport);
        dispatcher.send(&PEER, 40_000, b"x").unwrap();
        dispatcher.send(&PEER, 40_000, b"x").unwrap();
        assert_eq!(transport.sent().len(), 2);
    }

    #[test]
    fn bad_peer_is_rejected_before_dispatch() {
        let transport = MemoryTransport::new();
        let err = MessageDispatcher::new(&transport)
            .send(&PEER[..32], 40_000, b"x")
            .unwrap_err();
        assert!(matches!(
            err,
            PeerError::Wire(WireError::InvalidPeerIdentifier(_))
        ));
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn wide_type_is_rejected_before_dispatch() {
        let transport = MemoryTransport::new();
        let err = MessageDispatcher::new(&transport)
            .send(&PEER, 65_536, b"x")
            .unwrap_err();
        assert!(matches!(
            err,
            PeerError::Wire(WireError::TypeOutOfRange(65_536))
        ));
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn channel_error_is_type_17_with_34_byte_body() {
        let transport = MemoryTransport::new();
        let id = ChannelId::from_bytes([0x44; 32]);
        MessageDispatcher::new(&transport)
            .send_channel_error(&PEER, &id)
            .unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].msg_type, u32::from(MSG_ERROR));
        assert_eq!(sent[0].data.len(), CHANNEL_ERROR_FRAME_LEN);
        assert_eq!(&sent[0].data[..32], id.as_bytes());
        assert_eq!(&sent[0].data[32..], &[0, 0]);
    }

    #[test]
    fn force_close_runs_the_whole_path() {
        let transport = MemoryTransport::new();
        let chan_point = format!("0000{}:3", "cd".repeat(30));
        let id = MessageDispatcher::new(&transport)
            .request_force_close(&PEER, &chan_point)
            .unwrap();

        assert_eq!(&id.as_bytes()[30..], &[0x00, 0x03]);
        assert_eq!(&id.as_bytes()[..30], &[0xcd; 30]);
        assert_eq!(&transport.sent()[0].data[..32], id.as_bytes());
    }

    #[test]
    fn force_close_with_bad_chan_point_sends_nothing() {
        let transport = MemoryTransport::new();
        let dispatcher = MessageDispatcher::new(&transport);

        for (chan_point, expect_index) in [("onlytxid", false), ("validtxid:-1", true)] {
            let err = dispatcher
                .request_force_close(&PEER, chan_point)
                .unwrap_err();
            match err {
                PeerError::Wire(WireError::MalformedReference(_)) => assert!(!expect_index),
                PeerError::Wire(WireError::InvalidIndex { .. }) => assert!(expect_index),
                other => panic!("unexpected error: {other:?}"),
            }
        }
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn transport_failure_propagates() {
        let transport = MemoryTransport::new();
        transport.fail_sends("peer offline");
        let err = MessageDispatcher::new(&transport)
            .send(&PEER, 40_000, b"x")
            .unwrap_err();
        assert!(matches!(err, PeerError::TransportFailure(_)));
    }

    #[test]
    fn concurrent_sends_share_one_transport() {
        let transport = Arc::new(MemoryTransport::new());
        let dispatcher = MessageDispatcher::new(Arc::clone(&transport));

        std::thread::scope(|scope| {
            for i in 0..8u8 {
                let dispatcher = &dispatcher;
                scope.spawn(move || dispatcher.send(&PEER, 40_000, &[i]).unwrap());
            }
        });

        let mut payloads: Vec<u8> = transport.sent().iter().map(|m| m.data[0]).collect();
        payloads.sort_unstable();
        assert_eq!(payloads, (0..8).collect::<Vec<_>>());
    }
}
