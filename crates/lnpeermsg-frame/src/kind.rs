//! Envelope kinds of the node RPC protocol.
//!
//! A send is one `SEND_CUSTOM` answered by `SEND_CUSTOM_ACK` or `ERROR`.
//! A subscription is one `SUBSCRIBE_CUSTOM` answered by any number of
//! `CUSTOM_EVENT`s and closed by `END_OF_STREAM` or `ERROR`.

/// Client request: deliver one custom message to a peer.
pub const SEND_CUSTOM: u16 = 1;

/// Node response: the message was accepted for delivery.
pub const SEND_CUSTOM_ACK: u16 = 2;

/// Client request: stream inbound custom messages on this connection.
pub const SUBSCRIBE_CUSTOM: u16 = 3;

/// Node stream item: one inbound custom message.
pub const CUSTOM_EVENT: u16 = 4;

/// Node stream end: no further events will follow.
pub const END_OF_STREAM: u16 = 5;

/// Node failure, with a JSON `{"message": ...}` body.
pub const ERROR: u16 = 6;

/// Returns a human-readable name for an envelope kind.
pub fn kind_name(kind: u16) -> &'static str {
    match kind {
        SEND_CUSTOM => "SEND_CUSTOM",
        SEND_CUSTOM_ACK => "SEND_CUSTOM_ACK",
        SUBSCRIBE_CUSTOM => "SUBSCRIBE_CUSTOM",
        CUSTOM_EVENT => "CUSTOM_EVENT",
        END_OF_STREAM => "END_OF_STREAM",
        ERROR => "ERROR",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_cover_every_kind() {
        for kind in 1..=6u16 {
            assert_ne!(kind_name(kind), "UNKNOWN");
        }
        assert_eq!(kind_name(0), "UNKNOWN");
        assert_eq!(kind_name(CUSTOM_EVENT), "CUSTOM_EVENT");
    }
}
