use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::chan_id::{ChannelId, CHANNEL_ID_LEN};
use crate::error::{Result, WireError};

/// BOLT #1 `error` message type.
pub const MSG_ERROR: u16 = 17;

/// First message type in the custom (odd/even application) range.
pub const CUSTOM_TYPE_START: u16 = 32_768;

/// Wire size of a channel error body with no detail text.
pub const CHANNEL_ERROR_FRAME_LEN: usize = CHANNEL_ID_LEN + 2;

/// Narrow a caller-supplied message type to the 16-bit wire field.
///
/// Values above `u16::MAX` are rejected, never truncated.
pub fn wire_type(msg_type: u64) -> Result<u16> {
    u16::try_from(msg_type).map_err(|_| WireError::TypeOutOfRange(msg_type))
}

/// Returns true if the type lies in the custom message range.
pub fn is_custom_type(msg_type: u16) -> bool {
    msg_type >= CUSTOM_TYPE_START
}

/// Human-readable class of a message type.
pub fn type_name(msg_type: u32) -> &'static str {
    match msg_type {
        t if t == u32::from(MSG_ERROR) => "ERROR",
        t if t > u32::from(u16::MAX) => "INVALID",
        t if t >= u32::from(CUSTOM_TYPE_START) => "CUSTOM",
        _ => "PROTOCOL",
    }
}

/// Payload of a generic custom message: the bytes go out verbatim.
pub fn frame_custom(payload: impl Into<Bytes>) -> Bytes {
    payload.into()
}

/// Payload of an `error` message for `channel_id` with no detail text.
///
/// Always [`CHANNEL_ERROR_FRAME_LEN`] bytes: the channel id followed by a
/// zero u16 length.
pub fn frame_channel_error(channel_id: &ChannelId) -> Bytes {
    let mut buf = BytesMut::with_capacity(CHANNEL_ERROR_FRAME_LEN);
    buf.put_slice(channel_id.as_bytes());
    buf.put_u16(0);
    buf.freeze()
}

/// A typed message exchanged with a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomMessage {
    /// Message type as carried by the node RPC (32 bits, 16 on the wire).
    pub msg_type: u32,
    /// Opaque payload.
    pub payload: Bytes,
}

impl CustomMessage {
    pub fn new(msg_type: u32, payload: impl Into<Bytes>) -> Self {
        Self {
            msg_type,
            payload: frame_custom(payload),
        }
    }

    /// The `error` message that asks the peer to force close `channel_id`.
    pub fn channel_error(channel_id: &ChannelId) -> Self {
        Self {
            msg_type: u32::from(MSG_ERROR),
            payload: frame_channel_error(channel_id),
        }
    }

    pub fn is_error(&self) -> bool {
        self.msg_type == u32::from(MSG_ERROR)
    }

    /// Checked 16-bit wire type.
    pub fn wire_type(&self) -> Result<u16> {
        wire_type(u64::from(self.msg_type))
    }

    /// Decode the payload as an `error` body, if this is an error message.
    pub fn as_error(&self) -> Option<Result<ErrorMessage>> {
        self.is_error().then(|| ErrorMessage::decode(&self.payload))
    }

    /// Encode as a Lightning wire message: `type (u16 BE) || payload`.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        let wire_type = self.wire_type()?;
        dst.reserve(self.wire_size());
        dst.put_u16(wire_type);
        dst.put_slice(&self.payload);
        Ok(())
    }

    /// Decode a Lightning wire message.
    pub fn decode(mut src: &[u8]) -> Result<Self> {
        if src.len() < 2 {
            return Err(WireError::Truncated {
                what: "message type",
                needed: 2,
                actual: src.len(),
            });
        }
        let msg_type = src.get_u16();
        Ok(Self {
            msg_type: u32::from(msg_type),
            payload: Bytes::copy_from_slice(src),
        })
    }

    pub fn wire_size(&self) -> usize {
        2 + self.payload.len()
    }
}

/// Body of a BOLT #1 `error` message.
///
/// ```text
/// ┌──────────────────┬──────────────┬─────────────┐
/// │ channel_id (32B) │ len (2B BE)  │ data (len)  │
/// └──────────────────┴──────────────┴─────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    pub channel_id: ChannelId,
    pub data: Bytes,
}

impl ErrorMessage {
    pub fn new(channel_id: ChannelId, data: impl Into<Bytes>) -> Self {
        Self {
            channel_id,
            data: data.into(),
        }
    }

    /// Encode the body; `data` longer than `u16::MAX` bytes is refused.
    pub fn encode(&self) -> Result<Bytes> {
        let len = u16::try_from(self.data.len()).map_err(|_| WireError::TooLong {
            what: "error data",
            len: self.data.len(),
            max: usize::from(u16::MAX),
        })?;
        let mut buf = BytesMut::with_capacity(CHANNEL_ERROR_FRAME_LEN + self.data.len());
        buf.put_slice(self.channel_id.as_bytes());
        buf.put_u16(len);
        buf.put_slice(&self.data);
        Ok(buf.freeze())
    }

    pub fn decode(mut src: &[u8]) -> Result<Self> {
        if src.len() < CHANNEL_ERROR_FRAME_LEN {
            return Err(WireError::Truncated {
                what: "error message",
                needed: CHANNEL_ERROR_FRAME_LEN,
                actual: src.len(),
            });
        }

        let mut id = [0u8; CHANNEL_ID_LEN];
        src.copy_to_slice(&mut id);
        let len = usize::from(src.get_u16());
        if src.len() < len {
            return Err(WireError::Truncated {
                what: "error data",
                needed: len,
                actual: src.len(),
            });
        }

        Ok(Self {
            channel_id: ChannelId::from_bytes(id),
            data: Bytes::copy_from_slice(&src[..len]),
        })
    }

    /// Detail text, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}
