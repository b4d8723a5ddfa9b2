//! Lightning wire primitives for peer custom messages.
//!
//! This crate holds the byte-exact parts of the system:
//! - Parsing and formatting `<txid>:<index>` channel points
//! - Deriving the 32-byte channel id from a funding outpoint
//! - Framing custom payloads and the fixed 34-byte channel error body
//!
//! Nothing here performs I/O.

pub mod chan_id;
pub mod error;
pub mod message;
pub mod outpoint;
pub mod peer_id;

pub use chan_id::{ChannelId, CHANNEL_ID_LEN};
pub use error::{Result, WireError};
pub use message::{
    frame_channel_error, frame_custom, is_custom_type, type_name, wire_type, CustomMessage,
    ErrorMessage, CHANNEL_ERROR_FRAME_LEN, CUSTOM_TYPE_START, MSG_ERROR,
};
pub use outpoint::{OutPoint, Txid, TXID_LEN};
pub use peer_id::{PeerId, PEER_ID_LEN};
