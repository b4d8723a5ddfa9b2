//! Length-prefixed envelopes for the node RPC socket.
//!
//! Every request, response and stream event exchanged with the node is one
//! envelope:
//! - A 2-byte magic number ("LN") for stream synchronization
//! - A 4-byte little-endian payload length
//! - A 2-byte little-endian kind telling the receiver how to read the payload
//!
//! Readers and writers hide partial reads and writes from callers and tell a
//! close between envelopes apart from one inside an envelope.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod error;
pub mod kind;
#[cfg(unix)]
pub mod reader;
#[cfg(unix)]
pub mod writer;

#[cfg(feature = "async")]
pub use async_codec::EnvelopeCodec;
pub use codec::{decode_frame, encode_frame, Frame, FrameConfig, DEFAULT_MAX_PAYLOAD, HEADER_SIZE};
pub use error::{FrameError, Result};
pub use kind::{
    kind_name, CUSTOM_EVENT, END_OF_STREAM, ERROR, SEND_CUSTOM, SEND_CUSTOM_ACK, SUBSCRIBE_CUSTOM,
};
#[cfg(unix)]
pub use reader::FrameReader;
#[cfg(unix)]
pub use writer::FrameWriter;
