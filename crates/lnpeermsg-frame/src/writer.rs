use std::io::{self, ErrorKind, Write};
use std::time::{Duration, Instant};

use bytes::{Buf, BytesMut};
use lnpeermsg_transport::RpcStream;
use tracing::trace;

use crate::codec::{encode_frame, FrameConfig, DEFAULT_MAX_PAYLOAD};
use crate::error::{FrameError, Result};
use crate::kind::kind_name;

/// Pushes whole envelopes onto a blocking byte stream.
///
/// A failed [`FrameWriter::send`] may leave part of an envelope on the wire;
/// the stream is unusable afterwards and should be dropped.
pub struct FrameWriter<T> {
    inner: T,
    pending: BytesMut,
    max_payload: usize,
    budget: Option<Duration>,
}

impl<T: Write> FrameWriter<T> {
    /// Writer with the default payload limit and no time budget.
    pub fn new(inner: T) -> Self {
        Self::bounded(inner, DEFAULT_MAX_PAYLOAD)
    }

    /// Writer that refuses payloads longer than `max_payload` bytes.
    pub fn bounded(inner: T, max_payload: usize) -> Self {
        Self {
            inner,
            pending: BytesMut::new(),
            max_payload,
            budget: None,
        }
    }

    /// Encode `payload` as an envelope of `kind` and write all of it.
    ///
    /// Oversized payloads are refused before any byte is written.
    pub fn send(&mut self, kind: u16, payload: &[u8]) -> Result<()> {
        if payload.len() > self.max_payload {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: self.max_payload,
            });
        }

        self.pending.clear();
        encode_frame(kind, payload, &mut self.pending)?;

        let deadline = self.budget.map(|budget| Instant::now() + budget);
        while self.pending.has_remaining() {
            match self.inner.write(&self.pending) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => self.pending.advance(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::from_io(err)),
            }
            if self.pending.has_remaining() && deadline.is_some_and(|d| Instant::now() >= d) {
                trace!(unsent = self.pending.len(), "envelope write budget exhausted");
                return Err(FrameError::TimedOut);
            }
        }
        trace!(kind = kind_name(kind), size = payload.len(), "frame written");

        loop {
            match self.inner.flush() {
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                other => return other.map_err(FrameError::from_io),
            }
        }
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl FrameWriter<RpcStream> {
    /// Writer for a node connection.
    ///
    /// `config.write_timeout` becomes both the socket write timeout and the
    /// budget for pushing out one envelope.
    pub fn for_rpc(inner: RpcStream, config: &FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(|err| FrameError::Io(io::Error::other(err)))?;
        let mut writer = Self::bounded(inner, config.max_payload_size);
        writer.budget = config.write_timeout;
        Ok(writer)
    }
}
