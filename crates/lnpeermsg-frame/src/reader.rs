use std::io::{self, ErrorKind, Read};
use std::time::{Duration, Instant};

use bytes::BytesMut;
use lnpeermsg_transport::RpcStream;
use tracing::trace;

use crate::codec::{decode_frame, Frame, FrameConfig, DEFAULT_MAX_PAYLOAD};
use crate::error::{FrameError, Result};
use crate::kind::kind_name;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Pulls whole envelopes off a blocking byte stream.
///
/// End of stream is reported two ways: [`FrameError::ConnectionClosed`] when
/// it falls between envelopes and [`FrameError::Truncated`] when part of an
/// envelope was already buffered.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    max_payload: usize,
    budget: Option<Duration>,
}

impl<T: Read> FrameReader<T> {
    /// Reader with the default payload limit and no time budget.
    pub fn new(inner: T) -> Self {
        Self::bounded(inner, DEFAULT_MAX_PAYLOAD)
    }

    /// Reader that refuses envelopes announcing more than `max_payload` bytes.
    pub fn bounded(inner: T, max_payload: usize) -> Self {
        Self {
            inner,
            buf: BytesMut::new(),
            max_payload,
            budget: None,
        }
    }

    /// Read the next envelope, blocking until it is complete.
    ///
    /// With a time budget, an envelope that trickles in slower than the
    /// budget fails with [`FrameError::TimedOut`] even when each single read
    /// stays under the socket timeout.
    pub fn read_frame(&mut self) -> Result<Frame> {
        let deadline = self.budget.map(|budget| Instant::now() + budget);
        loop {
            if let Some(frame) = decode_frame(&mut self.buf, self.max_payload)? {
                trace!(kind = kind_name(frame.kind), size = frame.payload.len(), "frame read");
                return Ok(frame);
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(FrameError::TimedOut);
            }
            if self.fill()? == 0 {
                return Err(self.end_of_stream());
            }
        }
    }

    /// Bytes received but not yet returned as an envelope.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    fn end_of_stream(&self) -> FrameError {
        if self.buf.is_empty() {
            FrameError::ConnectionClosed
        } else {
            trace!(buffered = self.buf.len(), "stream ended inside an envelope");
            FrameError::Truncated {
                buffered: self.buf.len(),
            }
        }
    }

    /// Append one read's worth of bytes to the buffer; `0` means end of stream.
    fn fill(&mut self) -> Result<usize> {
        let start = self.buf.len();
        self.buf.resize(start + READ_CHUNK_SIZE, 0);
        let read = loop {
            match self.inner.read(&mut self.buf[start..]) {
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                other => break other,
            }
        };
        let filled = *read.as_ref().unwrap_or(&0);
        self.buf.truncate(start + filled);
        read.map_err(FrameError::from_io)
    }
}

impl FrameReader<RpcStream> {
    /// Reader for a node connection.
    ///
    /// `config.read_timeout` becomes both the socket read timeout and the
    /// budget for assembling one envelope.
    pub fn for_rpc(inner: RpcStream, config: &FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(|err| FrameError::Io(io::Error::other(err)))?;
        let mut reader = Self::bounded(inner, config.max_payload_size);
        reader.budget = config.read_timeout;
        Ok(reader)
    }
}
