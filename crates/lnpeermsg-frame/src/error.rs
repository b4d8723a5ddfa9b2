use std::io::{self, ErrorKind};

/// Errors that can occur during envelope encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The envelope header contains an invalid magic number.
    #[error("invalid frame magic (expected 0x4c4e \"LN\")")]
    InvalidMagic,

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing envelopes.
    #[error("frame I/O error: {0}")]
    Io(#[from] io::Error),

    /// The node stopped answering within the configured budget.
    #[error("timed out waiting on the node socket")]
    TimedOut,

    /// The peer closed the connection between two envelopes.
    #[error("connection closed")]
    ConnectionClosed,

    /// The peer closed the connection partway through an envelope.
    #[error("connection closed mid-envelope ({buffered} bytes buffered)")]
    Truncated { buffered: usize },
}

impl FrameError {
    /// Classify a stream error; socket timeouts become [`FrameError::TimedOut`].
    pub(crate) fn from_io(err: io::Error) -> Self {
        match err.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => FrameError::TimedOut,
            _ => FrameError::Io(err),
        }
    }

    /// True when the node did not answer in time.
    pub fn is_timeout(&self) -> bool {
        match self {
            FrameError::TimedOut => true,
            FrameError::Io(err) => matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
