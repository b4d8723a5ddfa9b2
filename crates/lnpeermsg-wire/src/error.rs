/// Errors raised while parsing or framing Lightning wire values.
///
/// Every variant is detected locally, before anything touches the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// The channel point is not a single `<txid>:<index>` pair.
    #[error("malformed channel point {0:?} (expected <txid>:<index>)")]
    MalformedReference(String),

    /// The output index is not a base-10 integer in the u32 range.
    #[error("unable to decode output index {input:?}: {reason}")]
    InvalidIndex { input: String, reason: String },

    /// The transaction id is not hex or longer than 64 characters.
    #[error("invalid transaction id {input:?}: {reason}")]
    InvalidTransactionId { input: String, reason: String },

    /// The peer identifier is not a 33-byte public key.
    #[error("invalid peer identifier: {0}")]
    InvalidPeerIdentifier(String),

    /// The message type does not fit the 16-bit wire type field.
    #[error("message type {0} does not fit the 16-bit wire type field (max 65535)")]
    TypeOutOfRange(u64),

    /// A length-prefixed field is longer than its u16 prefix can express.
    #[error("{what} is {len} bytes, the limit is {max}")]
    TooLong {
        what: &'static str,
        len: usize,
        max: usize,
    },

    /// A message body is shorter than its fixed fields require.
    #[error("truncated {what}: need {needed} bytes, got {actual}")]
    Truncated {
        what: &'static str,
        needed: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, WireError>;
