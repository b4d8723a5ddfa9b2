use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WireError};

/// Length of a transaction id in bytes.
pub const TXID_LEN: usize = 32;

/// A transaction id stored in internal (wire) byte order.
///
/// The textual form is the byte-reversed hex string shown by block explorers
/// and node RPCs.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Txid([u8; TXID_LEN]);

impl Txid {
    /// Wrap raw bytes already in internal order.
    pub const fn from_byte_array(bytes: [u8; TXID_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes in internal order.
    pub fn to_byte_array(self) -> [u8; TXID_LEN] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; TXID_LEN] {
        &self.0
    }
}

impl FromStr for Txid {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: String| WireError::InvalidTransactionId {
            input: s.to_string(),
            reason,
        };

        if s.len() > TXID_LEN * 2 {
            return Err(invalid(format!(
                "at most {} hex characters, got {}",
                TXID_LEN * 2,
                s.len()
            )));
        }

        // Short (and odd-length) ids are left-padded with zeros.
        let mut padded = [b'0'; TXID_LEN * 2];
        padded[TXID_LEN * 2 - s.len()..].copy_from_slice(s.as_bytes());

        let mut bytes = [0u8; TXID_LEN];
        hex::decode_to_slice(padded, &mut bytes).map_err(|err| invalid(err.to_string()))?;
        bytes.reverse();
        Ok(Self(bytes))
    }
}

impl fmt::Display for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut display = self.0;
        display.reverse();
        f.write_str(&hex::encode(display))
    }
}

impl fmt::Debug for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Txid({self})")
    }
}

/// A reference to one output of one on-chain transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutPoint {
    pub txid: Txid,
    pub index: u32,
}

impl OutPoint {
    pub const fn new(txid: Txid, index: u32) -> Self {
        Self { txid, index }
    }

    /// Parse a `<txid>:<index>` channel point.
    ///
    /// The index is validated before the txid, so `"garbage:-1"` reports
    /// [`WireError::InvalidIndex`].
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.split(':');
        let (txid, index) = match (parts.next(), parts.next(), parts.next()) {
            (Some(txid), Some(index), None) if !txid.is_empty() && !index.is_empty() => {
                (txid, index)
            }
            _ => return Err(WireError::MalformedReference(s.to_string())),
        };

        let index = parse_index(index)?;
        let txid = txid.parse::<Txid>()?;

        Ok(Self { txid, index })
    }
}

fn parse_index(input: &str) -> Result<u32> {
    if !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WireError::InvalidIndex {
            input: input.to_string(),
            reason: "not a non-negative base-10 integer".to_string(),
        });
    }
    input.parse::<u32>().map_err(|err| WireError::InvalidIndex {
        input: input.to_string(),
        reason: err.to_string(),
    })
}

impl FromStr for OutPoint {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.index)
    }
}
