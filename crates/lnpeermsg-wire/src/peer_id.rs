use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WireError};

/// Length of a compressed secp256k1 public key.
pub const PEER_ID_LEN: usize = 33;

/// Identity public key of a directly connected peer.
///
/// Only the length is checked; the key is otherwise passed through untouched.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId([u8; PEER_ID_LEN]);

impl PeerId {
    pub const fn from_bytes(bytes: [u8; PEER_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; PEER_ID_LEN] = bytes.try_into().map_err(|_| {
            WireError::InvalidPeerIdentifier(format!(
                "expected {PEER_ID_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; PEER_ID_LEN] {
        &self.0
    }
}

impl FromStr for PeerId {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes =
            hex::decode(s).map_err(|err| WireError::InvalidPeerIdentifier(err.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl TryFrom<&[u8]> for PeerId {
    type Error = WireError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::from_slice(bytes)
    }
}

impl AsRef<[u8]> for PeerId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({self})")
    }
}
