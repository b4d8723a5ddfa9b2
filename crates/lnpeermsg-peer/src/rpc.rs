//! JSON bodies carried inside node RPC envelopes.

use serde::{Deserialize, Serialize};

/// A custom message as the node RPC carries it.
///
/// Used both as the `SEND_CUSTOM` request body and as the `CUSTOM_EVENT`
/// stream item. Byte fields travel as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCustomMessage {
    /// Peer public key: the destination when sending, the sender on events.
    #[serde(with = "hex_serde")]
    pub peer: Vec<u8>,
    /// Message type.
    #[serde(rename = "type")]
    pub msg_type: u32,
    /// Message payload.
    #[serde(with = "hex_serde", default)]
    pub data: Vec<u8>,
}

impl RawCustomMessage {
    pub fn new(peer: impl Into<Vec<u8>>, msg_type: u32, data: impl Into<Vec<u8>>) -> Self {
        Self {
            peer: peer.into(),
            msg_type,
            data: data.into(),
        }
    }
}

/// Body of a `SUBSCRIBE_CUSTOM` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {}

/// Body of an `ERROR` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcErrorBody {
    pub message: String,
}

/// Extract the failure reason from an `ERROR` payload.
///
/// Falls back to the raw text when the node sent something other than
/// `{"message": ...}`.
pub fn error_reason(payload: &[u8]) -> String {
    match serde_json::from_slice::<RpcErrorBody>(payload) {
        Ok(body) => body.message,
        Err(_) if payload.is_empty() => "node reported an error".to_string(),
        Err(_) => String::from_utf8_lossy(payload).into_owned(),
    }
}

mod hex_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, T>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: AsRef<[u8]>,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}
