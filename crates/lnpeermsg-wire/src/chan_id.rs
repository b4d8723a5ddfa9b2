use std::fmt;

use crate::outpoint::OutPoint;

/// Length of a channel id in bytes.
pub const CHANNEL_ID_LEN: usize = 32;

/// Canonical 32-byte channel identifier (BOLT #2 `channel_id`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId([u8; CHANNEL_ID_LEN]);

impl ChannelId {
    pub const fn from_bytes(bytes: [u8; CHANNEL_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Derive the channel id of the channel funded by `outpoint`.
    ///
    /// The funding txid (internal byte order) is XORed in its last two bytes
    /// with the big-endian output index. Only the low 16 bits of the index
    /// take part: outputs `n` and `n + 65536` of the same transaction map to
    /// the same id. Peers on the network compute it this way, so the
    /// truncation must stay.
    pub fn from_outpoint(outpoint: &OutPoint) -> Self {
        let mut id = outpoint.txid.to_byte_array();
        let [hi, lo] = ((outpoint.index & 0xffff) as u16).to_be_bytes();
        id[30] ^= hi;
        id[31] ^= lo;
        Self(id)
    }

    pub fn as_bytes(&self) -> &[u8; CHANNEL_ID_LEN] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; CHANNEL_ID_LEN] {
        self.0
    }
}

impl From<&OutPoint> for ChannelId {
    fn from(outpoint: &OutPoint) -> Self {
        Self::from_outpoint(outpoint)
    }
}

impl AsRef<[u8]> for ChannelId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelId({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outpoint::Txid;

    fn txid(fill: u8) -> Txid {
        let mut bytes = [fill; 32];
        bytes[0] = 0x01;
        Txid::from_byte_array(bytes)
    }

    #[test]
    fn zero_tail_txid_gets_index_in_last_two_bytes() {
        // Display form starts with "0000", so the internal tail is 00 00.
        let text = format!("0000{}:3", "ab".repeat(30));
        let op = OutPoint::parse(&text).unwrap();
        let id = ChannelId::from_outpoint(&op);

        let mut expected = op.txid.to_byte_array();
        expected[30] = 0x00;
        expected[31] = 0x03;
        assert_eq!(id.to_bytes(), expected);
    }

    #[test]
    fn index_is_xored_not_overwritten() {
        let op = OutPoint::new(txid(0xff), 0x0102);
        let id = ChannelId::from_outpoint(&op);
        assert_eq!(&id.as_bytes()[30..], &[0xff ^ 0x01, 0xff ^ 0x02]);
        assert_eq!(&id.as_bytes()[..30], &op.txid.as_bytes()[..30]);
    }

    #[test]
    fn index_zero_is_the_txid() {
        let op = OutPoint::new(txid(0x5a), 0);
        assert_eq!(ChannelId::from_outpoint(&op).to_bytes(), op.txid.to_byte_array());
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = ChannelId::from_outpoint(&OutPoint::new(txid(0x11), 42));
        let b = ChannelId::from(&OutPoint::new(txid(0x11), 42));
        assert_eq!(a, b);
    }

    #[test]
    fn low_index_bits_only_touch_last_two_bytes() {
        let base = ChannelId::from_outpoint(&OutPoint::new(txid(0x22), 0x0001_0000));
        for low in [1u32, 0x00ff, 0x0100, 0xffff] {
            let other = ChannelId::from_outpoint(&OutPoint::new(txid(0x22), 0x0001_0000 | low));
            assert_eq!(&base.as_bytes()[..30], &other.as_bytes()[..30]);
            assert_ne!(&base.as_bytes()[30..], &other.as_bytes()[30..]);
        }
    }

    #[test]
    fn legacy_truncation_collides_on_high_index_bits() {
        // Kept on purpose: only 16 index bits fit in the channel id.
        let low = ChannelId::from_outpoint(&OutPoint::new(txid(0x33), 7));
        let high = ChannelId::from_outpoint(&OutPoint::new(txid(0x33), 7 + 65_536));
        assert_eq!(low, high);
    }

    #[test]
    fn display_is_plain_hex() {
        let id = ChannelId::from_bytes([0xab; 32]);
        assert_eq!(id.to_string(), "ab".repeat(32));
    }
}
