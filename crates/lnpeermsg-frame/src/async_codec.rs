use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, encode_frame, Frame, DEFAULT_MAX_PAYLOAD};
use crate::error::FrameError;

/// `tokio_util` codec for RPC envelopes.
#[derive(Debug, Clone)]
pub struct EnvelopeCodec {
    max_payload_size: usize,
}

impl EnvelopeCodec {
    pub fn new(max_payload_size: usize) -> Self {
        Self { max_payload_size }
    }
}

impl Default for EnvelopeCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAYLOAD)
    }
}

impl Decoder for EnvelopeCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        decode_frame(src, self.max_payload_size)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => Err(FrameError::Truncated {
                buffered: src.len(),
            }),
        }
    }
}

impl Encoder<Frame> for EnvelopeCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), FrameError> {
        if item.payload.len() > self.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: item.payload.len(),
                max: self.max_payload_size,
            });
        }
        encode_frame(item.kind, &item.payload, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{CUSTOM_EVENT, SEND_CUSTOM};

    #[test]
    fn codec_roundtrip() {
        let mut codec = EnvelopeCodec::default();
        let mut buf = BytesMut::new();
        codec
            .encode(Frame::new(SEND_CUSTOM, b"{}".to_vec()), &mut buf)
            .unwrap();
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame.kind, SEND_CUSTOM);
        assert!(buf.is_empty());
    }

    #[test]
    fn eof_with_leftover_bytes_is_truncation() {
        let mut codec = EnvelopeCodec::default();
        let mut buf = BytesMut::new();
        codec
            .encode(Frame::new(CUSTOM_EVENT, b"abc".to_vec()), &mut buf)
            .unwrap();
        buf.truncate(buf.len() - 1);
        assert!(matches!(
            codec.decode_eof(&mut buf),
            Err(FrameError::Truncated { buffered: 10 })
        ));
        assert!(codec.decode_eof(&mut BytesMut::new()).unwrap().is_none());
    }

    #[test]
    fn encoder_enforces_limit() {
        let mut codec = EnvelopeCodec::new(2);
        let mut buf = BytesMut::new();
        assert!(matches!(
            codec.encode(Frame::new(SEND_CUSTOM, b"abc".to_vec()), &mut buf),
            Err(FrameError::PayloadTooLarge { .. })
        ));
    }
}
