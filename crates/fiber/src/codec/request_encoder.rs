use crate::codec::header::HeaderEncoder;
use crate::protocol::{PayloadSize, RequestHeader, SendError};
use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::Encoder;

/// Frames a whole request, head and body, into one buffer.
///
/// The body is written raw right after the blank line that closes the head, so the peer
/// sees the request in a single write.
#[derive(Debug, Default)]
pub struct RequestEncoder {
    header_encoder: HeaderEncoder,
}

impl RequestEncoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Encoder<(RequestHeader, Bytes)> for RequestEncoder {
    type Error = SendError;

    fn encode(&mut self, item: (RequestHeader, Bytes), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (header, body) = item;

        let payload_size = PayloadSize::new_length(body.len() as u64);
        self.header_encoder.encode((header, payload_size), dst)?;

        dst.reserve(body.len());
        dst.put(body);
        Ok(())
    }
}
