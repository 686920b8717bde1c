use crate::codec::{RequestEncoder, ResponseDecoder};
use crate::protocol::{Message, ParseError, PayloadSize, RequestHeader, ResponseHead, SendError};
use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Client side codec for one request/response exchange on a socket.
///
/// Wrap the socket in a `tokio_util::codec::Framed` with this codec, `send` the request,
/// then poll the stream for the response head and payload.
#[derive(Debug, Default)]
pub struct ClientCodec {
    encoder: RequestEncoder,
    decoder: ResponseDecoder,
}

impl ClientCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// A codec whose decoder expects no payload after the response head.
    pub fn for_head() -> Self {
        Self { encoder: RequestEncoder::new(), decoder: ResponseDecoder::for_head() }
    }

    /// Picks the decoder matching the method of `header`.
    pub fn for_request(header: &RequestHeader) -> Self {
        if header.is_head() { Self::for_head() } else { Self::new() }
    }

    /// Whether the response head has been decoded and payload items are expected next.
    pub fn in_payload(&self) -> bool {
        self.decoder.in_payload()
    }
}

impl Encoder<(RequestHeader, Bytes)> for ClientCodec {
    type Error = SendError;

    fn encode(&mut self, item: (RequestHeader, Bytes), dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.encoder.encode(item, dst)
    }
}

impl Decoder for ClientCodec {
    type Item = Message<(ResponseHead, PayloadSize)>;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.decoder.decode(src)
    }
}
