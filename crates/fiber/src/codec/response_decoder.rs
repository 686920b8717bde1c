//! HTTP response decoder module
//!
//! [`ResponseDecoder`] first waits for the complete response head, then yields the
//! payload in chunks until exactly `Content-Length` bytes were seen.

use crate::codec::body::PayloadDecoder;
use crate::codec::header::HeaderDecoder;
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, ResponseHead};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// A decoder for HTTP responses that handles both head and payload
///
/// # State Machine
///
/// The decoder maintains its state through the `payload_decoder` field:
/// - `None`: Currently parsing the head
/// - `Some(PayloadDecoder)`: Currently parsing payload
#[derive(Debug, Default)]
pub struct ResponseDecoder {
    header_decoder: HeaderDecoder,
    payload_decoder: Option<PayloadDecoder>,
}

impl ResponseDecoder {
    /// Creates a decoder for the response to any method but `HEAD`
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder for the response to a `HEAD` request
    pub fn for_head() -> Self {
        Self { header_decoder: HeaderDecoder::for_head(), payload_decoder: None }
    }

    /// Whether the head has been decoded and payload items are expected next.
    pub fn in_payload(&self) -> bool {
        self.payload_decoder.is_some()
    }
}

impl Decoder for ResponseDecoder {
    type Item = Message<(ResponseHead, PayloadSize)>;
    type Error = ParseError;

    /// Attempts to decode an HTTP response from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Message::Header(_)))`: Successfully decoded the response head
    /// - `Ok(Some(Message::Payload(_)))`: Successfully decoded a payload chunk or the end of it
    /// - `Ok(None)`: Need more data to proceed
    /// - `Err(_)`: Encountered a parsing error
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let message = match payload_decoder.decode(src)? {
                Some(item @ PayloadItem::Chunk(_)) => Some(Message::Payload(item)),
                Some(item @ PayloadItem::Eof) => {
                    self.payload_decoder.take();
                    Some(Message::Payload(item))
                }
                None => None,
            };

            return Ok(message);
        }

        let message = match self.header_decoder.decode(src)? {
            Some((head, payload_size)) => {
                self.payload_decoder = Some(payload_size.into());
                Some(Message::Header((head, payload_size)))
            }
            None => None,
        };

        Ok(message)
    }
}
