//! Decoder for a response payload delimited by `Content-Length`.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::protocol::{ParseError, PayloadItem};

/// Yields the payload in chunks as bytes arrive, then [`PayloadItem::Eof`] once exactly
/// `Content-Length` bytes were handed out. Bytes past the payload stay in the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    remaining: u64,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Self {
        Self { remaining: length }
    }

    /// Bytes still expected before the payload is complete.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl Decoder for LengthDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.remaining == 0 {
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() {
            return Ok(None);
        }

        let take = usize::try_from(self.remaining).map_or(src.len(), |remaining| remaining.min(src.len()));
        let chunk = src.split_to(take).freeze();
        self.remaining -= chunk.len() as u64;

        Ok(Some(PayloadItem::Chunk(chunk)))
    }
}
