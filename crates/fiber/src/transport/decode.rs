//! Transparent inflating of `gzip` and `deflate` response bodies.

use std::io::{self, Read};

use bytes::Bytes;
use flate2::read::{DeflateDecoder, MultiGzDecoder, ZlibDecoder};
use http::header::{CONTENT_ENCODING, CONTENT_LENGTH};
use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::protocol::ResponseHead;

const MAX_DECODE_PREALLOC: usize = 256 * 1024;

pub static X_ENCODED_CONTENT_ENCODING: HeaderName = HeaderName::from_static("x-encoded-content-encoding");
pub static X_ENCODED_CONTENT_LENGTH: HeaderName = HeaderName::from_static("x-encoded-content-length");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContentEncoding {
    Gzip,
    Deflate,
}

impl ContentEncoding {
    /// Reads the first `Content-Encoding` value, `None` for anything but gzip or deflate.
    pub(crate) fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(CONTENT_ENCODING)?.to_str().ok()?.trim();
        if value.eq_ignore_ascii_case("gzip") {
            Some(Self::Gzip)
        } else if value.eq_ignore_ascii_case("deflate") {
            Some(Self::Deflate)
        } else {
            None
        }
    }

    /// Inflates `encoded` in full.
    ///
    /// The inflated size is not bounded, a small body that expands a lot is held in memory
    /// as a whole. Only the up front allocation is capped.
    pub(crate) fn decode(self, encoded: &[u8]) -> io::Result<Bytes> {
        let mut decoded = Vec::with_capacity(encoded.len().saturating_mul(2).min(MAX_DECODE_PREALLOC));
        match self {
            Self::Gzip => {
                MultiGzDecoder::new(encoded).read_to_end(&mut decoded)?;
            }
            Self::Deflate => {
                // zlib wrapped is what the name means, some servers send a raw stream
                if ZlibDecoder::new(encoded).read_to_end(&mut decoded).is_err() {
                    decoded.clear();
                    DeflateDecoder::new(encoded).read_to_end(&mut decoded)?;
                }
            }
        }
        Ok(Bytes::from(decoded))
    }
}

/// Inflates `body` when `head` announces a supported `Content-Encoding`.
///
/// The original `Content-Encoding` and `Content-Length` move to `X-Encoded-*` headers and
/// `Content-Length` is set to the decoded size, or removed when that size is zero.
///
/// An empty body, as for `HEAD` or `204`, is never inflated; only its headers are renamed.
pub(crate) fn decode_response(head: &mut ResponseHead, body: Bytes) -> io::Result<Bytes> {
    let Some(encoding) = ContentEncoding::from_headers(head.headers()) else {
        return Ok(body);
    };

    let decoded = if body.is_empty() {
        body
    } else {
        let decoded = encoding.decode(&body)?;
        debug!(?encoding, encoded = body.len(), decoded = decoded.len(), "decoded response body");
        decoded
    };

    let headers = head.headers_mut();
    move_header(headers, &CONTENT_ENCODING, &X_ENCODED_CONTENT_ENCODING);

    if headers.contains_key(CONTENT_LENGTH) {
        move_header(headers, &CONTENT_LENGTH, &X_ENCODED_CONTENT_LENGTH);
        if !decoded.is_empty() {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(decoded.len()));
        }
    }

    Ok(decoded)
}

fn move_header(headers: &mut HeaderMap, from: &HeaderName, to: &HeaderName) {
    let values: Vec<HeaderValue> = headers.get_all(from).iter().cloned().collect();
    headers.remove(from);
    for value in values {
        headers.append(to.clone(), value);
    }
}
