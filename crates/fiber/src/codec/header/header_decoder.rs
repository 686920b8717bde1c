//! HTTP header decoder implementation for parsing HTTP response heads
//!
//! This module scans the read buffer for the `CRLF CRLF` terminator and parses the
//! status line and header fields that precede it.
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum header size: 8KB
//! - Only supports HTTP/1.0 and HTTP/1.1
//!
//! # Payload framing
//!
//! A response is only accepted with an explicit `Content-Length`. Chunked transfer coding
//! and close-delimited bodies are rejected instead of being guessed at.

use bytes::BytesMut;
use http::{HeaderName, HeaderValue, Response, StatusCode};
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;

use crate::protocol::{ParseError, PayloadSize, ReasonPhrase, ResponseHead};

/// Maximum number of headers allowed in a response
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire header section
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Decoder for HTTP response heads implementing the [`Decoder`] trait.
///
/// The decoder parses raw bytes into a [`ResponseHead`] and the [`PayloadSize`] announced
/// by its `Content-Length`. The response to a `HEAD` request never carries body bytes, so
/// for those the payload size is always empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderDecoder {
    head_request: bool,
}

impl HeaderDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A decoder for the response to a `HEAD` request.
    pub fn for_head() -> Self {
        Self { head_request: true }
    }
}

impl Decoder for HeaderDecoder {
    type Item = (ResponseHead, PayloadSize);
    type Error = ParseError;

    /// Attempts to decode an HTTP response head from the provided bytes buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((head, payload_size)))` if a complete head was parsed, the head bytes
    ///   are split off `src`
    /// - `Ok(None)` if the terminator has not arrived yet
    /// - `Err(ParseError)` if parsing failed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Minimum valid response head is "HTTP/1.1 200\r\n\r\n"
        if src.len() < 16 {
            return Ok(None);
        }

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let mut resp = httparse::Response::new(&mut headers);

        let parsed_result = resp.parse(src).map_err(|e| match e {
            Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
            Error::Status | Error::Version | Error::Token => ParseError::invalid_status_line(e.to_string()),
            e => ParseError::invalid_header(e.to_string()),
        });

        match parsed_result? {
            Status::Complete(body_offset) => {
                trace!(head_size = body_offset, "parsed response head");
                ensure!(body_offset <= MAX_HEADER_BYTES, ParseError::too_large_header(body_offset, MAX_HEADER_BYTES));

                let version = match resp.version {
                    Some(0) => http::Version::HTTP_10,
                    Some(1) => http::Version::HTTP_11,
                    _ => return Err(ParseError::InvalidVersion(resp.version)),
                };

                let code = resp.code.ok_or_else(|| ParseError::invalid_status_line("missing status code"))?;
                let status = StatusCode::from_u16(code).map_err(|e| ParseError::invalid_status_line(e.to_string()))?;

                let mut head = Response::new(());
                *head.status_mut() = status;
                *head.version_mut() = version;

                if let Some(reason) = resp.reason.and_then(ReasonPhrase::new) {
                    head.extensions_mut().insert(reason);
                }

                let header_map = head.headers_mut();
                header_map.reserve(resp.headers.len());
                for header in resp.headers.iter() {
                    let name = HeaderName::from_bytes(header.name.as_bytes()).map_err(|e| ParseError::invalid_header(e.to_string()))?;
                    let value = HeaderValue::from_bytes(header.value).map_err(|e| ParseError::invalid_header(e.to_string()))?;
                    // repeated names accumulate in arrival order
                    header_map.append(name, value);
                }

                let payload_size = parse_payload(&head, self.head_request)?;

                let _ = src.split_to(body_offset);
                Ok(Some((head, payload_size)))
            }
            // If parsing incomplete, ensure current buffer size does not exceed limit
            Status::Partial => {
                ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
                Ok(None)
            }
        }
    }
}

/// Determines the payload size announced by the response head.
///
/// # Errors
///
/// Returns `ParseError` if:
/// - a `Transfer-Encoding` other than `identity` is present
/// - no `Content-Length` header is present
/// - the `Content-Length` values are not one non-negative integer
fn parse_payload(head: &ResponseHead, head_request: bool) -> Result<PayloadSize, ParseError> {
    if let Some(te_value) = head.headers().get(http::header::TRANSFER_ENCODING) {
        let encoding = te_value.to_str().unwrap_or_default().trim();
        ensure!(encoding.eq_ignore_ascii_case("identity"), ParseError::unsupported_transfer_encoding(encoding));
    }

    let mut values = head.headers().get_all(http::header::CONTENT_LENGTH).iter();
    let first = values.next().ok_or(ParseError::MissingContentLength)?;
    let length = parse_content_length(first)?;
    for other in values {
        ensure!(
            parse_content_length(other)? == length,
            ParseError::invalid_content_length("conflicting content-length values")
        );
    }

    if head_request {
        return Ok(PayloadSize::new_empty());
    }

    Ok(PayloadSize::new_length(length))
}

fn parse_content_length(value: &HeaderValue) -> Result<u64, ParseError> {
    let cl_str = value.to_str().map_err(|_| ParseError::invalid_content_length("value can't to_str"))?;
    cl_str.trim().parse::<u64>().map_err(|_| ParseError::invalid_content_length(format!("value {cl_str} is not u64")))
}
