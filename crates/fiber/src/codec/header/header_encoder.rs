//! HTTP header encoder implementation for serializing HTTP request heads
//!
//! This module writes the request line followed by every header field, one line per
//! value so multi-valued headers keep their declaration order, and the blank line that
//! ends the head.

use crate::protocol::{PayloadSize, RequestHeader, SendError};

use bytes::{BufMut, BytesMut};

use http::{header, HeaderValue, Version};
use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;
use tracing::error;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Encoder for HTTP request heads implementing the [`Encoder`] trait.
///
/// The `Content-Length` header is set from the [`PayloadSize`], an empty payload is
/// always announced as `Content-Length: 0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl Encoder<(RequestHeader, PayloadSize)> for HeaderEncoder {
    type Error = SendError;

    /// Encodes the request head into the provided bytes buffer.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - HTTP version is not HTTP/1.0 or HTTP/1.1
    /// - Writing to buffer fails
    fn encode(&mut self, item: (RequestHeader, PayloadSize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (mut header, payload_size) = item;

        let version = match header.version() {
            Version::HTTP_10 => "HTTP/1.0",
            Version::HTTP_11 => "HTTP/1.1",
            v => {
                error!(http_version = ?v, "unsupported http version");
                return Err(SendError::unsupported_version(format!("{v:?}")));
            }
        };

        dst.reserve(INIT_HEADER_SIZE);
        write!(FastWrite(dst), "{} {} {}\r\n", header.method().as_str(), header.request_target(), version)?;

        match payload_size {
            PayloadSize::Length(n) => {
                header.headers_mut().insert(header::CONTENT_LENGTH, n.into());
            }
            PayloadSize::Empty => {
                const ZERO_VALUE: HeaderValue = HeaderValue::from_static("0");
                header.headers_mut().insert(header::CONTENT_LENGTH, ZERO_VALUE);
            }
        }

        // HeaderMap iterates every value of a name, in insertion order
        for (header_name, header_value) in header.headers() {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// Fast writer implementation for writing to BytesMut.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
