//! HTTP codec module for encoding requests and decoding responses
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`RequestEncoder`]: Frames the request head and its body
//!   - Head encoding via the `header` module
//!
//! - Response handling:
//!   - [`ResponseDecoder`]: Decodes the response head, then a `Content-Length` payload
//!   - Head parsing via the `header` module
//!   - Payload decoding via the `body` module
//!
//! - [`ClientCodec`]: Both directions for one exchange, meant for `tokio_util::codec::Framed`
//!
//! # Example
//!
//! ```no_run
//! use micro_fiber::codec::ResponseDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = ResponseDecoder::new();
//! let mut buffer = BytesMut::from(&b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello"[..]);
//! let head = decoder.decode(&mut buffer);
//! let payload = decoder.decode(&mut buffer);
//! ```

mod body;
mod client_codec;
mod header;
mod request_encoder;
mod response_decoder;

pub use client_codec::ClientCodec;
pub use request_encoder::RequestEncoder;
pub use response_decoder::ResponseDecoder;
