//! Core HTTP protocol abstractions.
//!
//! # Architecture
//!
//! - **Message Handling** ([`message`]): what the response decoder yields
//!   - [`Message`]: Represents either headers or payload chunks
//!   - [`PayloadItem`]: Handles individual payload chunks and EOF
//!   - [`PayloadSize`]: Tracks payload size information
//!
//! - **Request Processing** ([`request`]): Request header handling
//!   - [`RequestHeader`]: Wraps HTTP request headers and the pre-send rewrites
//!
//! - **Response Processing** ([`response`]): Response header handling
//!   - [`ResponseHead`]: Type alias for response headers before body attachment
//!   - [`ReasonPhrase`]: The status line's reason phrase
//!
//! - **Error Handling** ([`error`]): Error types
//!   - [`TransportError`]: What a failed send resolves with
//!   - [`ParseError`]: Response decoding errors
//!   - [`SendError`]: Request framing errors

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod request;
pub use request::RequestHeader;

mod response;
pub use response::ReasonPhrase;
pub use response::ReasonPhraseExt;
pub use response::ResponseHead;

mod error;
pub use error::BoxError;
pub use error::ParseError;
pub use error::SendError;
pub use error::TransportError;
