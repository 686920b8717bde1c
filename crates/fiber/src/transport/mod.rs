//! The HTTP/1.1 transport
//!
//! [`Transport::send`] walks one request through
//! `Resolving → Connecting → Sending → ReadingHeaders → ReadingBody → [Decoding] → [Sinking]`
//! and completes with a response or a [`TransportError`](crate::protocol::TransportError).
//! No step is retried.
//!
//! - [`SendOptions`]: per call settings and hooks
//! - [`ResponseBody`]: the sink or raw stream a response body ends up in
//! - [`TransferStats`]: what the `on_stats` hook observes

mod body;
mod decode;
mod http_transport;
mod options;
mod stats;

pub use body::ResponseBody;
pub use decode::{X_ENCODED_CONTENT_ENCODING, X_ENCODED_CONTENT_LENGTH};
pub use http_transport::Transport;
pub use options::{OnHeaders, OnStats, SendOptions, Sink, SinkIo};
pub use stats::TransferStats;
