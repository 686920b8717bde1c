//! An asynchronous HTTP/1.1 client transport for cooperative tasks
//!
//! This crate sends HTTP/1.1 requests from tasks running on a tokio runtime, one connection
//! per request, and fans their results back in through a FIFO [`channel::Channel`]. Every
//! point where a request waits on the network is an `.await`, so any number of requests can
//! be in flight on a single thread.
//!
//! # Features
//!
//! - Request framing and `Content-Length` delimited response parsing over `tokio_util::codec`
//! - Pluggable name resolution and connection setup through the [`connector::Resolver`] and
//!   [`connector::Connector`] traits
//! - Response bodies drained into memory, a file or any seekable destination
//! - Transparent `gzip` and `deflate` decoding
//! - `on_headers` and `on_stats` hooks
//! - A FIFO channel whose reads suspend while it is empty
//!
//! # Example
//!
//! ```no_run
//! use micro_fiber::channel::Channel;
//! use micro_fiber::client::Client;
//! use tracing::{info, warn, Level};
//! use tracing_subscriber::FmtSubscriber;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
//!     tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
//!
//!     let client = Client::new();
//!     let channel = Channel::new();
//!     let urls = ["http://127.0.0.1:8080/a", "http://127.0.0.1:8080/b"];
//!
//!     for url in urls {
//!         let client = client.clone();
//!         let channel = channel.clone();
//!         tokio::spawn(async move {
//!             let status = client.get(url).send().await.map(|response| response.status());
//!             channel.write((url, status));
//!         });
//!     }
//!
//!     for _ in 0..urls.len() {
//!         match channel.read().await {
//!             (url, Ok(status)) => info!(url, %status, "fetched"),
//!             (url, Err(e)) => warn!(url, cause = %e, "failed"),
//!         }
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - [`transport`]: the request/response state machine, send options and response bodies
//! - [`client`]: base URI, default headers and default options on top of the transport
//! - [`connector`]: name resolution and connection setup
//! - [`codec`]: request encoding and response decoding
//! - [`protocol`]: message types and errors
//! - [`channel`]: fan-in of results from concurrently running tasks
//!
//! # Error Handling
//!
//! - [`protocol::TransportError`]: what a send fails with, carrying the request head
//! - [`protocol::ParseError`]: malformed or unsupported response framing
//! - [`protocol::SendError`]: request framing failures
//!
//! # Limitations
//!
//! - HTTP/1.0 and HTTP/1.1 only, one request per connection
//! - Responses must carry `Content-Length`; chunked transfer coding is rejected
//! - No TLS in [`connector::TcpConnector`]
//! - Maximum header size: 8KB
//! - Maximum number of headers: 64

pub mod channel;
pub mod client;
pub mod codec;
pub mod connector;
pub mod protocol;
pub mod transport;

mod utils;
pub(crate) use utils::ensure;
