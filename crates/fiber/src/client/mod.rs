//! A small client facade over [`Transport`](crate::transport::Transport)
//!
//! [`Client`] adds what a single [`Transport::send`](crate::transport::Transport::send)
//! call doesn't know about: a base URI relative targets resolve against, headers sent
//! with every request, and default [`SendOptions`](crate::transport::SendOptions).
//!
//! ```no_run
//! use micro_fiber::client::Client;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::builder()
//!     .base_uri("http://localhost:8080/api/")
//!     .default_header("user-agent", "micro-fiber")
//!     .build()?;
//!
//! let mut response = client.get("status").send().await?;
//! println!("{}: {:?}", response.status(), response.body_mut().bytes().await?);
//! # Ok(())
//! # }
//! ```

mod config;
mod http_client;
mod request_builder;

pub use config::{ClientBuilder, ClientConfig};
pub use http_client::Client;
pub use request_builder::RequestBuilder;
