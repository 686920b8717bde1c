//! HTTP body handling module for decoding response payloads
//!
//! - [`LengthDecoder`](length_decoder::LengthDecoder): Processes fixed-length payloads
//! - [`PayloadDecoder`]: Chooses between a fixed-length payload and no payload at all
//!
//! Request bodies are already in memory and are written right after the request head,
//! so they need no encoder of their own.

mod length_decoder;
mod payload_decoder;

pub use payload_decoder::PayloadDecoder;
