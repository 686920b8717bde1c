//! HTTP header processing module
//!
//! - [`HeaderDecoder`]: Decodes response heads from raw bytes and determines the payload
//!   size they announce
//! - [`HeaderEncoder`]: Encodes request heads to bytes

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub use header_encoder::HeaderEncoder;
