use std::error::Error;
use std::io;

use thiserror::Error;

use crate::protocol::RequestHeader;

/// Boxed error returned by user supplied hooks.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Errors surfaced by [`Transport::send`](crate::transport::Transport::send).
///
/// Every variant carries the head of the request that was in flight, so a failure can be
/// traced back to the call that produced it.
#[derive(Debug, Error)]
pub enum TransportError {
    /// DNS resolution, connect, write, header read or body read failed.
    #[error("{message}")]
    Connect {
        message: String,
        request: Box<RequestHeader>,
        #[source]
        source: Option<BoxError>,
    },

    /// The peer answered with something this transport can't frame.
    #[error("{message}")]
    ClientProtocol {
        message: String,
        request: Box<RequestHeader>,
        #[source]
        source: Option<BoxError>,
    },

    /// The `on_headers` hook rejected the response.
    #[error("{message}: {source}")]
    Request {
        message: String,
        request: Box<RequestHeader>,
        #[source]
        source: BoxError,
    },

    /// The body could not be inflated according to its `Content-Encoding`.
    #[error("{message}: {source}")]
    Decode {
        message: String,
        request: Box<RequestHeader>,
        #[source]
        source: io::Error,
    },
}

impl TransportError {
    pub fn connect<S: ToString>(message: S, request: &RequestHeader) -> Self {
        Self::Connect { message: message.to_string(), request: Box::new(request.clone()), source: None }
    }

    pub fn connect_with<S: ToString, E: Into<BoxError>>(message: S, request: &RequestHeader, source: E) -> Self {
        Self::Connect { message: message.to_string(), request: Box::new(request.clone()), source: Some(source.into()) }
    }

    pub fn client_protocol<S: ToString>(message: S, request: &RequestHeader) -> Self {
        Self::ClientProtocol { message: message.to_string(), request: Box::new(request.clone()), source: None }
    }

    pub fn client_protocol_with<S: ToString, E: Into<BoxError>>(message: S, request: &RequestHeader, source: E) -> Self {
        Self::ClientProtocol { message: message.to_string(), request: Box::new(request.clone()), source: Some(source.into()) }
    }

    pub fn request<S: ToString>(message: S, request: &RequestHeader, source: BoxError) -> Self {
        Self::Request { message: message.to_string(), request: Box::new(request.clone()), source }
    }

    pub fn decode<S: ToString>(message: S, request: &RequestHeader, source: io::Error) -> Self {
        Self::Decode { message: message.to_string(), request: Box::new(request.clone()), source }
    }

    /// The head of the request that failed.
    pub fn request_header(&self) -> &RequestHeader {
        match self {
            Self::Connect { request, .. }
            | Self::ClientProtocol { request, .. }
            | Self::Request { request, .. }
            | Self::Decode { request, .. } => request,
        }
    }

    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect { .. })
    }

    pub fn is_client_protocol(&self) -> bool {
        matches!(self, Self::ClientProtocol { .. })
    }

    pub fn is_request(&self) -> bool {
        matches!(self, Self::Request { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Errors raised while decoding a response off the wire.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("invalid status line: {reason}")]
    InvalidStatusLine { reason: String },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid http version: {0:?}")]
    InvalidVersion(Option<u8>),

    #[error("response without content-length header")]
    MissingContentLength,

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("unsupported transfer-encoding: {encoding}")]
    UnsupportedTransferEncoding { encoding: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_status_line<S: ToString>(str: S) -> Self {
        Self::InvalidStatusLine { reason: str.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn unsupported_transfer_encoding<S: ToString>(str: S) -> Self {
        Self::UnsupportedTransferEncoding { encoding: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// Whether the error comes from the socket rather than from the bytes it produced.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Errors raised while framing a request onto the wire.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("unsupported http version: {version}")]
    UnsupportedVersion { version: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn unsupported_version<S: ToString>(str: S) -> Self {
        Self::UnsupportedVersion { version: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
