//! HTTP response header handling implementation.
//!
//! The decoded status line and headers are kept in an `http::Response<()>`. The reason
//! phrase sent by the peer has no slot in `http::Response`, it travels in the response
//! extensions as a [`ReasonPhrase`].

use http::Response;

/// Type alias for HTTP response headers.
///
/// The body is attached once it has been read and, if requested, drained into a sink.
pub type ResponseHead = Response<()>;

/// The reason phrase of the status line, exactly as the peer sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonPhrase(String);

impl ReasonPhrase {
    /// Returns `None` for an empty phrase.
    pub fn new<S: Into<String>>(phrase: S) -> Option<Self> {
        let phrase = phrase.into();
        if phrase.is_empty() { None } else { Some(Self(phrase)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Access to the reason phrase carried in a response's extensions.
pub trait ReasonPhraseExt {
    fn reason_phrase(&self) -> Option<&str>;
}

impl<T> ReasonPhraseExt for Response<T> {
    fn reason_phrase(&self) -> Option<&str> {
        self.extensions().get::<ReasonPhrase>().map(ReasonPhrase::as_str)
    }
}
