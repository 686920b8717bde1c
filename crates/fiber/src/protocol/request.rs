//! HTTP request header handling implementation.
//!
//! [`RequestHeader`] wraps an `http::Request<()>` and knows how the transport rewrites a
//! caller's request before it is framed: `Expect` is dropped, an empty body is announced
//! with `Content-Length: 0`, HTTP/1.1 requests ask the peer to close the connection and a
//! missing `Host` header is derived from the URI.

use std::convert::Into;

use bytes::Bytes;
use http::header::{CONNECTION, CONTENT_LENGTH, EXPECT, HOST};
use http::request::Parts;
use http::{HeaderMap, HeaderValue, Method, Request, Uri, Version};

const ZERO_VALUE: HeaderValue = HeaderValue::from_static("0");
const CLOSE_VALUE: HeaderValue = HeaderValue::from_static("close");

/// Represents an HTTP request header.
#[derive(Debug)]
pub struct RequestHeader {
    inner: Request<()>,
}

impl Clone for RequestHeader {
    fn clone(&self) -> Self {
        let mut builder = Request::builder().method(self.method().clone()).uri(self.uri().clone()).version(self.version());
        if let Some(headers) = builder.headers_mut() {
            headers.clone_from(self.headers());
        }
        // every part comes from an already valid request
        let inner = builder.body(()).unwrap_or_default();
        Self { inner }
    }
}

impl AsRef<Request<()>> for RequestHeader {
    fn as_ref(&self) -> &Request<()> {
        &self.inner
    }
}

impl AsMut<Request<()>> for RequestHeader {
    fn as_mut(&mut self) -> &mut Request<()> {
        &mut self.inner
    }
}

impl RequestHeader {
    /// Splits a full request into its header and its body bytes.
    pub fn split<B: Into<Bytes>>(request: Request<B>) -> (Self, Bytes) {
        let (parts, body) = request.into_parts();
        (Self::from(parts), body.into())
    }

    /// Consumes the header and returns the inner `Request<()>`.
    pub fn into_inner(self) -> Request<()> {
        self.inner
    }

    /// Attaches a body to this header, converting it into a full `Request<T>`.
    pub fn body<T>(self, body: T) -> Request<T> {
        self.inner.map(|_| body)
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// Returns a reference to the request's URI.
    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    /// Returns the request's HTTP version.
    pub fn version(&self) -> Version {
        self.inner.version()
    }

    /// Returns a reference to the request's headers.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    /// Whether the response to this request carries no body bytes.
    pub fn is_head(&self) -> bool {
        self.method() == Method::HEAD
    }

    /// The host part of the URI, empty when the URI is in origin-form.
    pub fn host(&self) -> &str {
        self.uri().host().unwrap_or_default()
    }

    /// The port to connect to: the explicit URI port, otherwise the scheme default.
    pub fn port(&self) -> u16 {
        self.uri().port_u16().unwrap_or_else(|| default_port(self.uri()))
    }

    /// The origin-form request target written on the request line.
    pub fn request_target(&self) -> &str {
        match self.uri().path_and_query() {
            Some(path_and_query) if !path_and_query.as_str().is_empty() => path_and_query.as_str(),
            _ => "/",
        }
    }

    /// Applies the rewrites that happen before the request is handed to the socket.
    ///
    /// `body_len` is the number of body bytes that will follow the head.
    pub fn prepare(&mut self, body_len: usize) {
        self.headers_mut().remove(EXPECT);

        if body_len == 0 {
            self.headers_mut().insert(CONTENT_LENGTH, ZERO_VALUE);
        }

        if self.version() == Version::HTTP_11 && !self.headers().contains_key(CONNECTION) {
            self.headers_mut().insert(CONNECTION, CLOSE_VALUE);
        }

        if !self.headers().contains_key(HOST) {
            if let Some(value) = self.host_value() {
                self.headers_mut().insert(HOST, value);
            }
        }
    }

    fn host_value(&self) -> Option<HeaderValue> {
        let host = self.uri().host()?;
        let value = match self.uri().port_u16() {
            Some(port) if port != default_port(self.uri()) => format!("{host}:{port}"),
            _ => host.to_string(),
        };
        HeaderValue::from_str(&value).ok()
    }
}

fn default_port(uri: &Uri) -> u16 {
    match uri.scheme_str() {
        Some(scheme) if scheme.eq_ignore_ascii_case("https") => 443,
        _ => 80,
    }
}

/// Converts request parts into a RequestHeader.
impl From<Parts> for RequestHeader {
    #[inline]
    fn from(parts: Parts) -> Self {
        Self { inner: Request::from_parts(parts, ()) }
    }
}

/// Converts a bodyless request into a RequestHeader.
impl From<Request<()>> for RequestHeader {
    #[inline]
    fn from(inner: Request<()>) -> Self {
        Self { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(request: Request<()>) -> RequestHeader {
        RequestHeader::from(request)
    }

    #[test]
    fn prepare_empty_body() {
        let mut header = header(
            Request::get("http://example.com/index.html?a=1").header(EXPECT, "100-continue").body(()).unwrap(),
        );
        header.prepare(0);

        assert!(header.headers().get(EXPECT).is_none());
        assert_eq!(header.headers().get(CONTENT_LENGTH), Some(&HeaderValue::from_static("0")));
        assert_eq!(header.headers().get(CONNECTION), Some(&HeaderValue::from_static("close")));
        assert_eq!(header.headers().get(HOST), Some(&HeaderValue::from_static("example.com")));
        assert_eq!(header.request_target(), "/index.html?a=1");
    }

    #[test]
    fn prepare_keeps_caller_connection_and_host() {
        let mut header = header(
            Request::post("http://example.com:8080/")
                .header(CONNECTION, "keep-alive")
                .header(HOST, "virtual.example")
                .body(())
                .unwrap(),
        );
        header.prepare(3);

        assert!(header.headers().get(CONTENT_LENGTH).is_none());
        assert_eq!(header.headers().get(CONNECTION), Some(&HeaderValue::from_static("keep-alive")));
        assert_eq!(header.headers().get(HOST), Some(&HeaderValue::from_static("virtual.example")));
    }

    #[test]
    fn prepare_http_10_has_no_connection_close() {
        let mut header = header(Request::get("http://example.com:8080/").version(Version::HTTP_10).body(()).unwrap());
        header.prepare(0);

        assert!(header.headers().get(CONNECTION).is_none());
        assert_eq!(header.headers().get(HOST), Some(&HeaderValue::from_static("example.com:8080")));
    }

    #[test]
    fn ports_and_targets() {
        assert_eq!(header(Request::get("http://example.com").body(()).unwrap()).port(), 80);
        assert_eq!(header(Request::get("https://example.com").body(()).unwrap()).port(), 443);
        assert_eq!(header(Request::get("http://example.com:81").body(()).unwrap()).port(), 81);
        assert_eq!(header(Request::get("http://example.com").body(()).unwrap()).request_target(), "/");
    }

    #[test]
    fn clone_keeps_every_part() {
        let header = header(
            Request::put("http://example.com/a").version(Version::HTTP_10).header("x-a", "1").header("x-a", "2").body(()).unwrap(),
        );
        let cloned = header.clone();

        assert_eq!(cloned.method(), &Method::PUT);
        assert_eq!(cloned.uri(), header.uri());
        assert_eq!(cloned.version(), Version::HTTP_10);
        assert_eq!(cloned.headers().get_all("x-a").iter().count(), 2);
    }
}
