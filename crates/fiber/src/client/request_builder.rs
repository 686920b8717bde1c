use std::time::Duration;

use bytes::Bytes;
use http::{HeaderName, HeaderValue, Method, Request, Response};
use tracing::debug;

use crate::client::Client;
use crate::connector::{Connector, Resolver};
use crate::protocol::{RequestHeader, TransportError};
use crate::transport::{ResponseBody, SendOptions, TransferStats};

/// A request being put together by a [`Client`].
///
/// The URI is resolved against the client's base URI up front. The client's default
/// headers are added on [`send`](RequestBuilder::send) for every name the request doesn't set.
#[derive(Debug)]
#[must_use = "a request does nothing until it is sent"]
pub struct RequestBuilder<'a, R, C> {
    client: &'a Client<R, C>,
    request: Request<Bytes>,
    options: SendOptions,
    error: Option<http::Error>,
}

impl<'a, R, C> RequestBuilder<'a, R, C>
where
    R: Resolver,
    C: Connector,
{
    pub(crate) fn new(client: &'a Client<R, C>, method: Method, uri: &str) -> Self {
        let config = client.config();

        let mut request = Request::new(Bytes::new());
        *request.method_mut() = method;

        let error = match config.resolve_uri(uri) {
            Ok(uri) => {
                *request.uri_mut() = uri;
                None
            }
            Err(e) => Some(e),
        };

        Self { client, request, options: config.send_options(), error }
    }

    /// Appends a header, replacing any client default of the same name.
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        if self.error.is_some() {
            return self;
        }

        let name = HeaderName::try_from(key).map_err(Into::into);
        let value = HeaderValue::try_from(value).map_err(Into::into);
        match (name, value) {
            (Ok(name), Ok(value)) => {
                self.request.headers_mut().append(name, value);
            }
            (Err(e), _) | (_, Err(e)) => self.error = Some(e),
        }
        self
    }

    pub fn body<B: Into<Bytes>>(mut self, body: B) -> Self {
        *self.request.body_mut() = body.into();
        self
    }

    /// Replaces the options seeded from the client configuration.
    pub fn options(mut self, options: SendOptions) -> Self {
        self.options = options;
        self
    }

    /// Sends the request through the client's transport.
    ///
    /// # Errors
    ///
    /// [`TransportError::ClientProtocol`] if the URI or a header given to the builder was
    /// invalid, otherwise whatever [`Transport::send`](crate::transport::Transport::send) fails with.
    /// The `on_stats` hook sees the builder error too, with a zero transfer time.
    pub async fn send(self) -> Result<Response<ResponseBody>, TransportError> {
        let Self { client, mut request, options, error } = self;

        if let Some(e) = error {
            let (header, _) = RequestHeader::split(request);
            let result = Err(TransportError::client_protocol_with(format!("invalid request to '{}'", header.uri()), &header, e));
            if let Some(on_stats) = options.on_stats {
                on_stats(&TransferStats::new(&header, &result, Duration::ZERO));
            }
            return result;
        }

        let headers = request.headers_mut();
        for name in client.config().headers().keys() {
            if !headers.contains_key(name) {
                for value in client.config().headers().get_all(name) {
                    headers.append(name.clone(), value.clone());
                }
            }
        }

        debug!(method = %request.method(), uri = %request.uri(), "sending request");
        client.send(request, options).await
    }
}
