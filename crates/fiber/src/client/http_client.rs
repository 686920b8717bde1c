use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, Request, Response};

use crate::client::{ClientBuilder, ClientConfig, RequestBuilder};
use crate::connector::{Connector, DnsResolver, Resolver, TcpConnector};
use crate::protocol::TransportError;
use crate::transport::{ResponseBody, SendOptions, Transport};

/// A handle for sending requests through one shared [`Transport`].
///
/// Cloning is cheap; clones share the transport and the configuration, so a client can be
/// handed to any number of spawned tasks.
pub struct Client<R = DnsResolver, C = TcpConnector> {
    transport: Arc<Transport<R, C>>,
    config: Arc<ClientConfig>,
}

impl Client {
    /// A client without base URI or default headers.
    pub fn new() -> Self {
        Self::from_parts(Transport::new(), ClientConfig::default())
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, C> Client<R, C>
where
    R: Resolver,
    C: Connector,
{
    pub(crate) fn from_parts(transport: Transport<R, C>, config: ClientConfig) -> Self {
        Self { transport: Arc::new(transport), config: Arc::new(config) }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &Transport<R, C> {
        &self.transport
    }

    /// Starts a request; `uri` may be relative to the configured base URI.
    pub fn request<U: AsRef<str>>(&self, method: Method, uri: U) -> RequestBuilder<'_, R, C> {
        RequestBuilder::new(self, method, uri.as_ref())
    }

    pub fn get<U: AsRef<str>>(&self, uri: U) -> RequestBuilder<'_, R, C> {
        self.request(Method::GET, uri)
    }

    pub fn head<U: AsRef<str>>(&self, uri: U) -> RequestBuilder<'_, R, C> {
        self.request(Method::HEAD, uri)
    }

    pub fn post<U: AsRef<str>>(&self, uri: U) -> RequestBuilder<'_, R, C> {
        self.request(Method::POST, uri)
    }

    /// Sends a prepared request as is, without base URI resolution or default headers.
    ///
    /// # Errors
    ///
    /// See [`Transport::send`].
    pub async fn send<B: Into<Bytes>>(&self, request: Request<B>, options: SendOptions) -> Result<Response<ResponseBody>, TransportError> {
        self.transport.send(request, options).await
    }
}

impl<R, C> Clone for Client<R, C> {
    fn clone(&self) -> Self {
        Self { transport: Arc::clone(&self.transport), config: Arc::clone(&self.config) }
    }
}

impl<R, C> fmt::Debug for Client<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").field("config", &self.config).finish_non_exhaustive()
    }
}
