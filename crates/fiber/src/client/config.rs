use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue, Uri};

use crate::client::Client;
use crate::connector::{Connector, DnsResolver, Resolver, TcpConnector};
use crate::transport::{SendOptions, Transport};

/// Settings shared by every request of a [`Client`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    base_uri: Option<Uri>,
    headers: HeaderMap,
    decode_content: bool,
    delay: Option<Duration>,
}

impl ClientConfig {
    /// The URI relative request targets are resolved against.
    pub fn base_uri(&self) -> Option<&Uri> {
        self.base_uri.as_ref()
    }

    /// Headers added to every request built by the client unless the request sets them.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn decode_content(&self) -> bool {
        self.decode_content
    }

    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }

    /// Fresh per call options seeded with the client wide defaults.
    pub fn send_options(&self) -> SendOptions {
        let options = SendOptions::new().decode_content(self.decode_content);
        match self.delay {
            Some(delay) => options.delay(delay),
            None => options,
        }
    }

    /// Resolves `reference` against the base URI.
    ///
    /// An absolute reference, or any reference when there is no usable base, is parsed as is.
    /// Otherwise scheme and authority come from the base, an absolute path replaces the
    /// base path, a relative one replaces its last segment, and the query is the reference's.
    pub fn resolve_uri(&self, reference: &str) -> Result<Uri, http::Error> {
        let base = match &self.base_uri {
            Some(base) if base.authority().is_some() && !has_scheme(reference) => base,
            _ => return Ok(Uri::try_from(reference)?),
        };

        let reference = reference.split('#').next().unwrap_or_default();
        let (path, query) = match reference.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (reference, None),
        };

        let mut resolved = String::with_capacity(base.to_string().len() + reference.len());
        resolved.push_str(base.scheme_str().unwrap_or("http"));
        resolved.push_str("://");
        if let Some(authority) = base.authority() {
            resolved.push_str(authority.as_str());
        }

        if path.starts_with('/') {
            resolved.push_str(path);
        } else if path.is_empty() {
            resolved.push_str(base.path());
        } else {
            let base_path = base.path();
            let directory = base_path.rfind('/').map_or("/", |idx| &base_path[..=idx]);
            resolved.push_str(directory);
            resolved.push_str(path);
        }

        match query {
            Some(query) => {
                resolved.push('?');
                resolved.push_str(query);
            }
            None if path.is_empty() => {
                if let Some(query) = base.query() {
                    resolved.push('?');
                    resolved.push_str(query);
                }
            }
            None => {}
        }

        Ok(Uri::try_from(resolved)?)
    }
}

/// Whether `reference` starts with a scheme, i.e. a `:` comes before any `/`, `?` or `#`.
fn has_scheme(reference: &str) -> bool {
    let end = reference.find(['/', '?', '#']).unwrap_or(reference.len());
    match reference[..end].split_once(':') {
        Some((scheme, _)) => {
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Builds a [`Client`].
///
/// Invalid input is kept until [`build`](ClientBuilder::build), which reports the first
/// error, the way `http::request::Builder` does.
#[derive(Debug)]
pub struct ClientBuilder<R = DnsResolver, C = TcpConnector> {
    config: Result<ClientConfig, http::Error>,
    resolver: R,
    connector: C,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self { config: Ok(ClientConfig::default()), resolver: DnsResolver, connector: TcpConnector }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, C> ClientBuilder<R, C> {
    #[must_use]
    pub fn base_uri<U>(self, uri: U) -> Self
    where
        Uri: TryFrom<U>,
        <Uri as TryFrom<U>>::Error: Into<http::Error>,
    {
        self.and_then(|mut config| {
            config.base_uri = Some(Uri::try_from(uri).map_err(Into::into)?);
            Ok(config)
        })
    }

    #[must_use]
    pub fn default_header<K, V>(self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        self.and_then(|mut config| {
            let name = HeaderName::try_from(key).map_err(Into::into)?;
            let value = HeaderValue::try_from(value).map_err(Into::into)?;
            config.headers.append(name, value);
            Ok(config)
        })
    }

    #[must_use]
    pub fn decode_content(self, decode_content: bool) -> Self {
        self.and_then(|mut config| {
            config.decode_content = decode_content;
            Ok(config)
        })
    }

    #[must_use]
    pub fn delay(self, delay: Duration) -> Self {
        self.and_then(|mut config| {
            config.delay = Some(delay);
            Ok(config)
        })
    }

    pub fn resolver<R2>(self, resolver: R2) -> ClientBuilder<R2, C> {
        ClientBuilder { config: self.config, resolver, connector: self.connector }
    }

    pub fn connector<C2>(self, connector: C2) -> ClientBuilder<R, C2> {
        ClientBuilder { config: self.config, resolver: self.resolver, connector }
    }

    fn and_then<F>(self, f: F) -> Self
    where
        F: FnOnce(ClientConfig) -> Result<ClientConfig, http::Error>,
    {
        Self { config: self.config.and_then(f), ..self }
    }
}

impl<R, C> ClientBuilder<R, C>
where
    R: Resolver,
    C: Connector,
{
    /// # Errors
    ///
    /// The first invalid base URI or default header given to the builder.
    pub fn build(self) -> Result<Client<R, C>, http::Error> {
        let config = self.config?;
        Ok(Client::from_parts(Transport::with_parts(self.resolver, self.connector), config))
    }
}
