//! Collaborators the transport suspends on before it has a socket
//!
//! - [`Resolver`]: turns a host name into an IP address
//! - [`Connector`]: opens a byte stream to a socket address
//!
//! Both are traits so tests and embedders can replace DNS and the network with fixtures.
//! [`DnsResolver`] and [`TcpConnector`] are the tokio backed defaults.

use std::io;
use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::trace;

/// Host name resolution.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Looks up `host`. `Ok(None)` means the name has no address.
    async fn resolve(&self, host: &str) -> io::Result<Option<IpAddr>>;
}

/// Opens the socket a single request is sent over.
#[async_trait]
pub trait Connector: Send + Sync {
    type Io: AsyncRead + AsyncWrite + Unpin + Send;

    async fn connect(&self, addr: SocketAddr) -> io::Result<Self::Io>;
}

/// Resolves through the system resolver, via `tokio::net::lookup_host`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsResolver;

#[async_trait]
impl Resolver for DnsResolver {
    async fn resolve(&self, host: &str) -> io::Result<Option<IpAddr>> {
        // an IP literal needs no lookup
        if let Ok(ip) = host.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>() {
            return Ok(Some(ip));
        }

        let mut addrs = tokio::net::lookup_host((host, 0)).await?;
        let ip = addrs.next().map(|addr| addr.ip());
        trace!(host, ip = ?ip, "resolved host");
        Ok(ip)
    }
}

/// Plain TCP connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    type Io = TcpStream;

    async fn connect(&self, addr: SocketAddr) -> io::Result<Self::Io> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}
