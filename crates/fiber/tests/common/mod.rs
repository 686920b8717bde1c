#![allow(dead_code, reason = "each test binary uses a different part of the fixtures")]

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use micro_fiber::connector::{Connector, Resolver};
use micro_fiber::transport::Transport;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// In-memory socket: reads come from a canned response, writes are recorded.
#[derive(Clone)]
pub struct MockIo {
    read_data: Arc<Vec<u8>>,
    read_pos: usize,
    written: Arc<Mutex<Vec<u8>>>,
}

impl MockIo {
    pub fn new(read_data: impl Into<Vec<u8>>) -> Self {
        Self { read_data: Arc::new(read_data.into()), read_pos: 0, written: Arc::default() }
    }

    pub fn written(&self) -> String {
        String::from_utf8_lossy(&self.written.lock().unwrap()).into_owned()
    }
}

impl AsyncRead for MockIo {
    fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let remaining = &self.read_data[self.read_pos..];
        let amt = remaining.len().min(buf.remaining());
        buf.put_slice(&remaining[..amt]);
        self.read_pos += amt;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockIo {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        self.written.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Resolves every host to one fixed address.
#[derive(Debug, Clone, Copy)]
pub struct StaticResolver(pub IpAddr);

impl Default for StaticResolver {
    fn default() -> Self {
        Self(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }
}

#[async_trait]
impl Resolver for StaticResolver {
    async fn resolve(&self, _host: &str) -> io::Result<Option<IpAddr>> {
        Ok(Some(self.0))
    }
}

/// Hands out clones of one [`MockIo`] and remembers where it was asked to connect.
#[derive(Clone)]
pub struct MockConnector {
    io: MockIo,
    addrs: Arc<Mutex<Vec<SocketAddr>>>,
}

impl MockConnector {
    pub fn new(response: impl Into<Vec<u8>>) -> Self {
        Self { io: MockIo::new(response), addrs: Arc::default() }
    }

    /// Everything the transport wrote to the socket.
    pub fn written(&self) -> String {
        self.io.written()
    }

    pub fn addrs(&self) -> Vec<SocketAddr> {
        self.addrs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Io = MockIo;

    async fn connect(&self, addr: SocketAddr) -> io::Result<Self::Io> {
        self.addrs.lock().unwrap().push(addr);
        Ok(self.io.clone())
    }
}

/// A transport answering every request with `response`, plus the connector to inspect it.
pub fn mock_transport(response: impl Into<Vec<u8>>) -> (Transport<StaticResolver, MockConnector>, MockConnector) {
    let connector = MockConnector::new(response);
    (Transport::with_parts(StaticResolver::default(), connector.clone()), connector)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::TRACE).try_init();
}
