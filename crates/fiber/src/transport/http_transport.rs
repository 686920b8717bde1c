use std::io::{self, Cursor, SeekFrom};
use std::net::SocketAddr;
use std::time::Instant;

use bytes::{Bytes, BytesMut};
use futures::{SinkExt, StreamExt};
use http::header::CONTENT_LENGTH;
use http::{Request, Response};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio_util::codec::Framed;
use tracing::{debug, trace, warn};

use crate::codec::ClientCodec;
use crate::connector::{Connector, DnsResolver, Resolver, TcpConnector};
use crate::ensure;
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, RequestHeader, ResponseHead, TransportError};
use crate::transport::decode::decode_response;
use crate::transport::{OnHeaders, ResponseBody, SendOptions, Sink, SinkIo, TransferStats};

/// Upper bound of the buffer reserved up front for a body, whatever `Content-Length` claims.
const MAX_PREALLOC: usize = 64 * 1024;

/// An HTTP/1.1 transport that sends each request over its own connection.
///
/// Every step of [`send`](Transport::send) that waits on the outside world, resolving
/// the host, connecting, writing the request and reading the response, is an `.await`,
/// so the calling task yields to others there and nowhere else.
///
/// The transport keeps no per-request state: one instance can be shared by any number
/// of concurrently running tasks.
///
/// # Example
///
/// ```no_run
/// use http::Request;
/// use micro_fiber::transport::{SendOptions, Transport};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = Transport::new();
/// let request = Request::get("http://example.com/").body(bytes::Bytes::new())?;
/// let mut response = transport.send(request, SendOptions::new().decode_content(true)).await?;
/// println!("{} {:?}", response.status(), response.body_mut().bytes().await?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Transport<R = DnsResolver, C = TcpConnector> {
    resolver: R,
    connector: C,
}

impl Transport {
    /// A transport resolving through the system resolver and connecting over plain TCP.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R, C> Transport<R, C>
where
    R: Resolver,
    C: Connector,
{
    pub fn with_parts(resolver: R, connector: C) -> Self {
        Self { resolver, connector }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Sends `request` and resolves with its response.
    ///
    /// The request is rewritten before it is framed: `Expect` is removed, an empty body
    /// gets `Content-Length: 0`, an HTTP/1.1 request without `Connection` gets
    /// `Connection: close` and a missing `Host` is taken from the URI. Any `Content-Length`
    /// the caller set is replaced by the actual body length when the request is framed.
    ///
    /// The response must carry a `Content-Length`; exactly that many bytes are read.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Connect`] if the host doesn't resolve, the connection can't be
    ///   opened, or the request can't be written or its response read in full
    /// - [`TransportError::ClientProtocol`] if the response head is malformed, announces a
    ///   transfer coding, or has no `Content-Length`
    /// - [`TransportError::Decode`] if `decode_content` is set and the body doesn't inflate
    /// - [`TransportError::Request`] if `on_headers` fails or the sink can't be written
    pub async fn send<B: Into<Bytes>>(&self, request: Request<B>, options: SendOptions) -> Result<Response<ResponseBody>, TransportError> {
        let SendOptions { decode_content, sink, stream, on_headers, on_stats, delay } = options;

        if let Some(delay) = delay {
            trace!(?delay, "delay request");
            tokio::time::sleep(delay).await;
        }

        let start = Instant::now();

        let (mut header, body) = RequestHeader::split(request);
        header.prepare(body.len());

        let settings = ResponseSettings { decode_content, sink, stream, on_headers };
        let result = self.transfer(&header, body, settings).await;

        if let Some(on_stats) = on_stats {
            on_stats(&TransferStats::new(&header, &result, start.elapsed()));
        }

        result
    }

    async fn transfer(&self, header: &RequestHeader, body: Bytes, settings: ResponseSettings) -> Result<Response<ResponseBody>, TransportError> {
        let (head, payload) = self.exchange(header, body).await?;
        create_response(header, head, payload, settings).await
    }

    /// Runs one request/response exchange on a fresh connection.
    ///
    /// The connection is owned by this call and closed when it returns, on every path.
    async fn exchange(&self, header: &RequestHeader, body: Bytes) -> Result<(ResponseHead, Bytes), TransportError> {
        let host = header.host();
        ensure!(!host.is_empty(), TransportError::connect(format!("could not resolve host of uri '{}'", header.uri()), header));

        trace!(host, "resolving host");
        let ip = match self.resolver.resolve(host).await {
            Ok(Some(ip)) => ip,
            Ok(None) => {
                warn!(host, "host has no address");
                return Err(TransportError::connect(format!("could not resolve IP address for host '{host}'"), header));
            }
            Err(e) => {
                warn!(host, cause = %e, "failed to resolve host");
                return Err(TransportError::connect_with(format!("could not resolve IP address for host '{host}'"), header, e));
            }
        };

        let addr = SocketAddr::new(ip, header.port());
        trace!(host, %addr, "connecting");
        let io = self.connector.connect(addr).await.map_err(|e| {
            warn!(host, %addr, cause = %e, "failed to connect");
            TransportError::connect_with(format!("could not connect to host '{host}'"), header, e)
        })?;

        let mut framed = Framed::new(io, ClientCodec::for_request(header));

        trace!(host, method = %header.method(), target = header.request_target(), "sending request");
        framed.send((header.clone(), body)).await.map_err(|e| {
            warn!(host, cause = %e, "failed to send request");
            if e.is_io() {
                TransportError::connect_with(format!("could not send request to host '{host}'"), header, e)
            } else {
                TransportError::client_protocol_with(format!("could not frame request to host '{host}'"), header, e)
            }
        })?;

        let (head, payload_size) = match framed.next().await {
            Some(Ok(Message::Header(head))) => head,
            Some(Ok(Message::Payload(_))) => {
                return Err(TransportError::client_protocol(format!("could not read response head from host '{host}'"), header));
            }
            Some(Err(ParseError::MissingContentLength)) => {
                warn!(host, "response without content-length");
                return Err(TransportError::client_protocol(
                    format!("could not read response without Content-Length from host '{host}'"),
                    header,
                ));
            }
            Some(Err(e)) if e.is_io() => {
                warn!(host, cause = %e, "failed to read response");
                return Err(TransportError::connect_with(format!("could not read response from host '{host}'"), header, e));
            }
            Some(Err(e)) => {
                warn!(host, cause = %e, "invalid response");
                return Err(TransportError::client_protocol_with(format!("invalid response from host '{host}'"), header, e));
            }
            None => {
                warn!(host, "connection closed before response head");
                return Err(TransportError::connect(format!("could not read response from host '{host}'"), header));
            }
        };
        trace!(host, status = head.status().as_u16(), content_length = payload_size.len(), "received response head");

        let payload = read_payload(&mut framed, payload_size).await.map_err(|e| {
            warn!(host, cause = ?e, "failed to read response body");
            match e {
                Some(e) => TransportError::connect_with(format!("could not read response body from host '{host}'"), header, e),
                None => TransportError::connect(format!("could not read response body from host '{host}'"), header),
            }
        })?;

        Ok((head, payload))
    }
}

/// Collects the payload items following the head. `Err(None)` means the peer closed early.
async fn read_payload<S>(framed: &mut S, payload_size: PayloadSize) -> Result<Bytes, Option<ParseError>>
where
    S: futures::Stream<Item = Result<Message<(ResponseHead, PayloadSize)>, ParseError>> + Unpin,
{
    let capacity = usize::try_from(payload_size.len()).unwrap_or(usize::MAX).min(MAX_PREALLOC);
    let mut payload = BytesMut::with_capacity(capacity);

    loop {
        match framed.next().await {
            Some(Ok(Message::Payload(PayloadItem::Chunk(bytes)))) => payload.extend_from_slice(&bytes),
            Some(Ok(Message::Payload(PayloadItem::Eof))) => return Ok(payload.freeze()),
            Some(Ok(Message::Header(_))) | None => return Err(None),
            Some(Err(e)) => return Err(Some(e)),
        }
    }
}

struct ResponseSettings {
    decode_content: bool,
    sink: Sink,
    stream: bool,
    on_headers: Option<OnHeaders>,
}

async fn create_response(
    header: &RequestHeader,
    mut head: ResponseHead,
    payload: Bytes,
    settings: ResponseSettings,
) -> Result<Response<ResponseBody>, TransportError> {
    let ResponseSettings { decode_content, sink, stream, on_headers } = settings;

    let payload = if decode_content {
        decode_response(&mut head, payload)
            .map_err(|e| TransportError::decode(format!("could not decode response body from host '{}'", header.host()), header, e))?
    } else {
        payload
    };

    if let Some(on_headers) = on_headers {
        on_headers(&head).map_err(|e| {
            warn!(cause = %e, "on_headers rejected the response");
            TransportError::request("an error was encountered during the on_headers event", header, e)
        })?;
    }

    // HEAD responses have no body to drain
    let body = if header.is_head() || stream {
        ResponseBody::raw(payload)
    } else {
        let content_length = head
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());

        drain(payload, sink, content_length).await.map_err(|e| {
            warn!(cause = %e, "failed to drain response body");
            TransportError::request("could not write response body to sink", header, e.into())
        })?
    };

    let (parts, ()) = head.into_parts();
    Ok(Response::from_parts(parts, body))
}

/// Copies `source` into the sink and rewinds the sink to its start.
///
/// The copy stops after `content_length` bytes when that is positive.
async fn drain(source: Bytes, sink: Sink, content_length: Option<u64>) -> io::Result<ResponseBody> {
    let mut target: Box<dyn SinkIo> = match sink {
        Sink::Temp => Box::new(Cursor::new(Vec::with_capacity(source.len()))),
        Sink::Path(path) => {
            trace!(path = %path.display(), "opening sink file");
            Box::new(OpenOptions::new().read(true).write(true).create(true).truncate(true).open(path).await?)
        }
        Sink::Io(io) => io,
    };

    let mut source = Cursor::new(source);
    let copied = match content_length {
        Some(limit) if limit > 0 => tokio::io::copy(&mut (&mut source).take(limit), &mut target).await?,
        _ => tokio::io::copy(&mut source, &mut target).await?,
    };
    debug!(copied, "drained response body");

    target.flush().await?;
    target.seek(SeekFrom::Start(0)).await?;
    drop(source);

    Ok(ResponseBody::sink(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::MockResolver;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::DuplexStream;

    /// Connector that must never be reached.
    #[derive(Debug, Default)]
    struct CountingConnector {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Connector for CountingConnector {
        type Io = DuplexStream;

        async fn connect(&self, _addr: SocketAddr) -> io::Result<Self::Io> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::from(io::ErrorKind::ConnectionRefused))
        }
    }

    fn request() -> Request<Bytes> {
        Request::get("http://example.com/").body(Bytes::new()).unwrap()
    }

    #[tokio::test]
    async fn unresolved_host_never_connects() {
        let mut resolver = MockResolver::new();
        resolver.expect_resolve().times(1).returning(|_| Ok(None));
        let connector = CountingConnector::default();
        let calls = Arc::clone(&connector.calls);

        let transport = Transport::with_parts(resolver, connector);
        let error = transport.send(request(), SendOptions::new()).await.unwrap_err();

        assert!(error.is_connect());
        assert_eq!(error.to_string(), "could not resolve IP address for host 'example.com'");
        assert_eq!(error.request_header().uri(), "http://example.com/");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn resolver_error_is_connect_error() {
        let mut resolver = MockResolver::new();
        resolver.expect_resolve().times(1).returning(|_| Err(io::Error::other("dns down")));

        let transport = Transport::with_parts(resolver, CountingConnector::default());
        let error = transport.send(request(), SendOptions::new()).await.unwrap_err();

        assert!(error.is_connect());
        assert!(std::error::Error::source(&error).is_some());
    }

    #[tokio::test]
    async fn refused_connection_is_connect_error() {
        let mut resolver = MockResolver::new();
        resolver.expect_resolve().times(1).returning(|_| Ok(Some(IpAddr::V4(Ipv4Addr::LOCALHOST))));
        let connector = CountingConnector::default();
        let calls = Arc::clone(&connector.calls);

        let transport = Transport::with_parts(resolver, connector);
        let error = transport.send(request(), SendOptions::new()).await.unwrap_err();

        assert!(error.is_connect());
        assert_eq!(error.to_string(), "could not connect to host 'example.com'");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn uri_without_host_fails_before_resolving() {
        let mut resolver = MockResolver::new();
        resolver.expect_resolve().times(0);

        let transport = Transport::with_parts(resolver, CountingConnector::default());
        let request = Request::get("/relative").body(Bytes::new()).unwrap();
        let error = transport.send(request, SendOptions::new()).await.unwrap_err();

        assert!(error.is_connect());
    }

    #[tokio::test]
    async fn stats_observe_failures() {
        let mut resolver = MockResolver::new();
        resolver.expect_resolve().returning(|_| Ok(None));
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in_hook = Arc::clone(&seen);

        let transport = Transport::with_parts(resolver, CountingConnector::default());
        let options = SendOptions::new().on_stats(move |stats| {
            assert!(stats.error().is_some_and(TransportError::is_connect));
            assert!(!stats.has_response());
            assert_eq!(stats.request().headers().get(CONTENT_LENGTH).unwrap(), "0");
            seen_in_hook.fetch_add(1, Ordering::SeqCst);
        });

        assert!(transport.send(request(), options).await.is_err());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn drain_is_bounded_by_content_length() {
        let mut body = drain(Bytes::from_static(b"hello world"), Sink::Temp, Some(5)).await.unwrap();
        assert_eq!(body.stream_position().await.unwrap(), Some(0));
        assert_eq!(body.bytes().await.unwrap(), Bytes::from_static(b"hello"));

        let mut body = drain(Bytes::from_static(b"hello world"), Sink::Temp, None).await.unwrap();
        assert_eq!(body.bytes().await.unwrap(), Bytes::from_static(b"hello world"));

        let mut body = drain(Bytes::from_static(b"hello world"), Sink::Temp, Some(0)).await.unwrap();
        assert_eq!(body.bytes().await.unwrap(), Bytes::from_static(b"hello world"));
    }
}
