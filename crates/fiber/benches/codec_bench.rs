use std::hint::black_box;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use criterion::{Criterion, criterion_group, criterion_main};
use http::Request;
use micro_fiber::channel::Channel;
use micro_fiber::codec::{RequestEncoder, ResponseDecoder};
use micro_fiber::connector::{Connector, Resolver};
use micro_fiber::protocol::{Message, RequestHeader};
use micro_fiber::transport::{SendOptions, Transport};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_util::codec::{Decoder, Encoder};

const RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\nServer: bench\r\nContent-Type: text/plain\r\nContent-Length: 12\r\n\r\nHello World!";

// Mock IO replaying one canned response
struct MockIo {
    read_pos: usize,
}

impl AsyncRead for MockIo {
    fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let remaining = &RESPONSE[self.read_pos..];
        let amt = remaining.len().min(buf.remaining());
        buf.put_slice(&remaining[..amt]);
        self.read_pos += amt;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockIo {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

struct Loopback;

#[async_trait]
impl Resolver for Loopback {
    async fn resolve(&self, _host: &str) -> io::Result<Option<IpAddr>> {
        Ok(Some(IpAddr::V4(Ipv4Addr::LOCALHOST)))
    }
}

#[async_trait]
impl Connector for Loopback {
    type Io = MockIo;

    async fn connect(&self, _addr: SocketAddr) -> io::Result<Self::Io> {
        Ok(MockIo { read_pos: 0 })
    }
}

fn bench_response_decoder(c: &mut Criterion) {
    c.bench_function("decode_simple_response", |b| {
        b.iter(|| {
            let mut decoder = ResponseDecoder::new();
            let mut bytes = BytesMut::from(RESPONSE);
            while let Some(message) = decoder.decode(&mut bytes).unwrap() {
                if let Message::Payload(item) = black_box(message) {
                    if item.is_eof() {
                        break;
                    }
                }
            }
        });
    });
}

fn bench_request_encoder(c: &mut Criterion) {
    let request = Request::post("http://localhost:8080/submit?id=1")
        .header("host", "localhost:8080")
        .header("user-agent", "micro-fiber")
        .body(())
        .unwrap();
    let header = RequestHeader::from(request);
    let body = Bytes::from_static(b"{\"hello\":\"world\"}");

    c.bench_function("encode_simple_request", |b| {
        b.iter(|| {
            let mut encoder = RequestEncoder::new();
            let mut bytes = BytesMut::new();
            encoder.encode((header.clone(), body.clone()), &mut bytes).unwrap();
            black_box(bytes);
        });
    });
}

fn bench_transport_send(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    let transport = Transport::with_parts(Loopback, Loopback);

    c.bench_function("send_simple_request", |b| {
        b.to_async(&runtime).iter(|| async {
            let request = Request::get("http://localhost/").body(Bytes::new()).unwrap();
            let mut response = transport.send(request, SendOptions::new()).await.unwrap();
            black_box(response.body_mut().bytes().await.unwrap());
        });
    });
}

fn bench_channel(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

    c.bench_function("channel_fan_in_64", |b| {
        b.to_async(&runtime).iter(|| async {
            let channel = Channel::new();
            for id in 0..64u32 {
                let channel = channel.clone();
                tokio::spawn(async move { channel.write(id) });
            }
            let mut sum = 0;
            for _ in 0..64 {
                sum += channel.read().await;
            }
            black_box(sum);
        });
    });
}

criterion_group!(benches, bench_response_decoder, bench_request_encoder, bench_transport_send, bench_channel);
criterion_main!(benches);
