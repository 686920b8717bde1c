use std::fmt;
use std::io::{self, Cursor, SeekFrom};
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::{Bytes, BytesMut};
use http_body::{Body, Frame, SizeHint};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, ReadBuf};
use tokio_util::io::poll_read_buf;

use crate::transport::SinkIo;

const FRAME_SIZE: usize = 8 * 1024;

/// The body of a response returned by the transport.
///
/// A body is either a *sink*, the destination the payload was drained into (rewound to
/// its start), or the *raw* payload as read off the socket, which is what `HEAD`
/// responses and `stream` sends hand back.
///
/// It can be consumed as a `tokio::io::AsyncRead` or as an `http_body::Body`.
pub struct ResponseBody {
    kind: Kind,
}

enum Kind {
    Raw(Cursor<Bytes>),
    Sink(Box<dyn SinkIo>),
}

impl ResponseBody {
    pub(crate) fn raw(bytes: Bytes) -> Self {
        Self { kind: Kind::Raw(Cursor::new(bytes)) }
    }

    pub(crate) fn sink(sink: Box<dyn SinkIo>) -> Self {
        Self { kind: Kind::Sink(sink) }
    }

    /// A raw body without any bytes.
    pub fn empty() -> Self {
        Self::raw(Bytes::new())
    }

    /// Whether the payload was drained into a sink.
    pub fn is_sink(&self) -> bool {
        matches!(self.kind, Kind::Sink(_))
    }

    /// The read offset of a sink, `None` for a raw body.
    pub async fn stream_position(&mut self) -> io::Result<Option<u64>> {
        match &mut self.kind {
            Kind::Raw(_) => Ok(None),
            Kind::Sink(sink) => sink.stream_position().await.map(Some),
        }
    }

    /// Moves the read offset back to the start of the body.
    pub async fn rewind(&mut self) -> io::Result<()> {
        match &mut self.kind {
            Kind::Raw(cursor) => cursor.set_position(0),
            Kind::Sink(sink) => {
                sink.seek(SeekFrom::Start(0)).await?;
            }
        }
        Ok(())
    }

    /// Reads the rest of the body into memory.
    pub async fn bytes(&mut self) -> io::Result<Bytes> {
        if let Kind::Raw(cursor) = &mut self.kind {
            let start = usize::try_from(cursor.position()).unwrap_or(usize::MAX).min(cursor.get_ref().len());
            let rest = cursor.get_ref().slice(start..);
            cursor.set_position(cursor.get_ref().len() as u64);
            return Ok(rest);
        }

        let mut buf = Vec::new();
        self.read_to_end(&mut buf).await?;
        Ok(Bytes::from(buf))
    }

    /// Gives back the sink the body was drained into.
    pub fn into_sink(self) -> Option<Box<dyn SinkIo>> {
        match self.kind {
            Kind::Raw(_) => None,
            Kind::Sink(sink) => Some(sink),
        }
    }
}

impl Default for ResponseBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Raw(cursor) => f.debug_struct("ResponseBody").field("raw", &cursor.get_ref().len()).finish(),
            Kind::Sink(_) => f.debug_struct("ResponseBody").field("sink", &"..").finish(),
        }
    }
}

impl AsyncRead for ResponseBody {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        match &mut self.get_mut().kind {
            Kind::Raw(cursor) => Pin::new(cursor).poll_read(cx, buf),
            Kind::Sink(sink) => Pin::new(sink).poll_read(cx, buf),
        }
    }
}

impl Body for ResponseBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let mut buf = BytesMut::with_capacity(FRAME_SIZE);
        let n = ready!(poll_read_buf(self, cx, &mut buf))?;
        if n == 0 {
            return Poll::Ready(None);
        }
        Poll::Ready(Some(Ok(Frame::data(buf.freeze()))))
    }

    fn size_hint(&self) -> SizeHint {
        match &self.kind {
            Kind::Raw(cursor) => {
                let remaining = (cursor.get_ref().len() as u64).saturating_sub(cursor.position());
                SizeHint::with_exact(remaining)
            }
            Kind::Sink(_) => SizeHint::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn raw_body_bytes() {
        let mut body = ResponseBody::raw(Bytes::from_static(b"hello"));

        assert!(!body.is_sink());
        assert_eq!(body.stream_position().await.unwrap(), None);
        assert_eq!(body.size_hint().exact(), Some(5));
        assert_eq!(body.bytes().await.unwrap(), Bytes::from_static(b"hello"));
        assert_eq!(body.bytes().await.unwrap(), Bytes::new());

        body.rewind().await.unwrap();
        assert_eq!(body.bytes().await.unwrap(), Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn sink_body_reads_and_rewinds() {
        let sink: Box<dyn SinkIo> = Box::new(Cursor::new(b"sunk".to_vec()));
        let mut body = ResponseBody::sink(sink);

        assert!(body.is_sink());
        assert_eq!(body.stream_position().await.unwrap(), Some(0));
        assert_eq!(body.bytes().await.unwrap(), Bytes::from_static(b"sunk"));
        assert_eq!(body.stream_position().await.unwrap(), Some(4));

        body.rewind().await.unwrap();
        assert_eq!(body.stream_position().await.unwrap(), Some(0));
        assert!(body.into_sink().is_some());
    }

    #[tokio::test]
    async fn collect_as_http_body() {
        let body = ResponseBody::raw(Bytes::from(vec![b'x'; FRAME_SIZE * 2 + 3]));
        let collected = body.collect().await.unwrap().to_bytes();
        assert_eq!(collected.len(), FRAME_SIZE * 2 + 3);

        let empty = ResponseBody::empty().collect().await.unwrap().to_bytes();
        assert!(empty.is_empty());
    }
}
