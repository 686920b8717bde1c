use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncSeek, AsyncWrite};

use crate::protocol::{BoxError, ResponseHead};
use crate::transport::TransferStats;

/// Hook called with the response head before the body is drained.
pub type OnHeaders = Arc<dyn Fn(&ResponseHead) -> Result<(), BoxError> + Send + Sync>;

/// Hook called once per send, whether it succeeded or failed.
pub type OnStats = Arc<dyn Fn(&TransferStats<'_>) + Send + Sync>;

/// A destination a response body can be drained into and read back from.
pub trait SinkIo: AsyncRead + AsyncWrite + AsyncSeek + Unpin + Send {}

impl<T> SinkIo for T where T: AsyncRead + AsyncWrite + AsyncSeek + Unpin + Send {}

/// Where the response body ends up.
#[derive(Default)]
pub enum Sink {
    /// An anonymous in-memory buffer.
    #[default]
    Temp,
    /// A file, created if absent and truncated otherwise.
    Path(PathBuf),
    /// A caller supplied destination.
    Io(Box<dyn SinkIo>),
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sink::Temp => f.write_str("Temp"),
            Sink::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Sink::Io(_) => f.write_str("Io(..)"),
        }
    }
}

/// Per call settings of [`Transport::send`](crate::transport::Transport::send).
///
/// | option           | default         |
/// |------------------|-----------------|
/// | `decode_content` | `false`         |
/// | `sink`           | [`Sink::Temp`]  |
/// | `stream`         | `false`         |
/// | `on_headers`     | none            |
/// | `on_stats`       | none            |
/// | `delay`          | none            |
#[derive(Default)]
pub struct SendOptions {
    /// Inflate `gzip` and `deflate` bodies, renaming the original
    /// `Content-Encoding`/`Content-Length` headers to `X-Encoded-*`.
    pub decode_content: bool,
    /// Destination the body is drained into, unused when `stream` is set or for `HEAD`.
    pub sink: Sink,
    /// Hand back the body as read off the socket instead of draining it into `sink`.
    pub stream: bool,
    pub on_headers: Option<OnHeaders>,
    pub on_stats: Option<OnStats>,
    /// Suspend the calling task this long before the request starts.
    pub delay: Option<Duration>,
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn decode_content(mut self, decode_content: bool) -> Self {
        self.decode_content = decode_content;
        self
    }

    #[must_use]
    pub fn sink(mut self, sink: Sink) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub fn sink_path<P: Into<PathBuf>>(self, path: P) -> Self {
        self.sink(Sink::Path(path.into()))
    }

    #[must_use]
    pub fn sink_io<S: SinkIo + 'static>(self, io: S) -> Self {
        self.sink(Sink::Io(Box::new(io)))
    }

    #[must_use]
    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    #[must_use]
    pub fn on_headers<F>(mut self, f: F) -> Self
    where
        F: Fn(&ResponseHead) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.on_headers = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_stats<F>(mut self, f: F) -> Self
    where
        F: Fn(&TransferStats<'_>) + Send + Sync + 'static,
    {
        self.on_stats = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl fmt::Debug for SendOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendOptions")
            .field("decode_content", &self.decode_content)
            .field("sink", &self.sink)
            .field("stream", &self.stream)
            .field("on_headers", &self.on_headers.is_some())
            .field("on_stats", &self.on_stats.is_some())
            .field("delay", &self.delay)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = SendOptions::new();
        assert!(!options.decode_content);
        assert!(matches!(options.sink, Sink::Temp));
        assert!(!options.stream);
        assert!(options.on_headers.is_none());
        assert!(options.on_stats.is_none());
        assert!(options.delay.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let options = SendOptions::new()
            .decode_content(true)
            .sink_path("/tmp/body")
            .stream(true)
            .on_headers(|_| Ok(()))
            .on_stats(|_| {})
            .delay(Duration::from_millis(5));

        assert!(options.decode_content);
        assert!(matches!(&options.sink, Sink::Path(path) if path.as_os_str() == "/tmp/body"));
        assert!(options.stream);
        assert!(options.on_headers.is_some());
        assert!(options.on_stats.is_some());
        assert_eq!(options.delay, Some(Duration::from_millis(5)));
        assert_eq!(
            format!("{options:?}"),
            "SendOptions { decode_content: true, sink: Path(\"/tmp/body\"), stream: true, on_headers: true, on_stats: true, delay: Some(5ms) }"
        );
    }
}
