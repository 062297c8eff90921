use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::channel::mpsc::UnboundedReceiver;
use futures::{Sink, Stream};
use tracing::debug;

use crate::chunk::Chunk;
use crate::config::{Encoding, StreamConfig, StreamOptions};
use crate::error::{ConfigResult, StreamError, StreamResult};
use crate::stream::duplex::{Duplex, DuplexOptions};
use crate::stream::events::StreamEvent;
use crate::stream::Stage;
use crate::transform::Stringify;

/// Stream stage that emits the string form of every chunk written to it.
///
/// The readable side always yields discrete `String` items, whatever mode
/// the writable side is in. Without object mode only byte and text chunks
/// are accepted.
pub struct StringifyStream {
    config: Arc<StreamConfig>,
    inner: Duplex<Stringify>,
}

impl StringifyStream {
    /// Validate `options` and build a stream
    pub fn new(options: StreamOptions) -> ConfigResult<Self> {
        let config = options.validate()?;
        Ok(Self::with_config(config))
    }

    /// Build a stream from an already validated configuration
    pub fn with_config(config: StreamConfig) -> Self {
        debug!(
            object_mode = config.object_mode,
            high_water_mark = config.high_water_mark,
            allow_half_open = config.allow_half_open,
            encoding = ?config.encoding,
            "stringify stream created"
        );
        let inner = Duplex::new(Stringify::from_config(&config), DuplexOptions::from(&config));
        Self {
            config: Arc::new(config),
            inner,
        }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Write a chunk under the configured encoding
    pub fn write(&mut self, chunk: impl Into<Chunk>) -> StreamResult<bool> {
        let chunk = self.admit(chunk.into())?;
        self.inner.write(chunk)
    }

    /// Write a chunk under an explicit encoding hint
    pub fn write_encoded(
        &mut self,
        chunk: impl Into<Chunk>,
        encoding: Encoding,
    ) -> StreamResult<bool> {
        let chunk = self.admit(chunk.into())?;
        self.inner.write_encoded(chunk, Some(encoding))
    }

    pub fn end(&mut self) -> StreamResult<()> {
        self.inner.end()
    }

    pub fn read(&mut self) -> Option<String> {
        self.inner.read()
    }

    pub fn end_readable(&mut self) -> StreamResult<()> {
        self.inner.end_readable()
    }

    /// Idempotent; see [`Duplex::destroy`]
    pub fn destroy(&mut self, error: Option<anyhow::Error>) -> bool {
        self.inner.destroy(error)
    }

    pub fn subscribe(&mut self) -> UnboundedReceiver<StreamEvent> {
        self.inner.subscribe()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.is_destroyed()
    }

    pub fn is_readable_finished(&self) -> bool {
        self.inner.is_readable_finished()
    }

    pub fn buffered_len(&self) -> usize {
        self.inner.buffered_len()
    }

    fn admit(&self, chunk: Chunk) -> StreamResult<Chunk> {
        if self.config.object_mode || chunk.is_binary_or_text() {
            Ok(chunk)
        } else {
            Err(StreamError::InvalidChunk { kind: chunk.kind() })
        }
    }
}

impl fmt::Debug for StringifyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringifyStream")
            .field("config", &self.config)
            .field("buffered", &self.inner.buffered_len())
            .field("destroyed", &self.inner.is_destroyed())
            .finish()
    }
}

impl Stage for StringifyStream {
    type Input = Chunk;
    type Output = String;

    fn write(&mut self, chunk: Chunk) -> StreamResult<bool> {
        StringifyStream::write(self, chunk)
    }

    fn end(&mut self) -> StreamResult<()> {
        StringifyStream::end(self)
    }

    fn read(&mut self) -> Option<String> {
        StringifyStream::read(self)
    }

    fn destroy(&mut self, error: Option<anyhow::Error>) -> bool {
        StringifyStream::destroy(self, error)
    }
}

impl Stream for StringifyStream {
    type Item = String;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        Pin::new(&mut self.get_mut().inner).poll_next(cx)
    }
}

impl Sink<Chunk> for StringifyStream {
    type Error = StreamError;

    fn poll_ready(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), StreamError>> {
        Pin::new(&mut self.get_mut().inner).poll_ready(cx)
    }

    fn start_send(self: Pin<&mut Self>, item: Chunk) -> Result<(), StreamError> {
        self.get_mut().write(item).map(|_| ())
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), StreamError>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), StreamError>> {
        Pin::new(&mut self.get_mut().inner).poll_close(cx)
    }
}
