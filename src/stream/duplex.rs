//! Duplex primitive that hosts a [`Transform`]
//!
//! The writable side feeds chunks through the transform synchronously and
//! the results wait in a readable queue. The queue length is compared with
//! the high-water mark to signal backpressure: [`Duplex::write`] returns
//! `false` and [`Sink::poll_ready`] stays pending until a reader drains it.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use futures::channel::mpsc::UnboundedReceiver;
use futures::{Sink, Stream};
use tracing::{debug, warn};

use crate::config::{Encoding, StreamConfig};
use crate::error::{StreamError, StreamResult};
use crate::stream::events::{EventBus, StreamEvent};
use crate::stream::Stage;
use crate::transform::Transform;

/// Runtime settings of a [`Duplex`]
#[derive(Debug, Clone, PartialEq)]
pub struct DuplexOptions {
    pub high_water_mark: usize,
    pub allow_half_open: bool,
    pub default_encoding: Option<Encoding>,
}

impl From<&StreamConfig> for DuplexOptions {
    fn from(config: &StreamConfig) -> Self {
        Self {
            high_water_mark: config.high_water_mark,
            allow_half_open: config.allow_half_open,
            default_encoding: config.encoding,
        }
    }
}

impl Default for DuplexOptions {
    fn default() -> Self {
        Self::from(&StreamConfig::default())
    }
}

pub struct Duplex<T: Transform> {
    transform: T,
    options: DuplexOptions,
    readable: VecDeque<T::Output>,
    writable_ended: bool,
    readable_ended: bool,
    destroyed: bool,
    read_waker: Option<Waker>,
    write_waker: Option<Waker>,
    events: EventBus,
}

impl<T: Transform> Duplex<T> {
    pub fn new(transform: T, options: DuplexOptions) -> Self {
        Self {
            transform,
            options,
            readable: VecDeque::new(),
            writable_ended: false,
            readable_ended: false,
            destroyed: false,
            read_waker: None,
            write_waker: None,
            events: EventBus::new(),
        }
    }

    pub fn options(&self) -> &DuplexOptions {
        &self.options
    }

    /// Write a chunk using the default encoding hint
    pub fn write(&mut self, chunk: T::Input) -> StreamResult<bool> {
        self.write_encoded(chunk, None)
    }

    /// Write a chunk with an explicit encoding hint.
    ///
    /// Returns whether the readable queue is still below the high-water
    /// mark. The chunk is processed either way. A transform failure
    /// destroys the stream and comes back as [`StreamError::Aborted`].
    pub fn write_encoded(
        &mut self,
        chunk: T::Input,
        encoding: Option<Encoding>,
    ) -> StreamResult<bool> {
        if self.destroyed {
            return Err(StreamError::Destroyed);
        }
        if self.writable_ended {
            return Err(StreamError::WriteAfterEnd);
        }

        let encoding = encoding.or(self.options.default_encoding);
        let discard = self.readable_ended;
        let readable = &mut self.readable;
        let result = self.transform.transform(chunk, encoding, &mut |output| {
            if !discard {
                readable.push_back(output);
            }
        });

        if let Err(error) = result {
            warn!(%error, "transform failed, destroying stream");
            let error = Arc::new(error);
            self.destroy(Some(anyhow::Error::new(Arc::clone(&error))));
            return Err(StreamError::Aborted(error));
        }

        self.wake_reader();
        Ok(!self.needs_drain())
    }

    /// Signal that no more chunks will be written
    pub fn end(&mut self) -> StreamResult<()> {
        if self.destroyed {
            return Err(StreamError::Destroyed);
        }
        if self.writable_ended {
            return Ok(());
        }
        self.writable_ended = true;

        let discard = self.readable_ended;
        let readable = &mut self.readable;
        self.transform.flush(&mut |output| {
            if !discard {
                readable.push_back(output);
            }
        })?;

        debug!(buffered = self.readable.len(), "writable side ended");
        self.wake_reader();
        Ok(())
    }

    /// Take the next output, if one is ready
    pub fn read(&mut self) -> Option<T::Output> {
        if self.destroyed {
            return None;
        }
        let item = self.readable.pop_front();
        if item.is_some() {
            self.wake_writer();
        }
        item
    }

    /// Stop consuming output. Without half-open support the writable side
    /// ends as well.
    pub fn end_readable(&mut self) -> StreamResult<()> {
        if self.readable_ended || self.destroyed {
            return Ok(());
        }
        self.readable_ended = true;
        self.readable.clear();
        self.wake_writer();
        self.wake_reader();

        if !self.options.allow_half_open {
            self.end()?;
        }
        Ok(())
    }

    /// Destroy the stream.
    ///
    /// The first call marks the stream destroyed and schedules an `Error`
    /// event (when `error` is given) followed by `Close`. Later calls do
    /// nothing and return `false`.
    pub fn destroy(&mut self, error: Option<anyhow::Error>) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        debug!(with_error = error.is_some(), "stream destroyed");

        if let Some(error) = error {
            self.events.schedule(StreamEvent::Error(Arc::new(error)));
        }
        self.events.schedule(StreamEvent::Close);

        self.wake_reader();
        self.wake_writer();
        true
    }

    /// Receive `Error`/`Close` notifications
    pub fn subscribe(&mut self) -> UnboundedReceiver<StreamEvent> {
        self.events.subscribe()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_writable_ended(&self) -> bool {
        self.writable_ended
    }

    /// True once no further output can be read
    pub fn is_readable_finished(&self) -> bool {
        self.destroyed || self.readable_ended || (self.writable_ended && self.readable.is_empty())
    }

    pub fn buffered_len(&self) -> usize {
        self.readable.len()
    }

    /// Whether writers should wait for the reader
    pub fn needs_drain(&self) -> bool {
        self.readable.len() >= self.options.high_water_mark
    }

    fn wake_reader(&mut self) {
        if let Some(waker) = self.read_waker.take() {
            waker.wake();
        }
    }

    fn wake_writer(&mut self) {
        if let Some(waker) = self.write_waker.take() {
            waker.wake();
        }
    }
}

impl<T: Transform> Stage for Duplex<T> {
    type Input = T::Input;
    type Output = T::Output;

    fn write(&mut self, chunk: T::Input) -> StreamResult<bool> {
        Duplex::write(self, chunk)
    }

    fn end(&mut self) -> StreamResult<()> {
        Duplex::end(self)
    }

    fn read(&mut self) -> Option<T::Output> {
        Duplex::read(self)
    }

    fn destroy(&mut self, error: Option<anyhow::Error>) -> bool {
        Duplex::destroy(self, error)
    }
}

impl<T> Stream for Duplex<T>
where
    T: Transform + Unpin,
    T::Output: Unpin,
{
    type Item = T::Output;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if let Some(item) = this.read() {
            return Poll::Ready(Some(item));
        }
        if this.is_readable_finished() {
            return Poll::Ready(None);
        }
        this.read_waker = Some(cx.waker().clone());
        Poll::Pending
    }
}

impl<T> Sink<T::Input> for Duplex<T>
where
    T: Transform + Unpin,
    T::Output: Unpin,
{
    type Error = StreamError;

    fn poll_ready(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        let this = self.get_mut();
        if this.destroyed {
            return Poll::Ready(Err(StreamError::Destroyed));
        }
        if this.writable_ended {
            return Poll::Ready(Err(StreamError::WriteAfterEnd));
        }
        // A zero high-water mark still admits one item at a time.
        if this.readable.len() >= this.options.high_water_mark.max(1) {
            this.write_waker = Some(cx.waker().clone());
            return Poll::Pending;
        }
        Poll::Ready(Ok(()))
    }

    fn start_send(self: Pin<&mut Self>, item: T::Input) -> Result<(), Self::Error> {
        self.get_mut().write(item).map(|_| ())
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(self.get_mut().end())
    }
}
