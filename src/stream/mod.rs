//! Stream stages and the duplex primitive they run on

pub mod duplex;
pub mod events;
pub mod stringify;

pub use duplex::{Duplex, DuplexOptions};
pub use events::{EventBus, StreamEvent};
pub use stringify::StringifyStream;

use crate::error::StreamResult;

/// What a pipeline needs from a stage: accept chunks, end the input,
/// hand back outputs and support cancellation.
pub trait Stage {
    type Input;
    type Output;

    /// Write one chunk. `Ok(false)` asks the caller to read before writing more.
    fn write(&mut self, chunk: Self::Input) -> StreamResult<bool>;

    /// Signal the end of input
    fn end(&mut self) -> StreamResult<()>;

    /// Next available output
    fn read(&mut self) -> Option<Self::Output>;

    /// Destroy the stage; returns `false` if it was already destroyed
    fn destroy(&mut self, error: Option<anyhow::Error>) -> bool;
}

/// Drive `chunks` through `stage` synchronously, handing every output to
/// `on_output`. Outputs are drained whenever the stage reports
/// backpressure and once more after the input ends.
///
/// Returns the number of outputs produced.
pub fn pump<S, I, F>(stage: &mut S, chunks: I, mut on_output: F) -> StreamResult<usize>
where
    S: Stage,
    I: IntoIterator,
    I::Item: Into<S::Input>,
    F: FnMut(S::Output) -> StreamResult<()>,
{
    let mut produced = 0;
    for chunk in chunks {
        if !stage.write(chunk.into())? {
            while let Some(output) = stage.read() {
                on_output(output)?;
                produced += 1;
            }
        }
    }

    stage.end()?;
    while let Some(output) = stage.read() {
        on_output(output)?;
        produced += 1;
    }
    Ok(produced)
}
