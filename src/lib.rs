//! Stringify stream
//!
//! A duplex stream stage that accepts bytes, text, absent values,
//! structured values and other primitives, and emits one string per chunk
//! in the order the chunks arrived.

pub mod chunk;
pub mod cli;
pub mod config;
pub mod error;
pub mod factory;
pub mod stream;
pub mod transform;

// Re-export commonly used types
pub use chunk::Chunk;
pub use config::{Encoding, StreamConfig, StreamOptions};
pub use error::{ConfigError, StreamError, StreamResult};
pub use factory::StreamFactory;
pub use stream::{pump, Stage, StreamEvent, StringifyStream};
pub use transform::{Stringify, Transform};

/// Create a stringify stream
pub fn create(options: StreamOptions) -> Result<StringifyStream, ConfigError> {
    StringifyStream::new(options)
}

/// Create a stream in object mode, recording the mode on `options`
pub fn create_structured_mode(
    options: &mut StreamOptions,
) -> Result<StringifyStream, ConfigError> {
    options.set(config::OBJECT_MODE, true);
    StringifyStream::new(options.clone())
}

/// Create a reusable factory from a snapshot of `options`
pub fn create_factory(options: &StreamOptions) -> StreamFactory {
    StreamFactory::new(options)
}

/// Stringify every chunk in `chunks` with the given options
pub fn stringify_all<I>(options: StreamOptions, chunks: I) -> StreamResult<Vec<String>>
where
    I: IntoIterator,
    I::Item: Into<Chunk>,
{
    let mut stream = create(options)?;
    let mut outputs = Vec::new();
    pump(&mut stream, chunks, |output| {
        outputs.push(output);
        Ok(())
    })?;
    Ok(outputs)
}
