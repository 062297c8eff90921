//! Reusable stream factory

use crate::config::StreamOptions;
use crate::error::ConfigResult;
use crate::stream::StringifyStream;

/// Builds streams from a snapshot of the options it was created with.
///
/// The snapshot keeps only recognized option names and is taken once;
/// changing the caller's options afterwards has no effect.
#[derive(Debug, Clone)]
pub struct StreamFactory {
    options: StreamOptions,
}

impl StreamFactory {
    pub fn new(options: &StreamOptions) -> Self {
        Self {
            options: options.filtered(),
        }
    }

    /// Build a fresh, independent stream
    pub fn create(&self) -> ConfigResult<StringifyStream> {
        StringifyStream::new(self.options.clone())
    }

    /// The options every created stream receives
    pub fn options(&self) -> &StreamOptions {
        &self.options
    }

    /// Turn the factory into a plain zero-argument constructor
    pub fn into_fn(self) -> impl Fn() -> ConfigResult<StringifyStream> {
        move || self.create()
    }
}
