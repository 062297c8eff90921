//! Error types for stream construction and operation

use std::path::PathBuf;
use std::sync::Arc;

/// Errors raised while validating stream options
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid option. `{option}` must be a {expected}. Value: `{value}`.")]
    TypeMismatch {
        option: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("invalid option. `{option}` must be {constraint}. Value: `{value}`.")]
    OutOfRange {
        option: &'static str,
        constraint: &'static str,
        value: String,
    },

    #[error("invalid option. Unknown encoding: `{encoding}`.")]
    UnknownEncoding { encoding: String },

    #[error("invalid options document: {message}")]
    Parse { message: String },
}

impl ConfigError {
    pub fn type_mismatch(
        option: &'static str,
        expected: &'static str,
        value: &serde_json::Value,
    ) -> Self {
        Self::TypeMismatch {
            option,
            expected,
            value: value.to_string(),
        }
    }

    pub fn out_of_range(
        option: &'static str,
        constraint: &'static str,
        value: &serde_json::Value,
    ) -> Self {
        Self::OutOfRange {
            option,
            constraint,
            value: value.to_string(),
        }
    }

    pub fn parse(message: String) -> Self {
        Self::Parse { message }
    }

    /// Name of the option that failed validation, if any
    pub fn option(&self) -> Option<&'static str> {
        match self {
            Self::TypeMismatch { option, .. } | Self::OutOfRange { option, .. } => Some(option),
            Self::UnknownEncoding { .. } => Some("encoding"),
            Self::Parse { .. } => None,
        }
    }
}

/// Main error type for stream operations
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("write after end")]
    WriteAfterEnd,

    #[error("cannot write to a destroyed stream")]
    Destroyed,

    #[error("invalid non-string/buffer chunk: {kind}")]
    InvalidChunk { kind: &'static str },

    #[error("failed to serialize structured chunk: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A chunk failed inside the transform and the stream destroyed itself.
    /// The `Error` event carries the same value.
    #[error(transparent)]
    Aborted(Arc<StreamError>),

    #[error("JSON parse error: {0}")]
    InputParse(#[source] serde_json::Error),

    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StreamError {
    pub fn io(message: String, path: Option<PathBuf>) -> Self {
        Self::Io { message, path }
    }

    /// Create a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => format!("Configuration error: {}", err),
            Self::WriteAfterEnd => {
                "Cannot write: the input side of the stream has already ended".to_string()
            }
            Self::Destroyed => "Cannot write: the stream has been destroyed".to_string(),
            Self::InvalidChunk { kind } => format!(
                "Received a {} chunk but the stream is not in object mode (try --object-mode)",
                kind
            ),
            Self::Aborted(cause) => format!("Stream aborted: {}", cause.user_message()),
            Self::InputParse(err) => format!("Input is not a sequence of JSON values: {}", err),
            Self::Io { message, path } => match path {
                Some(path) => format!("IO error on {}: {}", path.display(), message),
                None => format!("IO error: {}", message),
            },
            _ => self.to_string(),
        }
    }
}

/// Result type for stream operations
pub type StreamResult<T> = Result<T, StreamError>;

/// Result type for option validation
pub type ConfigResult<T> = Result<T, ConfigError>;
