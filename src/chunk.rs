//! Input chunks accepted by the stream

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;

/// One unit of input
#[derive(Clone)]
pub enum Chunk {
    /// Raw bytes
    Bytes(Bytes),
    /// Text
    Text(String),
    /// A chunk carrying no value
    Absent,
    /// An explicit null
    Null,
    /// A keyed mapping or ordered sequence
    Structured(Value),
    Number(f64),
    Bool(bool),
    /// Any other value with a natural textual rendering (a function reference, say)
    Display(Arc<dyn fmt::Display + Send + Sync>),
}

impl Chunk {
    /// Wrap a value rendered through its `Display` implementation
    pub fn display<T>(value: T) -> Self
    where
        T: fmt::Display + Send + Sync + 'static,
    {
        Chunk::Display(Arc::new(value))
    }

    /// Short name of the chunk kind, used in errors and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Chunk::Bytes(_) => "bytes",
            Chunk::Text(_) => "string",
            Chunk::Absent => "absent",
            Chunk::Null => "null",
            Chunk::Structured(Value::Array(_)) => "array",
            Chunk::Structured(_) => "object",
            Chunk::Number(_) => "number",
            Chunk::Bool(_) => "boolean",
            Chunk::Display(_) => "value",
        }
    }

    /// Whether a byte-mode stream may carry this chunk
    pub fn is_binary_or_text(&self) -> bool {
        matches!(self, Chunk::Bytes(_) | Chunk::Text(_))
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chunk::Bytes(bytes) => f.debug_tuple("Bytes").field(bytes).finish(),
            Chunk::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Chunk::Absent => f.write_str("Absent"),
            Chunk::Null => f.write_str("Null"),
            Chunk::Structured(value) => f.debug_tuple("Structured").field(value).finish(),
            Chunk::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Chunk::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Chunk::Display(value) => write!(f, "Display({})", value),
        }
    }
}

impl From<Bytes> for Chunk {
    fn from(bytes: Bytes) -> Self {
        Chunk::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(bytes: Vec<u8>) -> Self {
        Chunk::Bytes(Bytes::from(bytes))
    }
}

impl From<&[u8]> for Chunk {
    fn from(bytes: &[u8]) -> Self {
        Chunk::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl From<String> for Chunk {
    fn from(text: String) -> Self {
        Chunk::Text(text)
    }
}

impl From<&str> for Chunk {
    fn from(text: &str) -> Self {
        Chunk::Text(text.to_string())
    }
}

impl From<f64> for Chunk {
    fn from(n: f64) -> Self {
        Chunk::Number(n)
    }
}

impl From<i64> for Chunk {
    fn from(n: i64) -> Self {
        Chunk::Number(n as f64)
    }
}

impl From<i32> for Chunk {
    fn from(n: i32) -> Self {
        Chunk::Number(f64::from(n))
    }
}

impl From<bool> for Chunk {
    fn from(b: bool) -> Self {
        Chunk::Bool(b)
    }
}

impl<T: Into<Chunk>> From<Option<T>> for Chunk {
    fn from(value: Option<T>) -> Self {
        value.map_or(Chunk::Absent, Into::into)
    }
}

impl From<Value> for Chunk {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Chunk::Null,
            Value::Bool(b) => Chunk::Bool(b),
            Value::Number(n) => match n.as_f64() {
                Some(f) => Chunk::Number(f),
                None => Chunk::display(n),
            },
            Value::String(text) => Chunk::Text(text),
            structured @ (Value::Array(_) | Value::Object(_)) => Chunk::Structured(structured),
        }
    }
}
