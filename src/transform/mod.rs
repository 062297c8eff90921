//! Per-chunk transforms
//!
//! A [`Transform`] turns one input chunk into zero or more outputs and
//! reports completion through its return value. [`Stringify`] is the one
//! this crate ships: it renders every chunk as exactly one string.

use serde_json::Value;
use tracing::trace;

use crate::chunk::Chunk;
use crate::config::{Encoding, StreamConfig};
use crate::error::StreamResult;

/// Chunk-level processing plugged into a [`crate::stream::Duplex`]
pub trait Transform {
    type Input;
    type Output;

    /// Process one chunk, handing results to `push`.
    ///
    /// Returning `Ok(())` is the completion signal for this chunk.
    fn transform(
        &mut self,
        chunk: Self::Input,
        encoding: Option<Encoding>,
        push: &mut dyn FnMut(Self::Output),
    ) -> StreamResult<()>;

    /// Emit anything still held once the input has ended
    fn flush(&mut self, _push: &mut dyn FnMut(Self::Output)) -> StreamResult<()> {
        Ok(())
    }
}

/// Renders each chunk as its string representation
#[derive(Debug, Clone)]
pub struct Stringify {
    placeholder: String,
}

impl Stringify {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
        }
    }

    pub fn from_config(config: &StreamConfig) -> Self {
        Self::new(config.placeholder.clone())
    }

    /// Render a single chunk.
    ///
    /// Checked in order: bytes, structured values, absent, text, then
    /// everything else. A structured value is serialized as JSON, never
    /// through a generic rendering, and text is never re-serialized.
    pub fn render(&self, chunk: Chunk, encoding: Option<Encoding>) -> StreamResult<String> {
        match chunk {
            Chunk::Bytes(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Chunk::Structured(value @ (Value::Object(_) | Value::Array(_))) => {
                Ok(serde_json::to_string(&value)?)
            }
            Chunk::Structured(scalar) => self.render(Chunk::from(scalar), encoding),
            Chunk::Absent => Ok(self.placeholder.clone()),
            // Text is already Unicode; the hint cannot change its content.
            Chunk::Text(text) => Ok(text),
            Chunk::Null => Ok("null".to_string()),
            Chunk::Number(n) => Ok(format_number(n)),
            Chunk::Bool(b) => Ok(b.to_string()),
            Chunk::Display(value) => Ok(value.to_string()),
        }
    }
}

impl Default for Stringify {
    fn default() -> Self {
        Self::from_config(&StreamConfig::default())
    }
}

impl Transform for Stringify {
    type Input = Chunk;
    type Output = String;

    fn transform(
        &mut self,
        chunk: Chunk,
        encoding: Option<Encoding>,
        push: &mut dyn FnMut(String),
    ) -> StreamResult<()> {
        trace!(kind = chunk.kind(), ?encoding, "stringify chunk");
        push(self.render(chunk, encoding)?);
        Ok(())
    }
}

/// Number text the way a script runtime prints it: `NaN`, `Infinity`,
/// integral values without a fraction, exponent form outside `[1e-6, 1e21)`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return n.to_string();
    }

    let exponent_form = format!("{:e}", n);
    match exponent_form.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => exponent_form,
    }
}
