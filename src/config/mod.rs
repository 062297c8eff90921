//! Stream options and their validated form
//!
//! [`StreamOptions`] is the loosely typed record callers hand to the
//! constructors (it may come straight from a JSON document). Validation
//! turns it into an immutable [`StreamConfig`] or fails naming the option.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult};

pub const OBJECT_MODE: &str = "object_mode";
pub const HIGH_WATER_MARK: &str = "high_water_mark";
pub const ALLOW_HALF_OPEN: &str = "allow_half_open";
pub const ENCODING: &str = "encoding";
pub const DECODE_STRINGS: &str = "decode_strings";
pub const PLACEHOLDER: &str = "placeholder";

/// Option names a factory snapshot retains
pub const RECOGNIZED_OPTIONS: [&str; 6] = [
    OBJECT_MODE,
    HIGH_WATER_MARK,
    ALLOW_HALF_OPEN,
    ENCODING,
    DECODE_STRINGS,
    PLACEHOLDER,
];

/// Placeholder emitted for absent chunks unless configured otherwise
pub const DEFAULT_PLACEHOLDER: &str = "undefined";

/// Readable high-water mark in byte mode
pub const DEFAULT_HIGH_WATER_MARK: usize = 16 * 1024;

/// Readable high-water mark in object mode (counted in items)
pub const DEFAULT_OBJECT_HIGH_WATER_MARK: usize = 16;

/// Text encodings accepted as hints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Utf8,
    Utf16Le,
    Latin1,
    Ascii,
    Base64,
    Hex,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf8",
            Encoding::Utf16Le => "utf16le",
            Encoding::Latin1 => "latin1",
            Encoding::Ascii => "ascii",
            Encoding::Base64 => "base64",
            Encoding::Hex => "hex",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Ok(Encoding::Utf16Le),
            "latin1" | "binary" => Ok(Encoding::Latin1),
            "ascii" => Ok(Encoding::Ascii),
            "base64" => Ok(Encoding::Base64),
            "hex" => Ok(Encoding::Hex),
            _ => Err(ConfigError::UnknownEncoding {
                encoding: s.to_string(),
            }),
        }
    }
}

/// Caller-supplied stream options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamOptions {
    entries: Map<String, Value>,
}

impl StreamOptions {
    /// Create an empty option record
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for feeding text lines as byte chunks
    pub fn text_lines() -> Self {
        Self::new()
            .with_object_mode(false)
            .with_encoding(Encoding::Utf8)
    }

    /// Options for feeding structured values
    pub fn structured() -> Self {
        Self::new()
            .with_object_mode(true)
            .with_high_water_mark(DEFAULT_OBJECT_HIGH_WATER_MARK)
    }

    /// Parse options from a JSON object
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ConfigError::parse(e.to_string()))?;
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(ConfigError::parse(format!(
                "expected a JSON object, found `{}`",
                other
            ))),
        }
    }

    /// Set a raw option value; no validation happens until construction
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.entries.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn with_object_mode(mut self, enabled: bool) -> Self {
        self.set(OBJECT_MODE, enabled);
        self
    }

    pub fn with_high_water_mark(mut self, limit: usize) -> Self {
        self.set(HIGH_WATER_MARK, limit);
        self
    }

    pub fn with_allow_half_open(mut self, enabled: bool) -> Self {
        self.set(ALLOW_HALF_OPEN, enabled);
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.set(ENCODING, encoding.as_str());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<Value>) -> Self {
        self.set(PLACEHOLDER, placeholder);
        self
    }

    /// Copy of these options restricted to [`RECOGNIZED_OPTIONS`]
    pub fn filtered(&self) -> Self {
        let mut copy = Self::new();
        for name in RECOGNIZED_OPTIONS {
            if let Some(value) = self.entries.get(name) {
                copy.entries.insert(name.to_string(), value.clone());
            }
        }
        copy
    }

    /// Validate the options and apply defaults
    pub fn validate(&self) -> ConfigResult<StreamConfig> {
        let object_mode = self.bool_option(OBJECT_MODE)?.unwrap_or(false);
        let allow_half_open = self.bool_option(ALLOW_HALF_OPEN)?.unwrap_or(true);

        let high_water_mark = match self.entries.get(HIGH_WATER_MARK) {
            None => {
                if object_mode {
                    DEFAULT_OBJECT_HIGH_WATER_MARK
                } else {
                    DEFAULT_HIGH_WATER_MARK
                }
            }
            Some(value) => {
                let limit = value.as_f64().ok_or_else(|| {
                    ConfigError::type_mismatch(HIGH_WATER_MARK, "number", value)
                })?;
                if limit.is_nan() || limit < 0.0 {
                    return Err(ConfigError::out_of_range(
                        HIGH_WATER_MARK,
                        "a non-negative number",
                        value,
                    ));
                }
                limit.floor() as usize
            }
        };

        let encoding = match self.entries.get(ENCODING) {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name.parse::<Encoding>()?),
            Some(other) => return Err(ConfigError::type_mismatch(ENCODING, "string", other)),
        };

        let placeholder = match self.entries.get(PLACEHOLDER) {
            None => DEFAULT_PLACEHOLDER.to_string(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        };

        Ok(StreamConfig {
            object_mode,
            high_water_mark,
            allow_half_open,
            encoding,
            decode_strings: false,
            placeholder,
        })
    }

    fn bool_option(&self, name: &'static str) -> ConfigResult<Option<bool>> {
        match self.entries.get(name) {
            None => Ok(None),
            Some(Value::Bool(flag)) => Ok(Some(*flag)),
            Some(other) => Err(ConfigError::type_mismatch(name, "boolean", other)),
        }
    }
}

/// Validated, immutable stream configuration
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Accept structured values on the writable side
    pub object_mode: bool,
    /// Readable queue length at which writers are asked to wait
    pub high_water_mark: usize,
    /// Keep the writable side open after the readable side ends
    pub allow_half_open: bool,
    /// Default encoding hint for writes
    pub encoding: Option<Encoding>,
    /// Always false: strings are never re-decoded into bytes
    pub decode_strings: bool,
    /// Text emitted for absent chunks
    pub placeholder: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            object_mode: false,
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
            allow_half_open: true,
            encoding: None,
            decode_strings: false,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}
