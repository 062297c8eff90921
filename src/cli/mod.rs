//! Command-line interface module

use clap::{Parser, ValueEnum};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::chunk::Chunk;
use crate::config::{Encoding, StreamOptions, HIGH_WATER_MARK, OBJECT_MODE};
use crate::error::{StreamError, StreamResult};
use crate::stream::{pump, StringifyStream};

/// Main CLI arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "tostring")]
#[command(about = "Convert every chunk of an input stream into a string, one per line")]
#[command(version = "0.1.0")]
#[command(long_about = None)]
pub struct Args {
    /// Input file (default: standard input)
    #[arg()]
    pub input: Option<PathBuf>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON file with stream options
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Treat the input as a sequence of JSON values instead of text lines
    #[arg(long)]
    pub object_mode: bool,

    /// Feed JSON null as an absent value (object mode only)
    #[arg(long, requires = "object_mode")]
    pub null_as_absent: bool,

    /// Text emitted for absent values (default: undefined)
    #[arg(long)]
    pub placeholder: Option<String>,

    /// Encoding hint passed with each chunk
    #[arg(long)]
    pub encoding: Option<EncodingArg>,

    /// Readable queue length that triggers draining
    #[arg(long)]
    pub high_water_mark: Option<usize>,

    /// Print chunk statistics to stderr
    #[arg(long)]
    pub stats: bool,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(long)]
    pub quiet: bool,
}

/// Encodings for CLI
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum EncodingArg {
    #[value(name = "utf8", alias = "utf-8")]
    Utf8,
    #[value(name = "utf16le", alias = "ucs2")]
    Utf16Le,
    #[value(name = "latin1", alias = "binary")]
    Latin1,
    Ascii,
    Base64,
    Hex,
}

impl From<EncodingArg> for Encoding {
    fn from(encoding: EncodingArg) -> Self {
        match encoding {
            EncodingArg::Utf8 => Encoding::Utf8,
            EncodingArg::Utf16Le => Encoding::Utf16Le,
            EncodingArg::Latin1 => Encoding::Latin1,
            EncodingArg::Ascii => Encoding::Ascii,
            EncodingArg::Base64 => Encoding::Base64,
            EncodingArg::Hex => Encoding::Hex,
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub args: Args,
    pub options: StreamOptions,
}

impl CliConfig {
    /// Create CLI configuration from arguments
    pub fn from_args(args: Args) -> StreamResult<Self> {
        let options = Self::create_stream_options(&args)?;
        Ok(Self { args, options })
    }

    /// Config file first, flags on top
    fn create_stream_options(args: &Args) -> StreamResult<StreamOptions> {
        let mut options = match &args.config {
            Some(path) => load_options(path)?,
            None => StreamOptions::new(),
        };

        if args.object_mode {
            options.set(OBJECT_MODE, true);
        }
        if let Some(placeholder) = &args.placeholder {
            options = options.with_placeholder(placeholder.as_str());
        }
        if let Some(encoding) = args.encoding {
            options = options.with_encoding(encoding.into());
        }
        if let Some(limit) = args.high_water_mark {
            options.set(HIGH_WATER_MARK, limit);
        }

        // Surface option errors before any input is read.
        options.validate()?;
        Ok(options)
    }

    pub fn is_quiet(&self) -> bool {
        self.args.quiet
    }

    pub fn want_stats(&self) -> bool {
        self.args.stats
    }

    /// Whether the effective options put the stream in object mode
    pub fn object_mode(&self) -> bool {
        self.options.get(OBJECT_MODE) == Some(&Value::Bool(true))
    }

    /// Get input source description
    pub fn input_description(&self) -> String {
        match &self.args.input {
            Some(path) => format!("'{}'", path.display()),
            None => "standard input".to_string(),
        }
    }

    /// Get output destination description
    pub fn output_description(&self) -> String {
        match &self.args.output {
            Some(path) => format!("'{}'", path.display()),
            None => "standard output".to_string(),
        }
    }
}

/// Read stream options from a JSON file
pub fn load_options(path: &Path) -> StreamResult<StreamOptions> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| StreamError::io(e.to_string(), Some(path.to_path_buf())))?;
    Ok(StreamOptions::from_json_str(&json)?)
}

/// Counters reported by `--stats`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub chunks_in: usize,
    pub strings_out: usize,
    pub bytes_out: usize,
    pub elapsed: Duration,
}

/// Install the fmt subscriber; `RUST_LOG` wins over `--verbose`
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Split raw input into chunks.
///
/// Text mode yields one byte chunk per line (without the line ending).
/// Object mode parses a sequence of JSON values.
pub fn parse_chunks(data: &[u8], object_mode: bool, null_as_absent: bool) -> StreamResult<Vec<Chunk>> {
    if !object_mode {
        let mut lines: Vec<&[u8]> = data.split(|b| *b == b'\n').collect();
        if lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        return Ok(lines
            .into_iter()
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            .map(|line| Chunk::Bytes(Bytes::copy_from_slice(line)))
            .collect());
    }

    let mut chunks = Vec::new();
    for value in serde_json::Deserializer::from_slice(data).into_iter::<Value>() {
        let value = value.map_err(StreamError::InputParse)?;
        chunks.push(match value {
            Value::Null if null_as_absent => Chunk::Absent,
            other => Chunk::from(other),
        });
    }
    Ok(chunks)
}

fn read_input(input: Option<&Path>) -> StreamResult<Vec<u8>> {
    match input {
        Some(path) => {
            std::fs::read(path).map_err(|e| StreamError::io(e.to_string(), Some(path.to_path_buf())))
        }
        None => {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .map_err(|e| StreamError::io(e.to_string(), None))?;
            Ok(buffer)
        }
    }
}

/// Stream `chunks` through a new stringify stream into `out`, one line each
pub fn stringify_to<W: Write>(
    options: &StreamOptions,
    chunks: Vec<Chunk>,
    out: &mut W,
) -> StreamResult<RunStats> {
    let start = Instant::now();
    let mut stream = StringifyStream::new(options.clone())?;
    let chunks_in = chunks.len();
    let mut bytes_out = 0;

    let strings_out = pump(&mut stream, chunks, |line| {
        bytes_out += line.len() + 1;
        writeln!(out, "{}", line).map_err(|e| StreamError::io(e.to_string(), None))
    })?;
    out.flush().map_err(|e| StreamError::io(e.to_string(), None))?;

    Ok(RunStats {
        chunks_in,
        strings_out,
        bytes_out,
        elapsed: start.elapsed(),
    })
}

/// Run the CLI end to end
pub fn run(config: &CliConfig) -> StreamResult<RunStats> {
    debug!(
        input = %config.input_description(),
        output = %config.output_description(),
        "starting"
    );
    let data = read_input(config.args.input.as_deref())?;
    let chunks = parse_chunks(&data, config.object_mode(), config.args.null_as_absent)?;

    let stats = match &config.args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StreamError::io(e.to_string(), Some(parent.to_path_buf())))?;
            }
            let file = std::fs::File::create(path)
                .map_err(|e| StreamError::io(e.to_string(), Some(path.clone())))?;
            let stats = stringify_to(&config.options, chunks, &mut BufWriter::new(file))?;
            CliUtils::show_success(
                &format!("Wrote {} strings to {}", stats.strings_out, path.display()),
                config.is_quiet(),
            );
            stats
        }
        None => {
            let stdout = std::io::stdout();
            stringify_to(&config.options, chunks, &mut BufWriter::new(stdout.lock()))?
        }
    };

    info!(chunks = stats.chunks_in, strings = stats.strings_out, "done");
    if config.want_stats() && !config.is_quiet() {
        CliUtils::show_stats(&stats);
    }
    Ok(stats)
}

/// CLI utilities and helpers
pub struct CliUtils;

impl CliUtils {
    /// Format a duration in human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_millis = duration.as_millis();

        if total_millis < 1000 {
            format!("{}ms", total_millis)
        } else if total_millis < 60_000 {
            format!("{:.1}s", total_millis as f64 / 1000.0)
        } else {
            let minutes = total_millis / 60_000;
            let seconds = (total_millis % 60_000) / 1000;
            format!("{}m {}s", minutes, seconds)
        }
    }

    /// Show a success message on stderr (if not in quiet mode)
    pub fn show_success(message: &str, quiet: bool) {
        if !quiet {
            eprintln!("✓ {}", message);
        }
    }

    /// Show an error message
    pub fn show_error(message: &str) {
        eprintln!("✗ {}", message);
    }

    pub fn show_stats(stats: &RunStats) {
        eprintln!("\nStream Statistics:");
        eprintln!("Chunks in: {}", stats.chunks_in);
        eprintln!("Strings out: {}", stats.strings_out);
        eprintln!("Bytes out: {}", stats.bytes_out);
        eprintln!("Processing time: {}", Self::format_duration(stats.elapsed));
    }
}

/// Handle CLI errors with user-friendly messages
pub fn handle_error(error: &StreamError) {
    CliUtils::show_error(&error.user_message());

    if let StreamError::InputParse(_) = error {
        eprintln!("\nTip: --object-mode expects JSON values, one after another");
    }

    eprintln!("\nTry 'tostring --help' for usage information.");
}
