//! File pipeline: load, normalize, and store a palette document
//!
//! Everything between the read and the write happens in memory. The write
//! goes through a temporary file in the destination directory that is renamed
//! over the destination, so a failed run never leaves a partial file behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;

use crate::document::{digest, Document};
use crate::normalizer::{normalize_document, NormalizeReport};
use crate::{Error, Result, DEFAULT_FILE};

/// What a run does with its result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Write the normalized document to the output path
    #[default]
    Write,
    /// Normalize in memory only and report whether anything would change
    Check,
}

/// Run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    /// Defaults to `input` when unset
    pub output: Option<PathBuf>,
    pub mode: Mode,
}

impl Default for Config {
    fn default() -> Self {
        Config::new(DEFAULT_FILE)
    }
}

impl Config {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Config {
            input: input.into(),
            output: None,
            mode: Mode::Write,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn output_path(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.input)
    }
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub report: NormalizeReport,
    /// SHA-256 of the normalized bytes
    pub digest: String,
    /// Normalized bytes differ from the input bytes
    pub changed: bool,
    pub written: bool,
}

/// Load, normalize and (in `Mode::Write`) store the document
///
/// # Errors
/// `Io` if the input cannot be read or the output cannot be written;
/// any parse or normalization error from the document itself. The output
/// path is untouched on every error.
pub fn run(config: &Config) -> Result<RunOutcome> {
    let source = read_source(&config.input)?;
    let mut doc = Document::parse(&source)?;
    let report = normalize_document(&mut doc)?;
    let rendered = doc.to_pretty_string()?;

    let changed = rendered != source;
    let output = config.output_path().to_path_buf();
    let written = match config.mode {
        Mode::Write => {
            write_atomic(&output, rendered.as_bytes())?;
            true
        }
        Mode::Check => false,
    };

    info!(
        input = %config.input.display(),
        output = %output.display(),
        records = report.records,
        changed,
        written,
        "normalized references"
    );

    Ok(RunOutcome {
        input: config.input.clone(),
        output,
        report,
        digest: digest(rendered.as_bytes()),
        changed,
        written,
    })
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Replace `path` with `bytes` via a sibling temp file and a rename
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(|e| Error::io(path, e))?;
    }
    tmp.write_all(bytes).map_err(|e| Error::io(path, e))?;
    tmp.as_file().sync_all().map_err(|e| Error::io(path, e))?;
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}
