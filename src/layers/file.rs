//! Properties file layer.
//!
//! Reads the first existing file among a list of candidate paths and parses it with
//! `.properties` syntax:
//!
//! ```text
//! # comment
//! ! also a comment
//! agent.active = false
//! agent.instrument.include: com.acme,\
//!                           org.example
//! key\ with\ spaces value
//! ```
//!
//! Keys end at the first unescaped `=`, `:` or whitespace. A line ending in an odd number
//! of backslashes continues on the next line. Escapes `\t \n \r \f \uXXXX` are decoded and
//! any other escaped character stands for itself. Missing files are skipped.

use std::string::String;
use std::sync::Arc;
use std::vec::Vec;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::LoadError;
use crate::macros::debug;
use crate::provenance::{ConfigFile, FilePathStatus, FileResolution, Provenance};
use crate::store::Layer;

// ============================================================================
// File Configuration
// ============================================================================

/// Configuration for the properties file layer.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    /// Candidate paths, tried in order. The first existing one is loaded.
    pub paths: Vec<Utf8PathBuf>,

    /// Inline contents used instead of reading from disk (for testing).
    pub inline: Option<ConfigFile>,
}

impl FileConfig {
    /// Create a new, empty file configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate path.
    pub fn path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.paths.push(path.into());
        self
    }

    /// Use inline contents instead of any path; `filename` shows up in provenance.
    pub fn content(mut self, contents: impl Into<String>, filename: impl Into<Utf8PathBuf>) -> Self {
        self.inline = Some(ConfigFile::new(filename, contents));
        self
    }
}

/// Outcome of loading the file layer.
#[derive(Debug, Default)]
pub struct FileLoad {
    /// Properties from the picked file; empty if none was found.
    pub layer: Layer,
    /// Which candidate paths were considered and what happened to each.
    pub resolution: FileResolution,
}

/// Load the first existing candidate file.
pub fn load_file(config: &FileConfig) -> Result<FileLoad, LoadError> {
    let mut load = FileLoad::default();

    if let Some(inline) = &config.inline {
        let file = Arc::new(inline.clone());
        load.layer = parse_properties(&file)?;
        load.resolution.add(inline.path.clone(), FilePathStatus::Picked);
        debug!(path = %inline.path, entries = load.layer.len(), "file: parsed inline contents");
        return Ok(load);
    }

    let mut picked = false;

    for path in &config.paths {
        if picked {
            load.resolution.add(path.clone(), FilePathStatus::NotTried);
            continue;
        }
        if !path.is_file() {
            load.resolution.add(path.clone(), FilePathStatus::Absent);
            continue;
        }

        let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let file = Arc::new(ConfigFile::new(path.clone(), contents));
        load.layer = parse_properties(&file)?;
        load.resolution.add(path.clone(), FilePathStatus::Picked);
        picked = true;

        debug!(path = %path, entries = load.layer.len(), "file: loaded properties");
    }

    Ok(load)
}

// ============================================================================
// Properties Syntax
// ============================================================================

/// Parse the contents of `file` into a layer, recording file and line provenance.
pub fn parse_properties(file: &Arc<ConfigFile>) -> Result<Layer, LoadError> {
    let mut layer = Layer::new();

    for (line, logical) in logical_lines(&file.contents) {
        let (raw_key, raw_value) = split_entry(&logical);
        let key = unescape(raw_key).map_err(|message| syntax(&file.path, line, message))?;
        let value = unescape(raw_value).map_err(|message| syntax(&file.path, line, message))?;
        let provenance = Provenance::file(Arc::clone(file), key.clone(), line);
        layer.insert(key, value, provenance);
    }

    Ok(layer)
}

fn syntax(path: &Utf8Path, line: usize, message: String) -> LoadError {
    LoadError::Syntax {
        path: path.to_path_buf(),
        line,
        message,
    }
}

/// Join continuation lines and drop blanks and comments.
///
/// Yields `(first physical line number, logical line without leading whitespace)`.
fn logical_lines(contents: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for (index, physical) in contents.lines().enumerate() {
        let trimmed = physical.trim_start();

        let (start, mut text) = match current.take() {
            Some((start, text)) => (start, text),
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                (index + 1, String::new())
            }
        };

        if ends_with_continuation(trimmed) {
            text.push_str(&trimmed[..trimmed.len() - 1]);
            current = Some((start, text));
        } else {
            text.push_str(trimmed);
            out.push((start, text));
        }
    }

    if let Some(pending) = current {
        out.push(pending);
    }
    out
}

fn ends_with_continuation(line: &str) -> bool {
    line.bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
}

/// Split a logical line into raw (still escaped) key and value.
fn split_entry(line: &str) -> (&str, &str) {
    let bytes = line.as_bytes();
    let mut key_end = bytes.len();
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' => escaped = true,
            b'=' | b':' | b' ' | b'\t' | b'\x0c' => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches([' ', '\t', '\x0c']);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches([' ', '\t', '\x0c']);
    }
    (key, rest)
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("malformed \\u escape: \\u{hex}"))?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}
