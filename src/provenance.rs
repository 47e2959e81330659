//! Provenance tracking for layered configuration.
//!
//! This module provides types for tracking where configuration values came from,
//! enabling rich error messages and debugging output.
//!
//! # Example
//!
//! ```rust
//! use agentcfg::provenance::{ConfigFile, Provenance};
//! use std::sync::Arc;
//!
//! // Track a value from an explicit override
//! let override_prov = Provenance::overridden("agent.instrument.debug");
//!
//! // Track a value from the environment
//! let env_prov = Provenance::env("AGENT__INSTRUMENT__DEBUG", "true");
//!
//! // Track a value from a properties file
//! let file = Arc::new(ConfigFile::new("agent.properties", "agent.active=false\n"));
//! let file_prov = Provenance::file(file, "agent.active", 1);
//!
//! assert!(override_prov.priority() > file_prov.priority());
//! assert!(file_prov.priority() > env_prov.priority());
//! ```

use std::string::String;
use std::sync::Arc;
use std::vec::Vec;

use camino::Utf8PathBuf;

/// Information about a loaded properties file.
///
/// This is reference-counted so it can be shared across all values
/// that originated from the same file without duplicating the path
/// and contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// Path to the properties file (UTF-8).
    pub path: Utf8PathBuf,
    /// Full contents of the file (kept for error reporting).
    pub contents: String,
}

impl ConfigFile {
    /// Create a new ConfigFile from a path and contents.
    pub fn new(path: impl Into<Utf8PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// The origin of a configuration value.
///
/// This tracks where a value came from in the layered configuration system,
/// enabling detailed error messages and config dumps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Provenance {
    /// Value was set explicitly by the host process.
    Override {
        /// The key that was overridden, e.g. "agent.instrument.debug".
        key: String,
    },

    /// Value came from an environment variable.
    Env {
        /// The environment variable name, e.g. "AGENT__ACTIVE".
        var: String,
        /// The raw value from the environment.
        value: String,
    },

    /// Value came from a properties file.
    File {
        /// The properties file (shared reference).
        file: Arc<ConfigFile>,
        /// The key as written in the file, e.g. "agent.instrument.include".
        key_path: String,
        /// 1-based line on which the entry starts.
        line: usize,
    },

    /// Value came from the option's declared default.
    #[default]
    Default,
}

impl Provenance {
    /// Create an override provenance.
    pub fn overridden(key: impl Into<String>) -> Self {
        Self::Override { key: key.into() }
    }

    /// Create an environment variable provenance.
    pub fn env(var: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Env {
            var: var.into(),
            value: value.into(),
        }
    }

    /// Create a file provenance.
    pub fn file(file: Arc<ConfigFile>, key_path: impl Into<String>, line: usize) -> Self {
        Self::File {
            file,
            key_path: key_path.into(),
            line,
        }
    }

    /// Check if this provenance is an explicit override.
    pub fn is_override(&self) -> bool {
        matches!(self, Self::Override { .. })
    }

    /// Check if this provenance is from environment.
    pub fn is_env(&self) -> bool {
        matches!(self, Self::Env { .. })
    }

    /// Check if this provenance is from a file.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }

    /// Check if this provenance is a default value.
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// Get the priority of this provenance source.
    ///
    /// Higher numbers mean higher priority:
    /// - Override: 3 (highest)
    /// - File: 2
    /// - Env: 1
    /// - Default: 0 (lowest)
    pub fn priority(&self) -> u8 {
        match self {
            Self::Override { .. } => 3,
            Self::File { .. } => 2,
            Self::Env { .. } => 1,
            Self::Default => 0,
        }
    }

    /// Get a human-readable description of the source.
    pub fn source_description(&self) -> String {
        match self {
            Self::Override { key } => format!("override: {key}"),
            Self::Env { var, .. } => format!("env: {var}"),
            Self::File { file, line, .. } => format!("{}:{line}", file.path),
            Self::Default => "default".into(),
        }
    }
}

impl core::fmt::Display for Provenance {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Override { key } => write!(f, "from explicit override of {key}"),
            Self::Env { var, .. } => write!(f, "from environment variable {var}"),
            Self::File {
                file,
                key_path,
                line,
            } => {
                write!(f, "from {}:{line}: {key_path}", file.path)
            }
            Self::Default => write!(f, "from default"),
        }
    }
}

/// Status of a properties file path during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilePathStatus {
    /// Path was picked and loaded successfully.
    Picked,
    /// Path was not tried because an earlier candidate was picked.
    NotTried,
    /// Path does not exist.
    Absent,
}

/// Information about properties file path resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePathResolution {
    /// The path that was checked.
    pub path: Utf8PathBuf,

    /// The status of this path.
    pub status: FilePathStatus,
}

/// Result of properties file resolution, tracking all paths that were considered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileResolution {
    /// All paths that were considered, in order.
    pub paths: Vec<FilePathResolution>,
}

impl FileResolution {
    /// Create a new empty file resolution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a candidate path and what happened to it.
    pub fn add(&mut self, path: Utf8PathBuf, status: FilePathStatus) {
        self.paths.push(FilePathResolution { path, status });
    }

    /// The path that was loaded, if any.
    pub fn picked(&self) -> Option<&Utf8PathBuf> {
        self.paths
            .iter()
            .find(|p| p.status == FilePathStatus::Picked)
            .map(|p| &p.path)
    }
}
