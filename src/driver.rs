//! Driver API for orchestrating layered loading, binding and diagnostics.
//!
//! # Phases
//! 1. **Load layers**: env, then the properties file, then explicit overrides
//! 2. **Stack** them into a [`PropertyStore`] by priority (overrides > file > env > defaults)
//! 3. **Bind** the contract against the store
//! 4. **Populate** the target type from the bound configuration
#![allow(clippy::result_large_err)]

use std::io::{self, Write};
use std::marker::PhantomData;
use std::string::String;
use std::vec::Vec;

use crate::binder::bind_shared;
use crate::builder::Config;
use crate::dump::{DumpSources, dump_config};
use crate::error::DriverError;
use crate::layers::{env::parse_env, file::load_file};
use crate::macros::{debug, warning};
use crate::materialized::{Configuration, MaterializedConfig};
use crate::provenance::FileResolution;
use crate::store::PropertyStore;

/// Primary driver type that loads layers and binds `T` against them.
pub struct Driver<T> {
    config: Config<T>,
    _phantom: PhantomData<T>,
}

impl<T: Configuration> Driver<T> {
    /// Create a driver from a fully built config.
    pub fn new(config: Config<T>) -> Self {
        Self {
            config,
            _phantom: PhantomData,
        }
    }

    /// Execute the driver.
    ///
    /// Layer problems that do not stop loading (malformed environment variable names, no
    /// properties file found) end up in [`DriverReport::diagnostics`].
    pub fn run(self) -> Result<DriverOutput<T>, DriverError> {
        let Config {
            contract,
            env_config,
            file_config,
            overrides,
            ..
        } = self.config;

        let mut diagnostics = Vec::new();
        let mut store = PropertyStore::new();

        // Phase 1: load each layer, lowest priority first.
        let env_prefix = env_config.as_ref().map(|c| c.prefix.clone());
        if let Some(env_config) = &env_config {
            let output = parse_env(env_config, env_config.source());
            for message in output.diagnostics {
                warning!("{message}");
                diagnostics.push(Diagnostic::warning(message));
            }
            store = store.with_sourced_layer(output.layer);
        }

        let mut file_resolution = None;
        if let Some(file_config) = &file_config {
            let load = load_file(file_config)?;
            if load.resolution.picked().is_none() {
                diagnostics.push(Diagnostic::note(format!(
                    "no properties file found among {} candidate(s)",
                    load.resolution.paths.len()
                )));
            }
            store = store.with_sourced_layer(load.layer);
            file_resolution = Some(load.resolution);
        }

        let override_count = overrides.len();
        if !overrides.is_empty() {
            store = store.with_sourced_layer(overrides);
        }

        debug!(
            contract = contract.name(),
            layers = store.layer_count(),
            "driver: layers stacked"
        );

        // Phase 2: bind and populate.
        let config = bind_shared(&store, contract)?;
        let value = T::from_config(&config)?;

        Ok(DriverOutput {
            value,
            report: DriverReport {
                config,
                store,
                file_resolution,
                env_prefix,
                override_count,
                diagnostics,
            },
        })
    }
}

/// Successful driver output: a typed value plus an execution report.
#[derive(Debug)]
pub struct DriverOutput<T> {
    /// The fully-typed value.
    pub value: T,
    /// Diagnostics and metadata produced by the driver.
    pub report: DriverReport,
}

impl<T> DriverOutput<T> {
    /// Get the value, printing any warnings to stderr.
    pub fn get(self) -> T {
        self.print_warnings();
        self.value
    }

    /// Get the value silently (no warning output).
    pub fn get_silent(self) -> T {
        self.value
    }

    /// Get value and report separately.
    pub fn into_parts(self) -> (T, DriverReport) {
        (self.value, self.report)
    }

    /// Print any warnings to stderr.
    pub fn print_warnings(&self) {
        for diagnostic in &self.report.diagnostics {
            if diagnostic.severity == Severity::Warning {
                eprintln!("{}: {}", diagnostic.severity.as_str(), diagnostic.message);
            }
        }
    }
}

/// Full report of the driver execution.
#[derive(Debug)]
pub struct DriverReport {
    /// The bound configuration, with provenance for every value.
    pub config: MaterializedConfig,
    /// The stacked store the configuration was bound from.
    pub store: PropertyStore,
    /// File resolution metadata (paths tried, picked, etc), if a file layer was configured.
    pub file_resolution: Option<FileResolution>,
    /// Prefix of the env layer, if one was configured.
    pub env_prefix: Option<String>,
    /// Number of explicit overrides.
    pub override_count: usize,
    /// Diagnostics emitted while loading.
    pub diagnostics: Vec<Diagnostic>,
}

impl DriverReport {
    /// Write a colored, column-aligned dump of every bound value and where it came from.
    pub fn dump(&self, w: &mut impl Write) -> io::Result<()> {
        let sources = DumpSources {
            file_resolution: self.file_resolution.as_ref(),
            env_prefix: self.env_prefix.as_deref(),
            override_count: self.override_count,
        };
        dump_config(w, &self.config, &sources)
    }

    /// [`dump`](Self::dump) into a string.
    pub fn dump_string(&self) -> String {
        let mut out = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = self.dump(&mut out);
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Render diagnostics one per line.
    pub fn render_pretty(&self) -> String {
        let mut out = String::new();
        for diagnostic in &self.diagnostics {
            out.push_str(diagnostic.severity.as_str());
            out.push_str(": ");
            out.push_str(&diagnostic.message);
            out.push('\n');
        }
        out
    }
}

impl core::fmt::Display for DriverReport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.render_pretty())
    }
}

/// A diagnostic message produced by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Human-readable message.
    pub message: String,
    /// Diagnostic severity.
    pub severity: Severity,
}

impl Diagnostic {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    fn note(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Note,
        }
    }
}

/// Severity for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Something was ignored that probably should not have been.
    Warning,
    /// Informational note.
    Note,
}

impl Severity {
    fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }
}
