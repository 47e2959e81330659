//! Environment variable layer.
//!
//! The process environment stands in for system properties: it is the lowest-precedence
//! layer of the store.
//!
//! # Naming Convention
//!
//! With a prefix like `"AGENT"`, only variables starting with `AGENT__` are read, and
//! their names are turned into dotted keys:
//!
//! - `AGENT__ACTIVE` → `agent.active`
//! - `AGENT__INSTRUMENT__RUNTIME_ATTACH` → `agent.instrument.runtimeAttach`
//! - `AGENT__INSTRUMENT__EXCLUDE_CONTAINING` → `agent.instrument.excludeContaining`
//!
//! Rules:
//! - The prefix, lowercased, becomes the first key segment (override with
//!   [`EnvConfigBuilder::key_prefix`])
//! - Double underscore (`__`) separates segments
//! - Each segment is converted to lowerCamelCase
//!
//! Without a prefix every variable is copied verbatim, name as key.

use std::string::String;
use std::vec::Vec;

use heck::ToLowerCamelCase;
use indexmap::IndexMap;

use crate::macros::{debug, trace};
use crate::provenance::Provenance;
use crate::store::Layer;

// ============================================================================
// EnvSource trait
// ============================================================================

/// Trait for abstracting over environment variable sources.
///
/// This allows testing without modifying the actual environment.
pub trait EnvSource {
    /// Iterate over all environment variables.
    fn vars(&self) -> Box<dyn Iterator<Item = (String, String)> + '_>;
}

/// Environment source that reads from the actual process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnv;

impl EnvSource for StdEnv {
    fn vars(&self) -> Box<dyn Iterator<Item = (String, String)> + '_> {
        Box::new(std::env::vars())
    }
}

/// Environment source backed by a map (for testing).
#[derive(Debug, Clone, Default)]
pub struct MockEnv {
    vars: IndexMap<String, String, std::hash::RandomState>,
}

impl MockEnv {
    /// Create a new empty mock environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock environment from an iterator of key-value pairs.
    pub fn from_pairs<I, K, V>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Set an environment variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }
}

impl EnvSource for MockEnv {
    fn vars(&self) -> Box<dyn Iterator<Item = (String, String)> + '_> {
        Box::new(self.vars.iter().map(|(k, v)| (k.clone(), v.clone())))
    }
}

// ============================================================================
// EnvConfig
// ============================================================================

/// Configuration for environment variable parsing.
pub struct EnvConfig {
    /// The prefix to look for (e.g., `AGENT`). Empty means "take every variable verbatim".
    pub prefix: String,

    /// First key segment for prefixed variables. Defaults to the lowercased prefix.
    pub key_prefix: Option<String>,

    /// Custom environment source (for testing). If None, uses StdEnv.
    pub source: Option<Box<dyn EnvSource>>,
}

impl EnvConfig {
    /// Create a new EnvConfig with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            key_prefix: None,
            source: None,
        }
    }

    /// Get the env source, or StdEnv if none set.
    pub fn source(&self) -> &dyn EnvSource {
        self.source.as_ref().map(|s| s.as_ref()).unwrap_or(&StdEnv)
    }

    fn effective_key_prefix(&self) -> String {
        self.key_prefix
            .clone()
            .unwrap_or_else(|| self.prefix.to_lowercase())
    }
}

/// Builder for environment variable configuration.
#[derive(Default)]
pub struct EnvConfigBuilder {
    prefix: String,
    key_prefix: Option<String>,
    source: Option<Box<dyn EnvSource>>,
}

impl EnvConfigBuilder {
    /// Create a new env config builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the environment variable prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the first key segment used for prefixed variables.
    pub fn key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(key_prefix.into());
        self
    }

    /// Use a custom environment source (for testing).
    pub fn source(mut self, source: impl EnvSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Build the env configuration.
    pub fn build(self) -> EnvConfig {
        EnvConfig {
            prefix: self.prefix,
            key_prefix: self.key_prefix,
            source: self.source,
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// A parsed layer plus anything worth warning about.
#[derive(Debug, Default)]
pub struct LayerOutput {
    /// The parsed properties.
    pub layer: Layer,
    /// Problems that did not stop parsing, such as malformed variable names.
    pub diagnostics: Vec<String>,
}

/// Read environment variables into a layer.
pub fn parse_env(env_config: &EnvConfig, source: &dyn EnvSource) -> LayerOutput {
    let mut output = LayerOutput::default();

    if env_config.prefix.is_empty() {
        for (name, value) in source.vars() {
            let provenance = Provenance::env(&name, &value);
            output.layer.insert(name, value, provenance);
        }
        debug!(entries = output.layer.len(), "env: copied environment verbatim");
        return output;
    }

    let prefix_with_sep = format!("{}__", env_config.prefix);
    let key_prefix = env_config.effective_key_prefix();

    for (name, value) in source.vars() {
        let Some(rest) = name.strip_prefix(&prefix_with_sep) else {
            continue;
        };

        if rest.is_empty() {
            output.diagnostics.push(format!(
                "invalid environment variable name: {name} (empty after prefix)"
            ));
            continue;
        }

        let segments: Vec<&str> = rest.split("__").collect();
        if segments.iter().any(|s| s.is_empty()) {
            output.diagnostics.push(format!(
                "invalid environment variable name: {name} (contains empty segment)"
            ));
            continue;
        }

        let mut key = key_prefix.clone();
        for segment in segments {
            if !key.is_empty() {
                key.push('.');
            }
            key.push_str(&segment.to_lower_camel_case());
        }

        trace!(var = %name, key = %key, "env: mapped variable");
        let provenance = Provenance::env(&name, &value);
        output.layer.insert(key, value, provenance);
    }

    debug!(
        prefix = %env_config.prefix,
        entries = output.layer.len(),
        diagnostics = output.diagnostics.len(),
        "env: parsed layer"
    );
    output
}
