//! Builder API for layered configuration.

use std::marker::PhantomData;
use std::string::String;
use std::sync::Arc;

use camino::Utf8PathBuf;

use crate::error::BindError;
use crate::layers::{
    env::{EnvConfig, EnvConfigBuilder},
    file::FileConfig,
};
use crate::materialized::Configuration;
use crate::schema::Contract;
use crate::store::Layer;

/// Start configuring the layers a `T` is bound from.
///
/// This call is fallible because it validates `T`'s contract up front: empty or duplicate
/// keys are rejected before any layer is read.
///
/// ```rust
/// use agentcfg::{AgentConfiguration, Driver, builder};
///
/// let config = builder::<AgentConfiguration>()
///     .unwrap()
///     .file(|f| f.content("agent.instrument.include=com.acme\n", "agent.properties"))
///     .overrides([("agent.instrument.debug", "true")])
///     .build();
///
/// let output = Driver::new(config).run().unwrap();
/// assert_eq!(output.value.include_packages, ["com.acme"]);
/// assert!(output.value.debug_instrumentation);
/// ```
pub fn builder<T>() -> Result<ConfigBuilder<T>, BindError>
where
    T: Configuration,
{
    let contract = T::contract();
    contract.validate()?;
    Ok(ConfigBuilder {
        _phantom: PhantomData,
        contract: Arc::new(contract),
        env_config: None,
        file_config: None,
        overrides: Layer::new(),
    })
}

/// Builder for layered configuration.
pub struct ConfigBuilder<T> {
    _phantom: PhantomData<T>,
    /// Validated contract for the target type.
    contract: Arc<Contract>,
    /// Environment parsing settings, if the user configured that layer.
    env_config: Option<EnvConfig>,
    /// File parsing settings, if the user configured that layer.
    file_config: Option<FileConfig>,
    /// Explicit overrides (highest priority).
    overrides: Layer,
}

/// Fully built configuration (contract + sources) for the driver.
pub struct Config<T> {
    /// Validated contract for the target type.
    pub contract: Arc<Contract>,
    /// Environment parsing settings, if provided.
    pub env_config: Option<EnvConfig>,
    /// File parsing settings, if provided.
    pub file_config: Option<FileConfig>,
    /// Explicit overrides.
    pub overrides: Layer,
    /// Type marker.
    _phantom: PhantomData<T>,
}

impl<T> ConfigBuilder<T> {
    /// Configure environment variable parsing.
    pub fn env<F>(mut self, f: F) -> Self
    where
        F: FnOnce(EnvConfigBuilder) -> EnvConfigBuilder,
    {
        self.env_config = Some(f(EnvConfigBuilder::new()).build());
        self
    }

    /// Configure properties file parsing.
    pub fn file<F>(mut self, f: F) -> Self
    where
        F: FnOnce(FileConfigBuilder) -> FileConfigBuilder,
    {
        self.file_config = Some(f(FileConfigBuilder::new()).build());
        self
    }

    /// Add explicit overrides. Repeated calls accumulate; a later key replaces an earlier one.
    pub fn overrides<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in Layer::from_overrides(pairs).iter() {
            self.overrides
                .insert(key, value.value.clone(), value.provenance.clone());
        }
        self
    }

    /// Finalize the builder and return a Config for use with the Driver.
    ///
    /// After calling this, create a `Driver` and call `run()`:
    /// ```ignore
    /// let config = builder::<MyConfig>()?.env(...).file(...).build();
    /// let output = Driver::new(config).run()?;
    /// ```
    pub fn build(self) -> Config<T> {
        Config {
            contract: self.contract,
            env_config: self.env_config,
            file_config: self.file_config,
            overrides: self.overrides,
            _phantom: PhantomData,
        }
    }
}

// ============================================================================
// File Configuration Builder
// ============================================================================

/// Builder for file configuration.
#[derive(Default)]
pub struct FileConfigBuilder {
    config: FileConfig,
}

impl FileConfigBuilder {
    /// Create a new file config builder.
    pub fn new() -> Self {
        Self {
            config: FileConfig::default(),
        }
    }

    /// Add a candidate path. Candidates are tried in the order they were added.
    pub fn path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.config = self.config.path(path);
        self
    }

    /// Add several candidate paths.
    ///
    /// These are checked in order; the first existing file is used.
    pub fn default_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Utf8PathBuf>,
    {
        for path in paths {
            self.config = self.config.path(path);
        }
        self
    }

    /// Set inline content for testing (avoids disk I/O).
    ///
    /// The filename is what provenance and dumps report.
    pub fn content(mut self, content: impl Into<String>, filename: impl Into<Utf8PathBuf>) -> Self {
        self.config = self.config.content(content, filename);
        self
    }

    /// Build the file configuration.
    fn build(self) -> FileConfig {
        self.config
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindErrorKind;
    use crate::materialized::MaterializedConfig;
    use crate::schema::{OptionDescriptor, ResultType};

    struct Broken;

    impl Configuration for Broken {
        fn contract() -> Contract {
            Contract::new("Broken")
                .with_option(OptionDescriptor::new("a", ResultType::string()))
                .with_option(OptionDescriptor::new("a", ResultType::bool()))
        }

        fn from_config(_: &MaterializedConfig) -> Result<Self, BindError> {
            Ok(Broken)
        }
    }

    struct Port(i32);

    impl Configuration for Port {
        fn contract() -> Contract {
            Contract::new("Port")
                .with_option(OptionDescriptor::new("port", ResultType::i32()).default_value("80"))
        }

        fn from_config(config: &MaterializedConfig) -> Result<Self, BindError> {
            Ok(Port(config.extract("port")?))
        }
    }

    #[test]
    fn test_builder_rejects_invalid_contract() {
        let err = builder::<Broken>().err().expect("duplicate key");
        assert!(matches!(err.kind, BindErrorKind::InvalidContract { .. }));
    }

    #[test]
    fn test_env_config_builder() {
        let config = builder::<Port>()
            .unwrap()
            .env(|e| e.prefix("MYAPP"))
            .build();

        assert_eq!(config.env_config.map(|e| e.prefix), Some("MYAPP".to_string()));
        assert!(config.file_config.is_none());
    }

    #[test]
    fn test_file_config_builder() {
        let config = FileConfigBuilder::new()
            .path("agent.properties")
            .default_paths(["./agent.properties", "/etc/agent/agent.properties"])
            .build();

        assert_eq!(config.paths.len(), 3);
        assert_eq!(config.paths[0], Utf8PathBuf::from("agent.properties"));
        assert!(config.inline.is_none());
    }

    #[test]
    fn test_overrides_accumulate() {
        let config = builder::<Port>()
            .unwrap()
            .overrides([("port", "1"), ("other", "x")])
            .overrides([("port", "2")])
            .build();

        assert_eq!(config.overrides.len(), 2);
        let port = config.overrides.get("port").unwrap();
        assert_eq!(port.value, "2");
        assert!(port.provenance.is_override());
    }
}
