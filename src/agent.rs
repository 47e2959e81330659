//! The agent's own configuration contract and startup sequence.
//!
//! [`AgentConfiguration`] is bound like any other [`Configuration`]. [`Agent::start`] takes the
//! driver's output and turns it into the pieces the instrumentation engine consumes: the
//! typed settings, the [`ScopeResolver`] and the loaded instrumenters.

use std::string::String;
use std::vec::Vec;

use crate::driver::{DriverOutput, DriverReport};
use crate::error::BindError;
use crate::macros::{debug, info};
use crate::materialized::{Configuration, MaterializedConfig};
use crate::registry::{InstrumenterFactory, InstrumenterRegistry};
use crate::schema::{Contract, OptionDescriptor, ResultType};
use crate::scope::{ScopeResolver, ScopeSet};

/// `agent.active`
pub const ACTIVE: &str = "agent.active";
/// `agent.instrument.exclude`
pub const EXCLUDE: &str = "agent.instrument.exclude";
/// `agent.instrument.excludeContaining`
pub const EXCLUDE_CONTAINING: &str = "agent.instrument.excludeContaining";
/// `agent.instrument.include`
pub const INCLUDE: &str = "agent.instrument.include";
/// `agent.instrument.runtimeAttach`
pub const RUNTIME_ATTACH: &str = "agent.instrument.runtimeAttach";
/// `agent.instrument.exportGeneratedClassesWithName`
pub const EXPORT_GENERATED_CLASSES_WITH_NAME: &str =
    "agent.instrument.exportGeneratedClassesWithName";
/// `agent.instrument.debug`
pub const DEBUG: &str = "agent.instrument.debug";
/// `agent.instrument.excludedInstrumenter`
pub const EXCLUDED_INSTRUMENTER: &str = "agent.instrument.excludedInstrumenter";

/// Settings of the agent itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfiguration {
    /// If `false` the agent is completely deactivated.
    pub active: bool,
    /// Package prefixes carved back out of an include.
    pub exclude_packages: Vec<String>,
    /// Substrings that exclude any name containing them.
    pub exclude_containing: Vec<String>,
    /// Package prefixes to instrument.
    pub include_packages: Vec<String>,
    /// Attach at runtime instead of requiring a startup flag.
    pub attach_at_runtime: bool,
    /// Names whose transformed artifacts are exported for debugging.
    pub export_classes_with_name: Vec<String>,
    /// Log additional information during instrumentation.
    pub debug_instrumentation: bool,
    /// Simple names of instrumenters that should not be applied.
    pub excluded_instrumenters: Vec<String>,
}

impl AgentConfiguration {
    /// The include/exclude lists as a [`ScopeSet`].
    pub fn scope_set(&self) -> ScopeSet {
        ScopeSet::new(
            self.include_packages.iter().cloned(),
            self.exclude_packages.iter().cloned(),
            self.exclude_containing.iter().cloned(),
        )
    }

    /// A resolver over [`scope_set`](Self::scope_set).
    pub fn scope_resolver(&self) -> ScopeResolver {
        ScopeResolver::new(self.scope_set())
    }

    /// Whether the instrumenter with this simple name is excluded.
    pub fn is_instrumenter_excluded(&self, name: &str) -> bool {
        self.excluded_instrumenters.iter().any(|e| e == name)
    }

    /// Whether the agent should attach at runtime.
    pub fn should_attach(&self) -> bool {
        self.active && self.attach_at_runtime
    }
}

fn list(key: &str) -> OptionDescriptor {
    OptionDescriptor::new(key, ResultType::sequence(ResultType::string())).default_value("")
}

impl Configuration for AgentConfiguration {
    fn contract() -> Contract {
        Contract::new("AgentConfiguration")
            .with_option(
                OptionDescriptor::new(ACTIVE, ResultType::bool())
                    .default_value("true")
                    .label("Activate agent")
                    .description("If set to `false` the agent will be completely deactivated."),
            )
            .with_option(
                list(EXCLUDE)
                    .label("Excluded packages")
                    .description("Exclude packages and their sub-packages from the instrumentation."),
            )
            .with_option(list(EXCLUDE_CONTAINING).label("Exclude containing").description(
                "Exclude names that contain one of the following strings from the instrumentation.",
            ))
            .with_option(list(INCLUDE).label("Included packages").description(
                "The packages that should be included for instrumentation. All sub-packages of \
                 the listed packages are included automatically; exclude them again via \
                 `agent.instrument.exclude`. Example: `org.somecompany.package,com.someothercompany`",
            ))
            .with_option(
                OptionDescriptor::new(RUNTIME_ATTACH, ResultType::bool())
                    .default_value("true")
                    .label("Attach agent at runtime")
                    .description("Attach the agent at runtime and re-transform everything already loaded."),
            )
            .with_option(
                list(EXPORT_GENERATED_CLASSES_WITH_NAME)
                    .label("Export generated classes with name")
                    .description(
                        "Fully qualified names whose transformed artifacts are exported to the file \
                         system, to debug problems inside the generated code.",
                    ),
            )
            .with_option(
                OptionDescriptor::new(DEBUG, ResultType::bool())
                    .default_value("false")
                    .label("Debug instrumentation")
                    .description("Log additional information and warnings during instrumentation."),
            )
            .with_option(
                list(EXCLUDED_INSTRUMENTER)
                    .label("Excluded instrumenters")
                    .description("Simple names of instrumenters that should not be applied."),
            )
    }

    fn from_config(config: &MaterializedConfig) -> Result<Self, BindError> {
        Ok(Self {
            active: config.extract(ACTIVE)?,
            exclude_packages: config.extract(EXCLUDE)?,
            exclude_containing: config.extract(EXCLUDE_CONTAINING)?,
            include_packages: config.extract(INCLUDE)?,
            attach_at_runtime: config.extract(RUNTIME_ATTACH)?,
            export_classes_with_name: config.extract(EXPORT_GENERATED_CLASSES_WITH_NAME)?,
            debug_instrumentation: config.extract(DEBUG)?,
            excluded_instrumenters: config.extract(EXCLUDED_INSTRUMENTER)?,
        })
    }
}

/// A started agent: settings, scope and instrumenters, ready for the engine.
#[derive(Debug)]
pub struct Agent {
    configuration: AgentConfiguration,
    report: DriverReport,
    resolver: ScopeResolver,
    instrumenters: InstrumenterRegistry,
}

impl Agent {
    /// Start from a driver run.
    ///
    /// Logs the configuration descriptor when debug instrumentation is on. Instrumenters are
    /// only loaded for an active agent; excluded ones are skipped and failing ones recorded.
    pub fn start<I>(output: DriverOutput<AgentConfiguration>, factories: I) -> Self
    where
        I: IntoIterator<Item = InstrumenterFactory>,
    {
        let (configuration, report) = output.into_parts();

        if configuration.debug_instrumentation {
            info!("agent configuration:\n{}", report.config);
        }

        let resolver = configuration.scope_resolver();
        let instrumenters = if configuration.active {
            InstrumenterRegistry::load(
                factories,
                &configuration.excluded_instrumenters,
                configuration.debug_instrumentation,
            )
        } else {
            debug!("agent inactive; no instrumenters loaded");
            InstrumenterRegistry::default()
        };

        Self {
            configuration,
            report,
            resolver,
            instrumenters,
        }
    }

    /// The typed settings.
    pub fn configuration(&self) -> &AgentConfiguration {
        &self.configuration
    }

    /// The bound configuration, with provenance.
    pub fn materialized(&self) -> &MaterializedConfig {
        &self.report.config
    }

    /// The driver report the agent was started from.
    pub fn report(&self) -> &DriverReport {
        &self.report
    }

    /// The scope resolver built from the include/exclude lists.
    pub fn resolver(&self) -> &ScopeResolver {
        &self.resolver
    }

    /// The loaded instrumenters.
    pub fn instrumenters(&self) -> &InstrumenterRegistry {
        &self.instrumenters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{bind, bind_as};
    use crate::builder::builder;
    use crate::driver::Driver;
    use crate::registry::Instrumenter;
    use crate::store::PropertyStore;

    struct Named(&'static str);

    impl Instrumenter for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    fn factories() -> Vec<InstrumenterFactory> {
        ["Jdbc", "Http"]
            .into_iter()
            .map(|name| InstrumenterFactory::infallible(name, move || Named(name)))
            .collect()
    }

    fn start(overrides: &[(&str, &str)]) -> Agent {
        let config = builder::<AgentConfiguration>()
            .unwrap()
            .overrides(overrides.iter().copied())
            .build();
        Agent::start(Driver::new(config).run().unwrap(), factories())
    }

    #[test]
    fn test_defaults() {
        let config: AgentConfiguration = bind_as(&PropertyStore::new()).unwrap();

        assert_eq!(
            config,
            AgentConfiguration {
                active: true,
                exclude_packages: vec![],
                exclude_containing: vec![],
                include_packages: vec![],
                attach_at_runtime: true,
                export_classes_with_name: vec![],
                debug_instrumentation: false,
                excluded_instrumenters: vec![],
            }
        );
        assert!(config.should_attach());
    }

    #[test]
    fn test_lists_and_flags() {
        let store = PropertyStore::from_pairs([
            (INCLUDE, "com.acme,org.example"),
            (EXCLUDE, "com.acme.internal"),
            (EXCLUDE_CONTAINING, "$$Proxy"),
            (RUNTIME_ATTACH, "FALSE"),
            (EXCLUDED_INSTRUMENTER, "Http"),
        ]);
        let config: AgentConfiguration = bind_as(&store).unwrap();

        assert_eq!(config.include_packages, ["com.acme", "org.example"]);
        assert!(!config.attach_at_runtime);
        assert!(!config.should_attach());
        assert!(config.is_instrumenter_excluded("Http"));
        assert!(!config.is_instrumenter_excluded("Jdbc"));

        let resolver = config.scope_resolver();
        assert!(!resolver.should_ignore("com.acme.Service"));
        assert!(resolver.should_ignore("com.acme.internal.Cache"));
        assert!(resolver.should_ignore("com.acme.Service$$Proxy1"));
        assert!(!resolver.should_ignore("net.other.Thing"));
    }

    #[test]
    fn test_descriptor() {
        let store = PropertyStore::from_pairs([(INCLUDE, "com.acme")]);
        let config = bind(&store, &AgentConfiguration::contract()).unwrap();

        insta::assert_snapshot!(config.to_string(), @r#"
        AgentConfiguration {
            agent.active = true
            agent.instrument.exclude = []
            agent.instrument.excludeContaining = []
            agent.instrument.include = ["com.acme"]
            agent.instrument.runtimeAttach = true
            agent.instrument.exportGeneratedClassesWithName = []
            agent.instrument.debug = false
            agent.instrument.excludedInstrumenter = []
        }
        "#);
    }

    #[test]
    fn test_start_loads_instrumenters() {
        let agent = start(&[(EXCLUDED_INSTRUMENTER, "Http"), (DEBUG, "true")]);

        assert_eq!(agent.instrumenters().names(), ["Jdbc"]);
        assert_eq!(agent.instrumenters().excluded(), ["Http"]);
        assert!(agent.configuration().debug_instrumentation);
        assert!(
            agent
                .materialized()
                .provenance(DEBUG)
                .is_some_and(|p| p.is_override())
        );
    }

    #[test]
    fn test_inactive_agent_loads_nothing() {
        let agent = start(&[(ACTIVE, "false")]);

        assert!(agent.instrumenters().active().is_empty());
        assert!(!agent.configuration().should_attach());
    }
}
