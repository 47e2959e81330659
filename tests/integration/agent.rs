//! Agent startup: configuration, scope and instrumenters together.

use agentcfg::agent::{DEBUG, EXCLUDED_INSTRUMENTER, INCLUDE};
use agentcfg::layers::env::MockEnv;
use agentcfg::{
    Agent, AgentConfiguration, Driver, Instrumenter, InstrumenterFactory, builder,
};

struct Jdbc;

impl Instrumenter for Jdbc {
    fn name(&self) -> &str {
        "Jdbc"
    }
}

struct Http;

impl Instrumenter for Http {
    fn name(&self) -> &str {
        "Http"
    }
}

fn factories() -> Vec<InstrumenterFactory> {
    vec![
        InstrumenterFactory::infallible("Jdbc", || Jdbc),
        InstrumenterFactory::new("Kafka", || Err("kafka client not linked".into())),
        InstrumenterFactory::infallible("Http", || Http),
    ]
}

#[test]
fn test_agent_start_from_all_layers() {
    let env = MockEnv::from_pairs([
        ("AGENT__INSTRUMENT__EXCLUDE", "com.acme.internal"),
        ("AGENT__INSTRUMENT__EXCLUDED_INSTRUMENTER", "Jdbc"),
    ]);

    let config = builder::<AgentConfiguration>()
        .unwrap()
        .env(|e| e.prefix("AGENT").source(env))
        .file(|f| {
            f.content(
                "agent.instrument.include = com.acme,\\\n    org.example\n",
                "agent.properties",
            )
        })
        .overrides([(EXCLUDED_INSTRUMENTER, "Http")])
        .build();

    let agent = Agent::start(Driver::new(config).run().unwrap(), factories());

    let settings = agent.configuration();
    assert_eq!(settings.include_packages, ["com.acme", "org.example"]);
    assert_eq!(settings.exclude_packages, ["com.acme.internal"]);
    // The override replaces the env list entirely.
    assert_eq!(settings.excluded_instrumenters, ["Http"]);

    let registry = agent.instrumenters();
    assert_eq!(registry.names(), ["Jdbc"]);
    assert_eq!(registry.excluded(), ["Http"]);
    assert_eq!(registry.failures().len(), 1);
    assert_eq!(registry.failures()[0].name, "Kafka");

    let resolver = agent.resolver();
    assert!(!resolver.should_ignore("org.example.Web"));
    assert!(resolver.should_ignore("com.acme.internal.Pool"));

    assert!(agent.materialized().provenance(INCLUDE).unwrap().is_file());
}

#[test]
fn test_agent_debug_from_env() {
    let env = MockEnv::from_pairs([("AGENT__INSTRUMENT__DEBUG", "True")]);

    let config = builder::<AgentConfiguration>()
        .unwrap()
        .env(|e| e.prefix("AGENT").source(env))
        .build();

    let agent = Agent::start(Driver::new(config).run().unwrap(), Vec::new());
    assert!(agent.configuration().debug_instrumentation);
    assert!(agent.materialized().provenance(DEBUG).unwrap().is_env());
    assert!(agent.instrumenters().active().is_empty());
}
