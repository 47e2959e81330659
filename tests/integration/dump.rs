//! Dump output of a driver run.

use crate::strip_ansi;
use agentcfg::{AgentConfiguration, Driver, builder};

#[test]
fn test_dump_agent_configuration() {
    let config = builder::<AgentConfiguration>()
        .unwrap()
        .file(|f| f.content("agent.instrument.include=com.acme\n", "agent.properties"))
        .overrides([("agent.instrument.debug", "true")])
        .build();

    let output = Driver::new(config).run().unwrap();

    insta::assert_snapshot!(strip_ansi(&output.report.dump_string()), @r"
    Sources:
      file:
          (picked) agent.properties
      overrides (1)
      defaults

    AgentConfiguration
    agent.active..................................... true........ DEFAULT  # Activate agent
        If set to `false` the agent will be completely deactivated.
    agent.instrument.exclude......................... [].......... DEFAULT  # Excluded packages
        Exclude packages and their sub-packages from the instrumentation.
    agent.instrument.excludeContaining............... [].......... DEFAULT  # Exclude containing
        Exclude names that contain one of the following strings from the instrumentation.
    agent.instrument.include......................... [com.acme].. agent.properties:1  # Included packages
        The packages that should be included for instrumentation. All sub-packages of the listed packages are included automatically; exclude them again via `agent.instrument.exclude`. Example: `org.somecompany.package,com.someothercompany`
    agent.instrument.runtimeAttach................... true........ DEFAULT  # Attach agent at runtime
        Attach the agent at runtime and re-transform everything already loaded.
    agent.instrument.exportGeneratedClassesWithName.. [].......... DEFAULT  # Export generated classes with name
        Fully qualified names whose transformed artifacts are exported to the file system, to debug problems inside the generated code.
    agent.instrument.debug........................... true........ override agent.instrument.debug  # Debug instrumentation
        Log additional information and warnings during instrumentation.
    agent.instrument.excludedInstrumenter............ [].......... DEFAULT  # Excluded instrumenters
        Simple names of instrumenters that should not be applied.
    ");
}

#[test]
fn test_materialized_dump_without_sources() {
    let config = builder::<AgentConfiguration>().unwrap().build();
    let output = Driver::new(config).run().unwrap();

    let mut out = Vec::new();
    output.report.config.dump(&mut out, None).unwrap();
    let text = strip_ansi(&String::from_utf8(out).unwrap());

    assert!(text.starts_with("Sources:\n  defaults\n\nAgentConfiguration\n"));
    assert_eq!(text.lines().filter(|l| l.contains("DEFAULT")).count(), 8);
}
