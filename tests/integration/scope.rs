//! Scope resolution scenarios.

use agentcfg::{SELF_NAMESPACE, ScopeResolver, ScopeSet};

fn resolver(includes: &[&str], excludes: &[&str], containing: &[&str]) -> ScopeResolver {
    ScopeResolver::new(ScopeSet::new(
        includes.iter().copied(),
        excludes.iter().copied(),
        containing.iter().copied(),
    ))
}

#[test]
fn test_include_exclude_scenario() {
    let r = resolver(&["com.acme"], &["com.acme.internal"], &[]);

    assert!(!r.should_ignore("com.acme.Foo"));
    assert!(r.should_ignore("com.acme.internal.Bar"));
    // Not included, not vetoed.
    assert!(!r.should_ignore("org.other.Baz"));
}

#[test]
fn test_exclude_containing_veto() {
    let r = resolver(&["com.acme"], &[], &["Generated"]);

    assert!(r.should_ignore("com.acme.GeneratedProxy"));
    assert!(r.should_ignore("org.outside.GeneratedThing"));
}

#[test]
fn test_self_namespace_always_excluded() {
    let r = resolver(&["agent"], &["agent.extra"], &[]);

    assert_eq!(r.scope().excludes(), [SELF_NAMESPACE, "agent.extra"]);
    assert!(r.should_ignore("agentcfg.binder.Binder"));
    assert!(r.should_ignore("agent.extra.Thing"));
    assert!(!r.should_ignore("agent.Main"));
}

#[test]
fn test_resolver_is_shareable_across_threads() {
    let r = std::sync::Arc::new(resolver(&["com.acme"], &["com.acme.internal"], &[]));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let r = std::sync::Arc::clone(&r);
            std::thread::spawn(move || r.should_ignore(&format!("com.acme.internal.T{i}")))
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
