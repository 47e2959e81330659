//! Name-scope resolution.
//!
//! A [`ScopeResolver`] decides whether a fully qualified name (for example
//! `com.acme.internal.Cache`) should be ignored, given three ordered pattern lists:
//!
//! - `exclude_containing`: any name containing one of these substrings is ignored, always.
//! - `includes`: prefixes that bring names into scope. Only the first matching include is
//!   consulted, so declaration order matters.
//! - `excludes`: prefixes that carve a narrower region back out of a matching include.
//!
//! Names outside every include are *not* reported as ignored; deciding what to do with names
//! nobody asked for is up to the caller.

use std::string::String;
use std::vec::Vec;

use crate::macros::{debug, warning};

/// Namespace of this crate, prepended to every exclude list.
pub const SELF_NAMESPACE: &str = "agentcfg";

/// The three pattern lists a [`ScopeResolver`] is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSet {
    includes: Vec<String>,
    excludes: Vec<String>,
    exclude_containing: Vec<String>,
}

impl ScopeSet {
    /// Create a scope set. [`SELF_NAMESPACE`] is prepended to `excludes`.
    pub fn new<I, E, C, S>(includes: I, excludes: E, exclude_containing: C) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = S>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all_excludes = vec![SELF_NAMESPACE.to_string()];
        all_excludes.extend(excludes.into_iter().map(Into::into));
        Self {
            includes: includes.into_iter().map(Into::into).collect(),
            excludes: all_excludes,
            exclude_containing: exclude_containing.into_iter().map(Into::into).collect(),
        }
    }

    /// Include prefixes, in declaration order.
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Exclude prefixes, starting with [`SELF_NAMESPACE`].
    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    /// Substrings that veto a name unconditionally.
    pub fn exclude_containing(&self) -> &[String] {
        &self.exclude_containing
    }
}

/// Decides whether a name is out of scope.
///
/// ```rust
/// use agentcfg::{ScopeResolver, ScopeSet};
///
/// let resolver = ScopeResolver::new(ScopeSet::new(
///     ["com.acme"],
///     ["com.acme.internal"],
///     [],
/// ));
///
/// assert!(!resolver.should_ignore("com.acme.Foo"));
/// assert!(resolver.should_ignore("com.acme.internal.Bar"));
/// assert!(!resolver.should_ignore("org.other.Baz"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeResolver {
    scope: ScopeSet,
}

impl ScopeResolver {
    /// Build a resolver. Logs a warning if no includes are configured.
    pub fn new(scope: ScopeSet) -> Self {
        if scope.includes.is_empty() {
            warning!("no include prefixes configured; no name will be treated as in scope");
        }
        debug!(
            includes = scope.includes.len(),
            excludes = scope.excludes.len(),
            exclude_containing = scope.exclude_containing.len(),
            "scope: built resolver"
        );
        Self { scope }
    }

    /// The pattern lists this resolver was built from.
    pub fn scope(&self) -> &ScopeSet {
        &self.scope
    }

    /// Whether `name` should be ignored.
    pub fn should_ignore(&self, name: &str) -> bool {
        if self
            .scope
            .exclude_containing
            .iter()
            .any(|pattern| name.contains(pattern.as_str()))
        {
            return true;
        }

        match self
            .scope
            .includes
            .iter()
            .find(|include| name.starts_with(include.as_str()))
        {
            Some(include) => self.has_more_specific_exclude(name, include),
            None => false,
        }
    }

    fn has_more_specific_exclude(&self, name: &str, include: &str) -> bool {
        self.scope.excludes.iter().any(|exclude| {
            exclude.len() > include.len()
                && exclude.starts_with(include)
                && name.starts_with(exclude.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(includes: &[&str], excludes: &[&str], containing: &[&str]) -> ScopeResolver {
        ScopeResolver::new(ScopeSet::new(
            includes.iter().copied(),
            excludes.iter().copied(),
            containing.iter().copied(),
        ))
    }

    #[test]
    fn test_include_with_nested_exclude() {
        let r = resolver(&["com.acme"], &["com.acme.internal"], &[]);
        assert!(!r.should_ignore("com.acme.Foo"));
        assert!(r.should_ignore("com.acme.internal.Bar"));
        assert!(!r.should_ignore("org.other.Baz"));
    }

    #[test]
    fn test_exclude_containing_vetoes_everything() {
        let r = resolver(&["com.acme"], &[], &["Generated"]);
        assert!(r.should_ignore("com.acme.GeneratedProxy"));
        assert!(r.should_ignore("org.other.Generated"));
        assert!(!r.should_ignore("com.acme.Plain"));
    }

    #[test]
    fn test_exclude_not_longer_than_include_is_ignored() {
        // Equal or broader excludes never carve anything out of an include.
        let r = resolver(&["com.acme"], &["com.acme", "com"], &[]);
        assert!(!r.should_ignore("com.acme.Foo"));
    }

    #[test]
    fn test_exclude_outside_include_is_ignored() {
        let r = resolver(&["com.acme"], &["org.acme.internal"], &[]);
        assert!(!r.should_ignore("com.acme.internal.Foo"));
    }

    #[test]
    fn test_first_matching_include_wins() {
        // "com.acme.web" would match first, and no exclude is nested under it.
        let r = resolver(&["com.acme.web", "com.acme"], &["com.acme.web.internal2"], &[]);
        assert!(!r.should_ignore("com.acme.web.internal.Foo"));

        // Broad include first: the nested exclude applies.
        let r = resolver(&["com.acme", "com.acme.web"], &["com.acme.web.internal"], &[]);
        assert!(r.should_ignore("com.acme.web.internal.Foo"));

        // Narrow include first hides an exclude that only nests under the broad one.
        let r = resolver(&["com.acme.web", "com.acme"], &["com.acme.w"], &[]);
        assert!(!r.should_ignore("com.acme.web.Foo"));
        let r = resolver(&["com.acme", "com.acme.web"], &["com.acme.w"], &[]);
        assert!(r.should_ignore("com.acme.web.Foo"));
    }

    #[test]
    fn test_self_namespace_is_excluded() {
        let r = resolver(&["agent"], &[], &[]);
        assert_eq!(r.scope().excludes()[0], SELF_NAMESPACE);
        assert!(r.should_ignore("agentcfg.scope.ScopeResolver"));
        assert!(!r.should_ignore("agent.Other"));
    }

    #[test]
    fn test_empty_scope_ignores_nothing() {
        let r = resolver(&[], &[], &[]);
        assert!(!r.should_ignore("com.acme.Foo"));
        assert!(!r.should_ignore(""));
    }

    #[test]
    fn test_empty_include_matches_everything() {
        let r = resolver(&[""], &["com.acme.internal"], &[]);
        assert!(r.should_ignore("com.acme.internal.Foo"));
        assert!(!r.should_ignore("com.acme.Foo"));
    }
}
