//! Store and binder behavior through the public API.

use crate::assert_diag_snapshot;
use agentcfg::{
    BindError, BindErrorKind, ConfigEnum, Configuration, Contract, MaterializedConfig,
    OptionDescriptor, PropertyStore, ResultType, bind, bind_as,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Level {
    Info,
    Debug,
}

impl ConfigEnum for Level {
    const NAME: &'static str = "Level";
    const VARIANTS: &'static [&'static str] = &["Info", "Debug"];

    fn from_variant(variant: &str) -> Option<Self> {
        match variant {
            "Info" => Some(Level::Info),
            "Debug" => Some(Level::Debug),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq)]
struct Child {
    inner: i32,
}

impl Configuration for Child {
    fn contract() -> Contract {
        Contract::new("ChildContract").with_option(OptionDescriptor::new("inner", ResultType::i32()))
    }

    fn from_config(config: &MaterializedConfig) -> Result<Self, BindError> {
        Ok(Self {
            inner: config.extract("inner")?,
        })
    }
}

#[derive(Debug, PartialEq)]
struct Parent {
    enabled: bool,
    level: Level,
    child: Child,
}

impl Configuration for Parent {
    fn contract() -> Contract {
        Contract::new("Parent")
            .with_option(OptionDescriptor::new("enabled", ResultType::bool()))
            .with_option(
                OptionDescriptor::new("level", ResultType::enumeration::<Level>()).default_value("Info"),
            )
            .with_option(OptionDescriptor::new("child", ResultType::nested(Child::contract())))
    }

    fn from_config(config: &MaterializedConfig) -> Result<Self, BindError> {
        Ok(Self {
            enabled: config.extract("enabled")?,
            level: config.extract_enum("level")?,
            child: config.extract_nested("child")?,
        })
    }
}

fn list_contract() -> Contract {
    Contract::new("Lists").with_option(OptionDescriptor::new(
        "names",
        ResultType::sequence(ResultType::string()),
    ))
}

fn flag_contract() -> Contract {
    Contract::new("Flag").with_option(OptionDescriptor::new("flag", ResultType::bool()))
}

#[test]
fn test_override_law() {
    let base = PropertyStore::new().with_layer([("a", "1"), ("b", "2")]);
    assert_eq!(base.get("a"), Some("1"));
    assert_eq!(base.get("b"), Some("2"));

    let layered = base.with_layer([("a", "10")]);
    assert_eq!(layered.get("a"), Some("10"));
    assert_eq!(layered.get("b"), Some("2"));

    // The earlier store is untouched.
    assert_eq!(base.get("a"), Some("1"));
}

#[test]
fn test_bind_is_deterministic() {
    let store = PropertyStore::from_pairs([
        ("parent.enabled", "true"),
        ("parent.child.inner", "7"),
    ])
    .sub_scope("parent");
    let contract = Parent::contract();

    let first = bind(&store, &contract).unwrap();
    let second = bind(&store, &contract).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_sequence_round_trip() {
    let store = PropertyStore::from_pairs([("names", "a,b,c")]);
    let config = bind(&store, &list_contract()).unwrap();
    assert_eq!(config.extract::<Vec<String>>("names").unwrap(), ["a", "b", "c"]);

    let store = PropertyStore::from_pairs([("names", "")]);
    let config = bind(&store, &list_contract()).unwrap();
    assert!(config.extract::<Vec<String>>("names").unwrap().is_empty());
}

#[test]
fn test_sequence_without_value_is_empty() {
    let config = bind(&PropertyStore::new(), &list_contract()).unwrap();
    assert!(config.extract::<Vec<String>>("names").unwrap().is_empty());
}

#[test]
fn test_boolean_coercion_table() {
    for (raw, expected) in [
        ("true", true),
        ("TRUE", true),
        ("True", true),
        ("false", false),
        ("yes", false),
        ("", false),
        ("1", false),
    ] {
        let store = PropertyStore::from_pairs([("flag", raw)]);
        let config = bind(&store, &flag_contract()).unwrap();
        assert_eq!(config.extract::<bool>("flag").unwrap(), expected, "raw {raw:?}");
    }
}

#[test]
fn test_nested_contract_under_prefix() {
    let store = PropertyStore::from_pairs([
        ("parent.enabled", "true"),
        ("parent.child.inner", "42"),
        ("parent.level", "Debug"),
        ("unrelated.child.inner", "0"),
    ]);

    let parent: Parent = bind_as(&store.sub_scope("parent")).unwrap();

    assert_eq!(
        parent,
        Parent {
            enabled: true,
            level: Level::Debug,
            child: Child { inner: 42 },
        }
    );
}

#[test]
fn test_missing_key_names_exact_key() {
    let store = PropertyStore::from_pairs([("parent.enabled", "true")]).sub_scope("parent");

    let err = bind(&store, &Parent::contract()).unwrap_err();

    assert_eq!(err.key(), Some("child.inner"));
    assert!(matches!(err.kind, BindErrorKind::MissingKey { .. }));
    assert_eq!(err.kind.code(), "bind::missing_key");
}

#[test]
fn test_unknown_enum_member() {
    let store = PropertyStore::from_pairs([
        ("enabled", "true"),
        ("level", "debug"),
        ("child.inner", "1"),
    ]);

    let err = bind(&store, &Parent::contract()).unwrap_err();
    assert_eq!(err.key(), Some("level"));
    assert!(matches!(err.kind, BindErrorKind::Coercion { .. }));
}

#[test]
fn test_extract_with_wrong_type() {
    let store = PropertyStore::from_pairs([("flag", "true")]);
    let config = bind(&store, &flag_contract()).unwrap();

    let err = config.extract::<i32>("flag").unwrap_err();
    assert!(matches!(err.kind, BindErrorKind::TypeMismatch { .. }));
}

#[test]
fn test_coercion_error_display() {
    let contract =
        Contract::new("Server").with_option(OptionDescriptor::new("server.port", ResultType::i16()));
    let store = PropertyStore::from_pairs([("server.port", "99999")]);

    let err = bind(&store, &contract).unwrap_err();
    assert_diag_snapshot!(err, @r#"error binding Server: cannot convert "99999" to i16 for `server.port`"#);
}
