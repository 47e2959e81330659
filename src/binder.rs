//! Binding contracts against a property store.
//!
//! Every option is resolved independently: the raw string comes from the store or, failing
//! that, from the option's default, and is then coerced according to its [`ResultType`].
//! The first failure aborts the whole bind.

use std::string::String;
use std::sync::Arc;
use std::vec::Vec;

use crate::config_value::{ConfigValue, Sourced};
use crate::error::{BindError, BindErrorKind};
use crate::macros::{debug, trace};
use crate::materialized::{Configuration, MaterializedConfig, ValueMap};
use crate::schema::{Contract, EnumSpec, OptionDescriptor, ResultType, ScalarType};
use crate::store::PropertyStore;

/// Bind `contract` against `store`.
///
/// ```rust
/// use agentcfg::{Contract, OptionDescriptor, PropertyStore, ResultType, bind};
///
/// let contract = Contract::new("Server")
///     .with_option(OptionDescriptor::new("server.port", ResultType::i32()).default_value("8080"))
///     .with_option(OptionDescriptor::new("server.hosts", ResultType::sequence(ResultType::string())).default_value(""));
///
/// let store = PropertyStore::from_pairs([("server.hosts", "a,b")]);
/// let config = bind(&store, &contract).unwrap();
///
/// assert_eq!(config.extract::<i32>("server.port").unwrap(), 8080);
/// assert_eq!(config.extract::<Vec<String>>("server.hosts").unwrap(), ["a", "b"]);
/// ```
pub fn bind(store: &PropertyStore, contract: &Contract) -> Result<MaterializedConfig, BindError> {
    bind_shared(store, Arc::new(contract.clone()))
}

/// Bind `T`'s contract against `store` and populate a `T` from it.
pub fn bind_as<T: Configuration>(store: &PropertyStore) -> Result<T, BindError> {
    let config = bind(store, &T::contract())?;
    T::from_config(&config)
}

pub(crate) fn bind_shared(
    store: &PropertyStore,
    contract: Arc<Contract>,
) -> Result<MaterializedConfig, BindError> {
    contract.validate()?;

    let mut values = ValueMap::default();
    for option in contract.options() {
        let value = bind_option(store, &contract, option)?;
        values.insert(option.key().to_string(), value);
    }

    debug!(contract = contract.name(), options = values.len(), "binder: bound contract");
    Ok(MaterializedConfig::new(contract, values))
}

fn bind_option(
    store: &PropertyStore,
    contract: &Contract,
    option: &OptionDescriptor,
) -> Result<Sourced<ConfigValue>, BindError> {
    let key = option.key();
    let fail = |kind: BindErrorKind| BindError::new(contract.name(), kind);

    let raw = match store.lookup(key) {
        Some(stored) => Some(Sourced::with_provenance(stored.value.as_str(), stored.provenance.clone())),
        None => option.default().map(Sourced::new),
    };
    trace!(key, raw = ?raw.as_ref().map(|r| r.value), "binder: resolved raw value");

    match option.result_type() {
        ResultType::Nested(child) => {
            let scoped = store.sub_scope(key);
            let nested = bind_shared(&scoped, Arc::clone(child)).map_err(|e| e.nested_under(key))?;
            Ok(Sourced::new(ConfigValue::Nested(nested)))
        }
        ResultType::Sequence(element) => {
            check_element_type(key, option.result_type(), element).map_err(fail)?;
            match raw {
                Some(raw) => {
                    let provenance = raw.provenance;
                    coerce_sequence(key, element, raw.value)
                        .map(|value| Sourced::with_provenance(value, provenance))
                        .map_err(fail)
                }
                None => Ok(Sourced::new(ConfigValue::Sequence(Vec::new()))),
            }
        }
        single => match raw {
            Some(raw) => {
                let provenance = raw.provenance;
                coerce_single(key, single, raw.value)
                    .map(|value| Sourced::with_provenance(value, provenance))
                    .map_err(fail)
            }
            None => Err(fail(BindErrorKind::MissingKey {
                key: key.to_string(),
                type_name: single.type_name(),
            })),
        },
    }
}

fn check_element_type(key: &str, declared: &ResultType, element: &ResultType) -> Result<(), BindErrorKind> {
    match element {
        ResultType::Sequence(_) => Err(BindErrorKind::Coercion {
            key: key.to_string(),
            type_name: declared.type_name(),
            raw: String::new(),
        }),
        ResultType::Nested(_) => Err(BindErrorKind::UnsupportedType {
            key: key.to_string(),
            type_name: declared.type_name(),
        }),
        ResultType::Scalar(_) | ResultType::Enum(_) => Ok(()),
    }
}

/// Split on `,`. Blank input is an empty sequence. Segments are coerced untrimmed and
/// trailing empty segments dropped.
fn coerce_sequence(key: &str, element: &ResultType, raw: &str) -> Result<ConfigValue, BindErrorKind> {
    if raw.trim().is_empty() {
        return Ok(ConfigValue::Sequence(Vec::new()));
    }

    let mut segments: Vec<&str> = raw.split(',').collect();
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }

    segments
        .into_iter()
        .map(|segment| coerce_single(key, element, segment))
        .collect::<Result<Vec<_>, _>>()
        .map(ConfigValue::Sequence)
}

/// Coerce one raw string outside of a contract. Nested contracts need a whole store and are
/// rejected.
pub(crate) fn coerce_raw(
    key: &str,
    ty: &ResultType,
    raw: &str,
) -> Result<ConfigValue, BindErrorKind> {
    match ty {
        ResultType::Sequence(element) => {
            check_element_type(key, ty, element)?;
            coerce_sequence(key, element, raw)
        }
        other => coerce_single(key, other, raw),
    }
}

fn coerce_single(key: &str, ty: &ResultType, raw: &str) -> Result<ConfigValue, BindErrorKind> {
    match ty {
        ResultType::Scalar(scalar) => coerce_scalar(key, *scalar, raw),
        ResultType::Enum(spec) => coerce_enum(key, spec, raw),
        ResultType::Sequence(_) | ResultType::Nested(_) => Err(BindErrorKind::UnsupportedType {
            key: key.to_string(),
            type_name: ty.type_name(),
        }),
    }
}

fn coerce_scalar(key: &str, scalar: ScalarType, raw: &str) -> Result<ConfigValue, BindErrorKind> {
    let invalid = || BindErrorKind::Coercion {
        key: key.to_string(),
        type_name: scalar.name().to_string(),
        raw: raw.to_string(),
    };

    let value = match scalar {
        ScalarType::String => ConfigValue::String(raw.to_string()),
        ScalarType::Bool => ConfigValue::Bool(raw.eq_ignore_ascii_case("true")),
        ScalarType::I8 => ConfigValue::I8(raw.parse().map_err(|_| invalid())?),
        ScalarType::I16 => ConfigValue::I16(raw.parse().map_err(|_| invalid())?),
        ScalarType::I32 => ConfigValue::I32(raw.parse().map_err(|_| invalid())?),
        ScalarType::I64 => ConfigValue::I64(raw.parse().map_err(|_| invalid())?),
        ScalarType::F32 => ConfigValue::F32(raw.parse().map_err(|_| invalid())?),
        ScalarType::F64 => ConfigValue::F64(raw.parse().map_err(|_| invalid())?),
        ScalarType::Char => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => ConfigValue::Char(c),
                _ => return Err(invalid()),
            }
        }
    };

    trace!(key, ty = scalar.name(), %value, "binder: coerced scalar");
    Ok(value)
}

fn coerce_enum(key: &str, spec: &EnumSpec, raw: &str) -> Result<ConfigValue, BindErrorKind> {
    if spec.contains(raw) {
        Ok(ConfigValue::Enum(raw.to_string()))
    } else {
        Err(BindErrorKind::Coercion {
            key: key.to_string(),
            type_name: format!("enum {} (one of {})", spec.name(), spec.variants().join(", ")),
            raw: raw.to_string(),
        })
    }
}
