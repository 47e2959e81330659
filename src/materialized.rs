//! Materialized configurations and typed extraction.
//!
//! A [`MaterializedConfig`] is the immutable result of binding a [`Contract`] against a
//! [`PropertyStore`](crate::PropertyStore). Plain Rust structs are populated from it through
//! the [`Configuration`] trait, so consumers read ordinary fields instead of looking keys up.

use std::fmt;
use std::string::String;
use std::sync::Arc;
use std::vec::Vec;

use indexmap::IndexMap;

use crate::config_value::{ConfigValue, Sourced};
use crate::dump::{DumpSources, dump_config};
use crate::error::{BindError, BindErrorKind};
use crate::provenance::{FileResolution, Provenance};
use crate::schema::{ConfigEnum, Contract};

/// Map type used for bound values, in contract declaration order.
pub type ValueMap = IndexMap<String, Sourced<ConfigValue>, std::hash::RandomState>;

/// An immutable snapshot of one bound contract.
#[derive(Debug, Clone)]
pub struct MaterializedConfig {
    contract: Arc<Contract>,
    values: ValueMap,
}

impl MaterializedConfig {
    pub(crate) fn new(contract: Arc<Contract>, values: ValueMap) -> Self {
        Self { contract, values }
    }

    /// Name of the contract this snapshot was bound from.
    pub fn contract_name(&self) -> &str {
        self.contract.name()
    }

    /// The contract this snapshot was bound from.
    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// The bound value for `key`.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key).map(|s| &s.value)
    }

    /// Where the raw value for `key` came from.
    pub fn provenance(&self, key: &str) -> Option<&Provenance> {
        self.values.get(key).map(|s| &s.provenance)
    }

    /// The nested configuration bound under `key`.
    pub fn nested(&self, key: &str) -> Option<&MaterializedConfig> {
        self.get(key).and_then(ConfigValue::as_nested)
    }

    /// Iterate over `(key, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Sourced<ConfigValue>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of bound options.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the contract declared no options.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Extract the value for `key` as `T`.
    pub fn extract<T: FromConfigValue>(&self, key: &str) -> Result<T, BindError> {
        let value = self.require(key, &T::type_name())?;
        T::from_config_value(value).ok_or_else(|| self.mismatch(key, T::type_name(), value))
    }

    /// Extract the enum member bound under `key`.
    pub fn extract_enum<E: ConfigEnum>(&self, key: &str) -> Result<E, BindError> {
        let expected = format!("enum {}", E::NAME);
        let value = self.require(key, &expected)?;
        value
            .as_variant()
            .and_then(E::from_variant)
            .ok_or_else(|| self.mismatch(key, expected, value))
    }

    /// Extract the nested configuration bound under `key` as `T`.
    pub fn extract_nested<T: Configuration>(&self, key: &str) -> Result<T, BindError> {
        let expected = T::contract().name().to_string();
        let value = self.require(key, &expected)?;
        match value.as_nested() {
            Some(nested) => T::from_config(nested).map_err(|e| e.nested_under(key)),
            None => Err(self.mismatch(key, expected, value)),
        }
    }

    /// Write an aligned, colored table of every value and where it came from.
    ///
    /// When `file_resolution` is given, a sources header lists the candidate files first.
    pub fn dump(
        &self,
        w: &mut impl std::io::Write,
        file_resolution: Option<&FileResolution>,
    ) -> std::io::Result<()> {
        let sources = DumpSources {
            file_resolution,
            ..DumpSources::default()
        };
        dump_config(w, self, &sources)
    }

    fn require(&self, key: &str, expected: &str) -> Result<&ConfigValue, BindError> {
        self.get(key).ok_or_else(|| {
            BindError::new(
                self.contract_name(),
                BindErrorKind::TypeMismatch {
                    key: key.to_string(),
                    expected: expected.to_string(),
                    found: "no such option".to_string(),
                },
            )
        })
    }

    fn mismatch(&self, key: &str, expected: String, found: &ConfigValue) -> BindError {
        BindError::new(
            self.contract_name(),
            BindErrorKind::TypeMismatch {
                key: key.to_string(),
                expected,
                found: found.kind_name(),
            },
        )
    }

    pub(crate) fn write_descriptor(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "    ".repeat(depth + 1);
        writeln!(f, "{} {{", self.contract_name())?;
        for (key, sourced) in &self.values {
            write!(f, "{indent}{key} = ")?;
            sourced.value.write_literal(f, depth + 1)?;
            writeln!(f)?;
        }
        write!(f, "{}}}", "    ".repeat(depth))
    }
}

/// Value equality: the contract name and every bound value. Provenance is ignored.
impl PartialEq for MaterializedConfig {
    fn eq(&self, other: &Self) -> bool {
        self.contract_name() == other.contract_name()
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|((ka, va), (kb, vb))| ka == kb && va.value == vb.value)
    }
}

impl fmt::Display for MaterializedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_descriptor(f, 0)
    }
}

/// A plain struct that can be populated from a bound contract.
pub trait Configuration: Sized {
    /// The contract describing this struct's options.
    fn contract() -> Contract;

    /// Populate the struct from a snapshot bound against [`Configuration::contract`].
    fn from_config(config: &MaterializedConfig) -> Result<Self, BindError>;
}

/// Conversion from a bound value into a Rust type.
pub trait FromConfigValue: Sized {
    /// Name of the Rust type, used in type mismatch errors.
    fn type_name() -> String;

    /// Convert, or `None` if the value has a different kind.
    fn from_config_value(value: &ConfigValue) -> Option<Self>;
}

macro_rules! impl_from_config_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromConfigValue for $ty {
                fn type_name() -> String {
                    stringify!($ty).to_string()
                }

                fn from_config_value(value: &ConfigValue) -> Option<Self> {
                    match value {
                        ConfigValue::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_config_value! {
    String => String,
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    char => Char,
}

impl<T: FromConfigValue> FromConfigValue for Vec<T> {
    fn type_name() -> String {
        format!("Vec<{}>", T::type_name())
    }

    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        value
            .as_sequence()?
            .iter()
            .map(T::from_config_value)
            .collect()
    }
}
