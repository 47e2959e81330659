//! Typed configuration values with provenance.

use std::fmt;
use std::string::String;
use std::vec::Vec;

use crate::materialized::MaterializedConfig;
use crate::provenance::Provenance;

/// A value together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    /// The wrapped value.
    pub value: T,
    /// Where the value (or the raw string it was coerced from) originated.
    pub provenance: Provenance,
}

impl<T> Sourced<T> {
    /// Create a new Sourced value from a declared default.
    pub fn new(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Default,
        }
    }

    /// Create a new Sourced value with provenance.
    pub fn with_provenance(value: T, provenance: Provenance) -> Self {
        Self { value, provenance }
    }
}

/// A bound configuration value.
///
/// Equality compares floats by bit pattern, so a bound `NaN` equals itself.
#[derive(Debug, Clone)]
pub enum ConfigValue {
    /// A string value.
    String(String),
    /// A boolean value.
    Bool(bool),
    /// An 8-bit integer.
    I8(i8),
    /// A 16-bit integer.
    I16(i16),
    /// A 32-bit integer.
    I32(i32),
    /// A 64-bit integer.
    I64(i64),
    /// A 32-bit float.
    F32(f32),
    /// A 64-bit float.
    F64(f64),
    /// A single character.
    Char(char),
    /// The member name of an enumeration.
    Enum(String),
    /// An ordered sequence of values.
    Sequence(Vec<ConfigValue>),
    /// A nested, fully bound configuration.
    Nested(MaterializedConfig),
}

impl ConfigValue {
    /// Short name of the value's kind, used in type mismatch errors.
    pub fn kind_name(&self) -> String {
        match self {
            ConfigValue::String(_) => "String".into(),
            ConfigValue::Bool(_) => "bool".into(),
            ConfigValue::I8(_) => "i8".into(),
            ConfigValue::I16(_) => "i16".into(),
            ConfigValue::I32(_) => "i32".into(),
            ConfigValue::I64(_) => "i64".into(),
            ConfigValue::F32(_) => "f32".into(),
            ConfigValue::F64(_) => "f64".into(),
            ConfigValue::Char(_) => "char".into(),
            ConfigValue::Enum(_) => "enum".into(),
            ConfigValue::Sequence(_) => "Vec".into(),
            ConfigValue::Nested(config) => config.contract_name().into(),
        }
    }

    /// The member name, if this is an enum value.
    pub fn as_variant(&self) -> Option<&str> {
        match self {
            ConfigValue::Enum(v) => Some(v),
            _ => None,
        }
    }

    /// The elements, if this is a sequence.
    pub fn as_sequence(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// The nested configuration, if this is one.
    pub fn as_nested(&self) -> Option<&MaterializedConfig> {
        match self {
            ConfigValue::Nested(config) => Some(config),
            _ => None,
        }
    }

    /// Write the value as it appears in a configuration descriptor: strings quoted,
    /// characters single-quoted, nested configurations indented by `depth`.
    pub(crate) fn write_literal(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            ConfigValue::String(s) => write!(f, "{s:?}"),
            ConfigValue::Char(c) => write!(f, "{c:?}"),
            ConfigValue::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.write_literal(f, depth)?;
                }
                f.write_str("]")
            }
            ConfigValue::Nested(config) => config.write_descriptor(f, depth),
            other => write!(f, "{other}"),
        }
    }
}

impl PartialEq for ConfigValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConfigValue::String(a), ConfigValue::String(b)) => a == b,
            (ConfigValue::Bool(a), ConfigValue::Bool(b)) => a == b,
            (ConfigValue::I8(a), ConfigValue::I8(b)) => a == b,
            (ConfigValue::I16(a), ConfigValue::I16(b)) => a == b,
            (ConfigValue::I32(a), ConfigValue::I32(b)) => a == b,
            (ConfigValue::I64(a), ConfigValue::I64(b)) => a == b,
            (ConfigValue::F32(a), ConfigValue::F32(b)) => a.to_bits() == b.to_bits(),
            (ConfigValue::F64(a), ConfigValue::F64(b)) => a.to_bits() == b.to_bits(),
            (ConfigValue::Char(a), ConfigValue::Char(b)) => a == b,
            (ConfigValue::Enum(a), ConfigValue::Enum(b)) => a == b,
            (ConfigValue::Sequence(a), ConfigValue::Sequence(b)) => a == b,
            (ConfigValue::Nested(a), ConfigValue::Nested(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::String(s) => f.write_str(s),
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::I8(n) => write!(f, "{n}"),
            ConfigValue::I16(n) => write!(f, "{n}"),
            ConfigValue::I32(n) => write!(f, "{n}"),
            ConfigValue::I64(n) => write!(f, "{n}"),
            // Debug keeps the decimal point on whole numbers
            ConfigValue::F32(n) => write!(f, "{n:?}"),
            ConfigValue::F64(n) => write!(f, "{n:?}"),
            ConfigValue::Char(c) => write!(f, "{c}"),
            ConfigValue::Enum(v) => f.write_str(v),
            ConfigValue::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            ConfigValue::Nested(config) => write!(f, "{config}"),
        }
    }
}
