//! Contracts: the declared shape of a configuration.
//!
//! A [`Contract`] is an ordered list of [`OptionDescriptor`]s. Each descriptor names a
//! dotted key, the [`ResultType`] its raw string is coerced to, and an optional default.
//! Result types form a closed set; the binder matches on them exhaustively.

use std::string::String;
use std::sync::Arc;
use std::vec::Vec;

use indexmap::IndexSet;

use crate::error::{BindError, BindErrorKind};

/// Scalar result types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// UTF-8 string, taken as-is.
    String,
    /// Boolean; `"true"` in any ASCII case is true, anything else false.
    Bool,
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
    /// A single Unicode scalar value.
    Char,
}

impl ScalarType {
    /// Rust-flavored name of the type, used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            ScalarType::String => "String",
            ScalarType::Bool => "bool",
            ScalarType::I8 => "i8",
            ScalarType::I16 => "i16",
            ScalarType::I32 => "i32",
            ScalarType::I64 => "i64",
            ScalarType::F32 => "f32",
            ScalarType::F64 => "f64",
            ScalarType::Char => "char",
        }
    }
}

/// An enumeration that can be bound from its member names.
///
/// ```rust
/// use agentcfg::ConfigEnum;
///
/// #[derive(Debug, PartialEq)]
/// enum Mode { Fast, Safe }
///
/// impl ConfigEnum for Mode {
///     const NAME: &'static str = "Mode";
///     const VARIANTS: &'static [&'static str] = &["Fast", "Safe"];
///
///     fn from_variant(variant: &str) -> Option<Self> {
///         match variant {
///             "Fast" => Some(Mode::Fast),
///             "Safe" => Some(Mode::Safe),
///             _ => None,
///         }
///     }
/// }
///
/// assert_eq!(Mode::from_variant("Safe"), Some(Mode::Safe));
/// ```
pub trait ConfigEnum: Sized {
    /// Name of the enumeration, used in diagnostics.
    const NAME: &'static str;
    /// Member names, matched case-sensitively.
    const VARIANTS: &'static [&'static str];

    /// Convert a member name into a value.
    fn from_variant(variant: &str) -> Option<Self>;
}

/// Declared members of an enumerated result type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSpec {
    name: String,
    variants: Vec<String>,
}

impl EnumSpec {
    /// Create an enum spec from a name and its members.
    pub fn new<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    /// Build the spec of a [`ConfigEnum`].
    pub fn of<E: ConfigEnum>() -> Self {
        Self::new(E::NAME, E::VARIANTS.iter().copied())
    }

    /// Enumeration name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member names in declaration order.
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Exact, case-sensitive member lookup.
    pub fn contains(&self, variant: &str) -> bool {
        self.variants.iter().any(|v| v == variant)
    }
}

/// The type an option's raw string is coerced to.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultType {
    /// A scalar value.
    Scalar(ScalarType),
    /// One member of an enumeration.
    Enum(EnumSpec),
    /// Comma-separated values of the element type.
    Sequence(Box<ResultType>),
    /// A nested contract bound against the keys under this option's key.
    Nested(Arc<Contract>),
}

impl ResultType {
    /// `String` result type.
    pub const fn string() -> Self {
        ResultType::Scalar(ScalarType::String)
    }

    /// `bool` result type.
    pub const fn bool() -> Self {
        ResultType::Scalar(ScalarType::Bool)
    }

    /// `i8` result type.
    pub const fn i8() -> Self {
        ResultType::Scalar(ScalarType::I8)
    }

    /// `i16` result type.
    pub const fn i16() -> Self {
        ResultType::Scalar(ScalarType::I16)
    }

    /// `i32` result type.
    pub const fn i32() -> Self {
        ResultType::Scalar(ScalarType::I32)
    }

    /// `i64` result type.
    pub const fn i64() -> Self {
        ResultType::Scalar(ScalarType::I64)
    }

    /// `f32` result type.
    pub const fn f32() -> Self {
        ResultType::Scalar(ScalarType::F32)
    }

    /// `f64` result type.
    pub const fn f64() -> Self {
        ResultType::Scalar(ScalarType::F64)
    }

    /// `char` result type.
    pub const fn char() -> Self {
        ResultType::Scalar(ScalarType::Char)
    }

    /// Result type of a [`ConfigEnum`].
    pub fn enumeration<E: ConfigEnum>() -> Self {
        ResultType::Enum(EnumSpec::of::<E>())
    }

    /// Sequence of `element`.
    pub fn sequence(element: ResultType) -> Self {
        ResultType::Sequence(Box::new(element))
    }

    /// Nested contract.
    pub fn nested(contract: impl Into<Arc<Contract>>) -> Self {
        ResultType::Nested(contract.into())
    }

    /// Human-readable type name, e.g. `Vec<i32>` or `enum LogLevel`.
    pub fn type_name(&self) -> String {
        match self {
            ResultType::Scalar(scalar) => scalar.name().to_string(),
            ResultType::Enum(spec) => format!("enum {}", spec.name()),
            ResultType::Sequence(element) => format!("Vec<{}>", element.type_name()),
            ResultType::Nested(contract) => contract.name().to_string(),
        }
    }
}

/// One configuration option.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDescriptor {
    key: String,
    result_type: ResultType,
    default_value: Option<String>,
    label: Option<String>,
    description: Option<String>,
}

impl OptionDescriptor {
    /// Create an option with no default.
    pub fn new(key: impl Into<String>, result_type: ResultType) -> Self {
        Self {
            key: key.into(),
            result_type,
            default_value: None,
            label: None,
            description: None,
        }
    }

    /// Set the raw default used when no layer provides the key.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Set a short label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set a longer description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The dotted key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The declared result type.
    pub fn result_type(&self) -> &ResultType {
        &self.result_type
    }

    /// The raw default, if declared.
    pub fn default(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// The short label, if declared.
    pub fn label_text(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The description, if declared.
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A named, ordered set of options.
#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    name: String,
    options: Vec<OptionDescriptor>,
}

impl Contract {
    /// Create an empty contract.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    /// Append an option.
    pub fn with_option(mut self, option: OptionDescriptor) -> Self {
        self.options.push(option);
        self
    }

    /// Contract name, used as the heading of the textual descriptor.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Options in declaration order.
    pub fn options(&self) -> &[OptionDescriptor] {
        &self.options
    }

    /// Find an option by key.
    pub fn find(&self, key: &str) -> Option<&OptionDescriptor> {
        self.options.iter().find(|o| o.key == key)
    }

    /// Check that every key is non-empty and declared once.
    ///
    /// Nested contracts are validated when they are bound.
    pub fn validate(&self) -> Result<(), BindError> {
        let mut seen = IndexSet::with_capacity(self.options.len());
        for option in &self.options {
            if option.key.is_empty() {
                return Err(BindError::new(
                    &self.name,
                    BindErrorKind::InvalidContract {
                        reason: "option key must not be empty".to_string(),
                    },
                ));
            }
            if !seen.insert(option.key.as_str()) {
                return Err(BindError::new(
                    &self.name,
                    BindErrorKind::InvalidContract {
                        reason: format!("option key `{}` is declared more than once", option.key),
                    },
                ));
            }
        }
        Ok(())
    }
}
