//! Error types for loading layers, binding contracts and running the driver.

use std::fmt;
use std::string::String;

use camino::Utf8PathBuf;

/// A contract could not be bound against a property store.
///
/// Binding stops at the first failing option; no partially bound configuration
/// is ever returned alongside this error.
#[derive(Debug, Clone, PartialEq)]
pub struct BindError {
    /// Name of the contract being bound when the error occurred.
    pub contract: String,

    /// The specific failure.
    pub kind: BindErrorKind,
}

impl BindError {
    /// Create a new bind error for the given contract.
    pub fn new(contract: impl Into<String>, kind: BindErrorKind) -> Self {
        Self {
            contract: contract.into(),
            kind,
        }
    }

    /// The key of the offending option, if the error is tied to one.
    pub fn key(&self) -> Option<&str> {
        match &self.kind {
            BindErrorKind::MissingKey { key, .. }
            | BindErrorKind::Coercion { key, .. }
            | BindErrorKind::UnsupportedType { key, .. }
            | BindErrorKind::TypeMismatch { key, .. } => Some(key),
            BindErrorKind::InvalidContract { .. } => None,
        }
    }

    /// Prefix the key with the parent option's key, for errors raised inside nested contracts.
    pub(crate) fn nested_under(mut self, parent: &str) -> Self {
        match &mut self.kind {
            BindErrorKind::MissingKey { key, .. }
            | BindErrorKind::Coercion { key, .. }
            | BindErrorKind::UnsupportedType { key, .. }
            | BindErrorKind::TypeMismatch { key, .. } => {
                *key = join_key(parent, key);
            }
            BindErrorKind::InvalidContract { .. } => {}
        }
        self
    }
}

fn join_key(parent: &str, key: &str) -> String {
    if parent.ends_with('.') {
        format!("{parent}{key}")
    } else {
        format!("{parent}.{key}")
    }
}

/// What went wrong while binding.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BindErrorKind {
    /// A scalar option has neither a stored value nor a default.
    MissingKey {
        /// The full key that was looked up.
        key: String,
        /// Declared type of the option.
        type_name: String,
    },

    /// A raw string could not be parsed into the declared type.
    Coercion {
        /// The full key of the option.
        key: String,
        /// Declared type of the option (or of the sequence element).
        type_name: String,
        /// The raw string that failed to parse.
        raw: String,
    },

    /// The contract declares a result type the binder cannot produce.
    UnsupportedType {
        /// The full key of the option.
        key: String,
        /// The declared type.
        type_name: String,
    },

    /// The contract itself is malformed (empty or duplicate keys).
    InvalidContract {
        /// Why the contract was rejected.
        reason: String,
    },

    /// A bound value was extracted as a different type than it was bound as.
    TypeMismatch {
        /// The full key of the option.
        key: String,
        /// The requested type.
        expected: String,
        /// What the configuration actually holds.
        found: String,
    },
}

impl BindErrorKind {
    /// Returns an error code for this error kind.
    pub const fn code(&self) -> &'static str {
        match self {
            BindErrorKind::MissingKey { .. } => "bind::missing_key",
            BindErrorKind::Coercion { .. } => "bind::coercion",
            BindErrorKind::UnsupportedType { .. } => "bind::unsupported_type",
            BindErrorKind::InvalidContract { .. } => "bind::invalid_contract",
            BindErrorKind::TypeMismatch { .. } => "bind::type_mismatch",
        }
    }

    /// Returns true if the error is caused by the contract rather than the property values.
    pub const fn is_schema_error(&self) -> bool {
        matches!(
            self,
            BindErrorKind::UnsupportedType { .. }
                | BindErrorKind::InvalidContract { .. }
                | BindErrorKind::TypeMismatch { .. }
        )
    }
}

impl fmt::Display for BindErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindErrorKind::MissingKey { key, type_name } => {
                write!(f, "missing value for `{key}` ({type_name}) and no default declared")
            }
            BindErrorKind::Coercion {
                key,
                type_name,
                raw,
            } => write!(f, "cannot convert {raw:?} to {type_name} for `{key}`"),
            BindErrorKind::UnsupportedType { key, type_name } => {
                write!(f, "unsupported result type {type_name} declared for `{key}`")
            }
            BindErrorKind::InvalidContract { reason } => write!(f, "invalid contract: {reason}"),
            BindErrorKind::TypeMismatch {
                key,
                expected,
                found,
            } => write!(f, "`{key}` holds {found}, not {expected}"),
        }
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error binding {}: {}", self.contract, self.kind)
    }
}

impl core::error::Error for BindError {}

/// A configuration layer could not be loaded.
#[derive(Debug)]
pub enum LoadError {
    /// The file exists but could not be read.
    Io {
        /// The file being read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid properties syntax.
    Syntax {
        /// The file being parsed.
        path: Utf8PathBuf,
        /// 1-based line of the offending entry.
        line: usize,
        /// What was wrong.
        message: String,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => write!(f, "could not read {path}: {source}"),
            LoadError::Syntax {
                path,
                line,
                message,
            } => write!(f, "{path}:{line}: {message}"),
        }
    }
}

impl core::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Syntax { .. } => None,
        }
    }
}

/// Startup failed, either while loading a layer or while binding.
#[derive(Debug)]
pub enum DriverError {
    /// A layer could not be loaded.
    Load(LoadError),
    /// The merged properties could not be bound.
    Bind(BindError),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Load(err) => write!(f, "error: {err}"),
            DriverError::Bind(err) => write!(f, "{err}"),
        }
    }
}

impl core::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            DriverError::Load(err) => Some(err),
            DriverError::Bind(err) => Some(err),
        }
    }
}

impl From<LoadError> for DriverError {
    fn from(err: LoadError) -> Self {
        DriverError::Load(err)
    }
}

impl From<BindError> for DriverError {
    fn from(err: BindError) -> Self {
        DriverError::Bind(err)
    }
}
