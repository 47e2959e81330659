//! Instrumenter registry.
//!
//! Instrumenters are contributed as [`InstrumenterFactory`] values, listed explicitly by the
//! host. [`InstrumenterRegistry::load`] constructs each one in order. A factory whose name is
//! excluded is never constructed, and a factory that fails is recorded in
//! [`InstrumenterRegistry::failures`] without affecting the others.

use std::boxed::Box;
use std::fmt;
use std::string::String;
use std::vec::Vec;

use crate::macros::{info, warning};

/// Error type returned by a failing instrumenter constructor.
pub type FactoryError = Box<dyn core::error::Error + Send + Sync>;

type Constructor = Box<dyn Fn() -> Result<Box<dyn Instrumenter>, FactoryError> + Send + Sync>;

/// A unit of instrumentation the host applies to running code.
pub trait Instrumenter: Send + Sync {
    /// Simple name, matched against the excluded-instrumenter list.
    fn name(&self) -> &str;
}

/// A named, fallible constructor for one instrumenter.
pub struct InstrumenterFactory {
    name: String,
    construct: Constructor,
}

impl InstrumenterFactory {
    /// Create a factory. `name` is what exclusion and failure reports refer to.
    pub fn new<F>(name: impl Into<String>, construct: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Instrumenter>, FactoryError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            construct: Box::new(construct),
        }
    }

    /// Factory for an instrumenter that cannot fail to construct.
    pub fn infallible<I, F>(name: impl Into<String>, construct: F) -> Self
    where
        I: Instrumenter + 'static,
        F: Fn() -> I + Send + Sync + 'static,
    {
        Self::new(name, move || Ok(Box::new(construct()) as Box<dyn Instrumenter>))
    }

    /// The factory's simple name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for InstrumenterFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstrumenterFactory")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// An instrumenter that could not be constructed.
#[derive(Debug)]
pub struct LoadFailure {
    /// Name of the failing factory.
    pub name: String,
    /// What went wrong.
    pub error: FactoryError,
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instrumenter {} failed to load: {}", self.name, self.error)
    }
}

/// The outcome of loading a list of factories.
#[derive(Default)]
pub struct InstrumenterRegistry {
    active: Vec<Box<dyn Instrumenter>>,
    excluded: Vec<String>,
    failures: Vec<LoadFailure>,
}

impl InstrumenterRegistry {
    /// Construct every factory whose name is not in `excluded`.
    ///
    /// With `verbose`, every registration and exclusion is logged at info level.
    pub fn load<I, S>(factories: I, excluded: &[S], verbose: bool) -> Self
    where
        I: IntoIterator<Item = InstrumenterFactory>,
        S: AsRef<str>,
    {
        let mut registry = Self::default();

        for factory in factories {
            if excluded.iter().any(|e| e.as_ref() == factory.name) {
                if verbose {
                    info!(instrumenter = %factory.name, "excluding instrumenter");
                }
                registry.excluded.push(factory.name);
                continue;
            }

            match (factory.construct)() {
                Ok(instrumenter) => {
                    if verbose {
                        info!(instrumenter = %factory.name, "registering instrumenter");
                    }
                    registry.active.push(instrumenter);
                }
                Err(error) => {
                    let failure = LoadFailure {
                        name: factory.name,
                        error,
                    };
                    warning!("{failure}");
                    registry.failures.push(failure);
                }
            }
        }

        registry
    }

    /// Successfully constructed instrumenters, in factory order.
    pub fn active(&self) -> &[Box<dyn Instrumenter>] {
        &self.active
    }

    /// Names of active instrumenters.
    pub fn names(&self) -> Vec<&str> {
        self.active.iter().map(|i| i.name()).collect()
    }

    /// Names of factories skipped because they were excluded.
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    /// Factories that failed to construct.
    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }
}

impl fmt::Debug for InstrumenterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstrumenterRegistry")
            .field("active", &self.names())
            .field("excluded", &self.excluded)
            .field("failures", &self.failures)
            .finish()
    }
}
