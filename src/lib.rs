#![warn(missing_docs)]
#![deny(unsafe_code)]
#![doc = include_str!("../README.md")]

pub(crate) mod macros;

pub mod agent;
pub(crate) mod binder;
pub mod builder;
pub(crate) mod config_value;
pub mod driver;
pub mod dump;
pub mod error;
pub mod layers;
pub(crate) mod materialized;
pub mod provenance;
pub mod registry;
pub(crate) mod schema;
pub mod scope;
pub(crate) mod store;

// ==========================================
// PUBLIC INTERFACE
// ==========================================

pub use agent::{Agent, AgentConfiguration};
pub use binder::{bind, bind_as};
pub use builder::{Config, ConfigBuilder, builder};
pub use config_value::{ConfigValue, Sourced};
pub use driver::{Driver, DriverOutput, DriverReport};
pub use error::{BindError, BindErrorKind, DriverError, LoadError};
pub use materialized::{Configuration, FromConfigValue, MaterializedConfig, ValueMap};
pub use provenance::Provenance;
pub use registry::{Instrumenter, InstrumenterFactory, InstrumenterRegistry};
pub use schema::{ConfigEnum, Contract, EnumSpec, OptionDescriptor, ResultType, ScalarType};
pub use scope::{SELF_NAMESPACE, ScopeResolver, ScopeSet};
pub use store::{Layer, LayerMap, PropertyStore};
