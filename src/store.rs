//! The layered property store.
//!
//! A [`PropertyStore`] is an ordered stack of immutable [`Layer`]s. Lookups walk the stack
//! from the most recently added layer down, so later layers win on key collision. Adding a
//! layer returns a new store that shares every existing layer with the receiver; nothing is
//! ever mutated in place. Removing a key stacks a layer that masks it.

use std::string::String;
use std::sync::Arc;
use std::vec::Vec;

use indexmap::IndexMap;

use crate::binder::coerce_raw;
use crate::config_value::Sourced;
use crate::error::{BindError, BindErrorKind};
use crate::macros::trace;
use crate::materialized::FromConfigValue;
use crate::provenance::Provenance;
use crate::schema::ResultType;

/// Contract name reported by errors from [`PropertyStore::get_as`].
const LOOKUP_CONTRACT: &str = "PropertyStore";

/// Map type used for layer entries. Keeps insertion order for stable dumps.
pub type LayerMap = IndexMap<String, Sourced<String>, std::hash::RandomState>;

/// One immutable source of string properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    entries: LayerMap,
    // Keys this layer hides from the layers below it.
    masked: Vec<String>,
}

impl Layer {
    /// Create an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a layer of explicit overrides.
    pub fn from_overrides<I, K, V>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut layer = Self::new();
        for (key, value) in iter {
            let key = key.into();
            let provenance = Provenance::overridden(key.clone());
            layer.insert(key, value, provenance);
        }
        layer
    }

    /// Insert an entry. A repeated key replaces the earlier value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>, provenance: Provenance) {
        let key = key.into();
        self.masked.retain(|k| *k != key);
        self.entries
            .insert(key, Sourced::with_provenance(value.into(), provenance));
    }

    /// Hide `key` from every layer below this one.
    pub fn mask(&mut self, key: impl Into<String>) {
        let key = key.into();
        self.entries.shift_remove(&key);
        if !self.masked.contains(&key) {
            self.masked.push(key);
        }
    }

    /// Whether this layer hides `key`.
    pub fn masks(&self, key: &str) -> bool {
        self.masked.iter().any(|k| k == key)
    }

    /// Look up an entry in this layer only.
    pub fn get(&self, key: &str) -> Option<&Sourced<String>> {
        self.entries.get(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the layer has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Sourced<String>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keep only keys under `prefix`, with the prefix stripped.
    fn scoped(&self, prefix: &str) -> Layer {
        let entries = self
            .entries
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(prefix)
                    .map(|rest| (rest.to_string(), value.clone()))
            })
            .collect();
        let masked = self
            .masked
            .iter()
            .filter_map(|key| key.strip_prefix(prefix).map(ToString::to_string))
            .collect();
        Layer { entries, masked }
    }

    fn is_blank(&self) -> bool {
        self.entries.is_empty() && self.masked.is_empty()
    }
}

/// An immutable, layered key/value store.
#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    layers: Vec<Arc<Layer>>,
}

impl PropertyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with a single layer of explicit properties.
    pub fn from_pairs<I, K, V>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new().with_layer(iter)
    }

    /// Return a new store where every key in `mapping` overrides the same key in `self`.
    pub fn with_layer<I, K, V>(&self, mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.with_sourced_layer(Layer::from_overrides(mapping))
    }

    /// Return a new store with `layer` stacked on top.
    pub fn with_sourced_layer(&self, layer: Layer) -> Self {
        trace!(entries = layer.len(), depth = self.layers.len() + 1, "store: add layer");
        let mut layers = self.layers.clone();
        layers.push(Arc::new(layer));
        Self { layers }
    }

    /// Return a new store with a single property overridden.
    pub fn with_property(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_layer([(key.into(), value.into())])
    }

    /// Return a new store in which `key` is absent, whatever the layers below define.
    pub fn without(&self, key: impl Into<String>) -> Self {
        let mut layer = Layer::new();
        layer.mask(key);
        self.with_sourced_layer(layer)
    }

    /// Look up a key in the flattened view.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lookup(key).map(|s| s.value.as_str())
    }

    /// Look up a key and coerce it to `ty` with the same rules as binding.
    ///
    /// A missing key is a [`BindErrorKind::MissingKey`] error; there is no default to fall
    /// back on. `T` must match the kind of value `ty` produces.
    pub fn get_as<T: FromConfigValue>(&self, key: &str, ty: &ResultType) -> Result<T, BindError> {
        let fail = |kind: BindErrorKind| BindError::new(LOOKUP_CONTRACT, kind);

        let raw = self.get(key).ok_or_else(|| {
            fail(BindErrorKind::MissingKey {
                key: key.to_string(),
                type_name: ty.type_name(),
            })
        })?;
        let value = coerce_raw(key, ty, raw).map_err(fail)?;

        T::from_config_value(&value).ok_or_else(|| {
            fail(BindErrorKind::TypeMismatch {
                key: key.to_string(),
                expected: T::type_name(),
                found: value.kind_name(),
            })
        })
    }

    /// Look up a key together with its provenance.
    pub fn lookup(&self, key: &str) -> Option<&Sourced<String>> {
        for layer in self.layers.iter().rev() {
            if let Some(entry) = layer.get(key) {
                return Some(entry);
            }
            if layer.masks(key) {
                return None;
            }
        }
        None
    }

    /// Whether any layer defines `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Return a store of the keys under `prefix`, with the prefix stripped.
    ///
    /// A prefix that does not end with `.` is treated as `prefix.`; an empty prefix yields
    /// the whole store. Layering and provenance are preserved.
    pub fn sub_scope(&self, prefix: &str) -> Self {
        if prefix.is_empty() {
            return self.clone();
        }
        let prefix = if prefix.ends_with('.') {
            prefix.to_string()
        } else {
            format!("{prefix}.")
        };
        let layers = self
            .layers
            .iter()
            .map(|layer| layer.scoped(&prefix))
            .filter(|layer| !layer.is_blank())
            .map(Arc::new)
            .collect();
        Self { layers }
    }

    /// Flatten into a single map, last writer wins.
    ///
    /// Keys keep the position of their first definition.
    pub fn properties(&self) -> IndexMap<String, String, std::hash::RandomState> {
        let mut flat = IndexMap::default();
        for layer in &self.layers {
            for key in &layer.masked {
                flat.shift_remove(key);
            }
            for (key, value) in layer.iter() {
                flat.insert(key.to_string(), value.value.clone());
            }
        }
        flat
    }

    /// Distinct keys in the flattened view.
    pub fn keys(&self) -> Vec<String> {
        self.properties().into_keys().collect()
    }

    /// Number of layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}
