//! Key/value environments expressions and templates are evaluated against.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use serde_json::Value as Json;

use crate::errors::{EvalError, Result};
use crate::value::Value;

/// Lookup surface the evaluator consumes. Missing keys are null, never an
/// error.
pub trait Context {
    fn get(&self, key: &str) -> Value;

    /// New immutable context with `key` bound on top of this one. `self` is
    /// left untouched.
    fn with(&self, key: &str, value: Value) -> MapContext;

    /// Enumerable bindings, used by [`merge`]. Contexts that cannot list
    /// their keys return `None` and contribute nothing to a merge.
    fn entries(&self) -> Option<&HashMap<String, Value>> {
        None
    }
}

/// Immutable context. Cloning shares the bindings; `with` copies them.
#[derive(Clone, Default)]
pub struct MapContext {
    data: Arc<HashMap<String, Value>>,
}

impl MapContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(data: HashMap<String, Value>) -> Self {
        Self {
            data: Arc::new(data),
        }
    }

    /// Build a context from a JSON object; each top-level key becomes a
    /// binding.
    pub fn from_json(json: &Json) -> Result<Self> {
        let Json::Object(map) = json else {
            return Err(EvalError::InvalidContext(format!(
                "expected a JSON object, got `{json}`"
            )));
        };
        Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), Value::from_json(v.clone())))
            .collect())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }
}

impl Context for MapContext {
    fn get(&self, key: &str) -> Value {
        self.data.get(key).cloned().unwrap_or(Value::Null)
    }

    fn with(&self, key: &str, value: Value) -> MapContext {
        let mut data = (*self.data).clone();
        data.insert(key.to_string(), value);
        MapContext::from_map(data)
    }

    fn entries(&self) -> Option<&HashMap<String, Value>> {
        Some(self.data.as_ref())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for MapContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Debug for MapContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MapContext {{ {} }}", self.data.keys().sorted().join(", "))
    }
}

/// Context updated in place with [`MutableContext::set`].
///
/// Not synchronized: sharing one across threads while it is being `set`
/// requires the caller's own lock (e.g. a `Mutex<MutableContext>`).
#[derive(Debug, Clone, Default)]
pub struct MutableContext {
    data: HashMap<String, Value>,
}

impl MutableContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a binding.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    /// Immutable copy of the current bindings.
    pub fn snapshot(&self) -> MapContext {
        MapContext::from_map(self.data.clone())
    }
}

impl Context for MutableContext {
    fn get(&self, key: &str) -> Value {
        self.data.get(key).cloned().unwrap_or(Value::Null)
    }

    fn with(&self, key: &str, value: Value) -> MapContext {
        let mut data = self.data.clone();
        data.insert(key.to_string(), value);
        MapContext::from_map(data)
    }

    fn entries(&self) -> Option<&HashMap<String, Value>> {
        Some(&self.data)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for MutableContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Merge contexts in order; on duplicate keys the later context wins.
pub fn merge(contexts: &[&dyn Context]) -> MapContext {
    let mut merged = HashMap::new();
    for entries in contexts.iter().filter_map(|c| c.entries()) {
        merged.extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    MapContext::from_map(merged)
}
