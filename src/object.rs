//! Host objects and property resolution.
//!
//! A path such as `player.stats.score` looks up `player` in the context and
//! then resolves each further segment as a property of the previous value.
//! Properties are found in two tiers: accessors the host type declares
//! through [`Object::exposed`], then raw fields through [`Object::field`].
//! A miss in both tiers is not an error, the property is simply null.

use std::any::Any;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde_json::Value as Json;
use tracing::trace;

use crate::context::Context;
use crate::value::Value;

/// Upcast helper so trait objects can be downcast to their concrete type.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A host value reachable from a context. Every method has a default, so a
/// type only overrides what it supports.
pub trait Object: AsAny + fmt::Debug + Send + Sync + 'static {
    fn type_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Declared named properties, tried first. Typically backed by an
    /// [`Accessors`] table.
    fn exposed(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Raw field lookup by exact name, the fallback tier.
    fn field(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Structural equality with another host object. Identity is already
    /// checked by the caller.
    fn equals(&self, _other: &dyn Object) -> bool {
        false
    }

    /// Natural ordering against another host object, if one exists.
    fn compare(&self, _other: &dyn Object) -> Option<Ordering> {
        None
    }

    fn to_json(&self) -> Option<Json> {
        None
    }

    /// Textual form used by templates.
    fn display(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl dyn Object {
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Accessor returning a property of `T`.
pub type Accessor<T> = fn(&T) -> Value;

/// Table of declared properties for a host type. Build it once and consult
/// it from [`Object::exposed`]:
///
/// ```
/// use std::sync::OnceLock;
/// use canvas_expr::{Accessors, Object, Value};
///
/// #[derive(Debug)]
/// struct Player { name: String }
///
/// impl Object for Player {
///     fn exposed(&self, name: &str) -> Option<Value> {
///         static ACCESSORS: OnceLock<Accessors<Player>> = OnceLock::new();
///         ACCESSORS
///             .get_or_init(|| Accessors::<Player>::new().expose("displayName", |p| p.name.to_uppercase().into()))
///             .get(self, name)
///     }
/// }
/// ```
pub struct Accessors<T> {
    table: HashMap<&'static str, Accessor<T>>,
}

impl<T> Accessors<T> {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    pub fn expose(mut self, name: &'static str, accessor: Accessor<T>) -> Self {
        self.table.insert(name, accessor);
        self
    }

    /// Invoke the accessor registered under `name`.
    pub fn get(&self, target: &T, name: &str) -> Option<Value> {
        self.table.get(name).map(|accessor| accessor(target))
    }
}

impl<T> Default for Accessors<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Accessors<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.table.keys()).finish()
    }
}

/// Zero-configuration host object over serialized data. JSON object keys
/// and array indices are its raw fields; fields skipped by serde are not
/// visible.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    type_name: String,
    fields: Json,
}

impl Record {
    pub fn from_json(fields: Json) -> Self {
        let type_name = match &fields {
            Json::Array(_) => "array",
            _ => "object",
        };
        Self::named(type_name, fields)
    }

    pub fn named(type_name: impl Into<String>, fields: Json) -> Self {
        Self {
            type_name: type_name.into(),
            fields,
        }
    }
}

impl Object for Record {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn field(&self, name: &str) -> Option<Value> {
        let found = match &self.fields {
            Json::Object(map) => map.get(name),
            Json::Array(items) => name.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        found.cloned().map(Value::from_json)
    }

    fn equals(&self, other: &dyn Object) -> bool {
        other
            .downcast_ref::<Record>()
            .is_some_and(|o| o.fields == self.fields)
    }

    fn to_json(&self) -> Option<Json> {
        Some(self.fields.clone())
    }

    fn display(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fields)
    }
}

/// Resolve one named property of `value`. Only host objects have
/// properties; everything else resolves to null.
pub fn resolve_property(value: &Value, name: &str) -> Value {
    let Value::Object(obj) = value else {
        trace!(property = name, ty = value.type_name(), "value has no properties");
        return Value::Null;
    };
    if let Some(v) = obj.exposed(name) {
        trace!(property = name, ty = obj.type_name(), "resolved declared property");
        return v;
    }
    if let Some(v) = obj.field(name) {
        trace!(property = name, ty = obj.type_name(), "resolved raw field");
        return v;
    }
    trace!(property = name, ty = obj.type_name(), "property not found");
    Value::Null
}

/// Resolve a dotted path: the first segment from the context, the rest as
/// properties. Stops at the first null.
pub fn resolve_path(path: &str, context: &dyn Context) -> Value {
    let mut segments = path.split('.');
    let mut current = match segments.next() {
        Some(first) => context.get(first),
        None => return Value::Null,
    };
    for segment in segments {
        if current.is_null() {
            break;
        }
        current = resolve_property(&current, segment);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MapContext;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::OnceLock;

    #[derive(Debug)]
    struct Player {
        name: String,
        score: i64,
    }

    impl Object for Player {
        fn exposed(&self, name: &str) -> Option<Value> {
            static ACCESSORS: OnceLock<Accessors<Player>> = OnceLock::new();
            ACCESSORS
                .get_or_init(|| {
                    Accessors::<Player>::new()
                        .expose("displayName", |p| p.name.to_uppercase().into())
                        .expose("score", |p| Value::Int(p.score * 10))
                })
                .get(self, name)
        }

        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "name" => Some(self.name.clone().into()),
                "score" => Some(self.score.into()),
                _ => None,
            }
        }
    }

    fn player() -> Value {
        Value::object(Player {
            name: "ada".into(),
            score: 7,
        })
    }

    #[test]
    fn declared_property_wins_over_field() {
        assert_eq!(resolve_property(&player(), "score"), Value::Int(70));
        assert_eq!(resolve_property(&player(), "displayName"), Value::from("ADA"));
    }

    #[test]
    fn falls_back_to_raw_field() {
        assert_eq!(resolve_property(&player(), "name"), Value::from("ada"));
    }

    #[test]
    fn missing_property_is_null() {
        assert_eq!(resolve_property(&player(), "nope"), Value::Null);
        assert_eq!(resolve_property(&Value::Int(3), "anything"), Value::Null);
    }

    #[test]
    fn record_exposes_keys_and_indices() {
        let rec = Value::from_json(json!({"items": [{"id": 4}], "n": 2}));
        assert_eq!(resolve_property(&rec, "n"), Value::Int(2));
        let items = resolve_property(&rec, "items");
        let first = resolve_property(&items, "0");
        assert_eq!(resolve_property(&first, "id"), Value::Int(4));
        assert_eq!(resolve_property(&items, "9"), Value::Null);
    }

    #[test]
    fn path_short_circuits_on_null() {
        let p = player();
        let ctx = MapContext::new()
            .with("p", p.clone())
            .with("doc", Value::from_json(json!({"a": {"b": "deep"}})));
        assert_eq!(resolve_path("p.displayName", &ctx), Value::from("ADA"));
        assert_eq!(resolve_path("doc.a.b", &ctx), Value::from("deep"));
        assert_eq!(resolve_path("doc.x.b", &ctx), Value::Null);
        assert_eq!(resolve_path("missing.a", &ctx), Value::Null);
        // same Arc, accepted by identity
        assert_eq!(resolve_path("p", &ctx), p);
    }

    #[test]
    fn downcast_to_concrete_type() {
        let Value::Object(obj) = player() else {
            panic!("expected object");
        };
        assert_eq!(obj.downcast_ref::<Player>().map(|p| p.score), Some(7));
        assert!(obj.downcast_ref::<Record>().is_none());
    }
}
