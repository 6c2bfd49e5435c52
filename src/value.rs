//! Dynamically typed values flowing through contexts, expressions and templates.

use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::errors::{EvalError, Result};
use crate::object::{Object, Record};

/// A context value: a scalar or an opaque host object.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Object(Arc<dyn Object>),
}

impl Value {
    /// Wrap a host object.
    pub fn object<O: Object>(obj: O) -> Self {
        Value::Object(Arc::new(obj))
    }

    /// Wrap any serializable value as a host object whose serialized fields
    /// are its raw fields. Types serializing to a scalar become that scalar.
    pub fn record<T: serde::Serialize>(value: &T) -> Result<Self> {
        let name = short_type_name::<T>();
        let json = serde_json::to_value(value)
            .map_err(|e| EvalError::InvalidContext(format!("cannot serialize {name}: {e}")))?;
        Ok(match json {
            Json::Object(_) | Json::Array(_) => Value::object(Record::named(name, json)),
            scalar => Value::from_json(scalar),
        })
    }

    /// Convert a JSON document. Objects and arrays become [`Record`]s.
    pub fn from_json(json: Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            Json::String(s) => Value::Str(s),
            other @ (Json::Object(_) | Json::Array(_)) => {
                Value::Object(Arc::new(Record::from_json(other)))
            }
        }
    }

    /// JSON projection of the value. Non-finite floats become `null`, host
    /// objects without a JSON form become their textual rendering.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Str(s) => Json::String(s.clone()),
            Value::Object(obj) => obj
                .to_json()
                .unwrap_or_else(|| Json::String(self.to_string())),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Booleans pass through, numbers are true when nonzero, null is false
    /// and every other value is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(_) | Value::Object(_) => true,
        }
    }

    /// Name of the runtime type, used in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Object(obj) => obj.type_name(),
        }
    }
}

/// Structural equality. Variants never compare equal across each other, so
/// `Int(5) != Float(5.0)`. Host objects accept on pointer identity first.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)) || a.equals(b.as_ref())
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => {
                write!(f, "{x:.1}")
            }
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Object(obj) => obj.display(f),
        }
    }
}

/// `alloc::vec::Vec<app::Item>` becomes `Vec`.
fn short_type_name<T>() -> &'static str {
    let name = std::any::type_name::<T>();
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(i: $t) -> Self {
                Value::Int(i64::from(i))
            }
        })*
    };
}

from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        Value::from_json(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn truthiness_follows_type() {
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Int(8).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(Value::from("").is_truthy());
    }

    #[test]
    fn display_matches_textual_form() {
        assert_eq!(Value::Int(99).to_string(), "99");
        assert_eq!(Value::Float(5.0).to_string(), "5.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from("hi").to_string(), "hi");
    }

    #[test]
    fn large_integral_floats_keep_fraction() {
        assert_eq!(Value::Float(1e16).to_string(), "10000000000000000.0");
        assert_eq!(Value::Float(-3e20).to_string(), "-300000000000000000000.0");
        assert_eq!(Value::Float(f64::INFINITY).to_string(), "inf");
    }

    #[derive(serde::Serialize)]
    struct Wrapper<T> {
        inner: T,
    }

    #[test]
    fn record_names_strip_paths_and_generics() {
        let v = Value::record(&Wrapper { inner: 1 }).unwrap();
        assert_eq!(v.type_name(), "Wrapper");
        assert_eq!(Value::record(&5).unwrap(), Value::Int(5));
    }

    #[test]
    fn record_reports_serialization_failure() {
        let mut map = std::collections::HashMap::new();
        map.insert((1, 2), "pair");
        let err = Value::record(&map).unwrap_err();
        assert!(matches!(err, EvalError::InvalidContext(_)));
        assert!(err.to_string().contains("cannot serialize HashMap"));
    }

    #[test]
    fn equality_is_per_variant() {
        assert_eq!(Value::Int(5), Value::Int(5));
        assert_ne!(Value::Int(5), Value::Float(5.0));
        assert_ne!(Value::Null, Value::Int(0));
        assert_eq!(Value::Null, Value::Null);
    }

    #[test]
    fn json_conversion_keeps_integers_integral() {
        assert_eq!(Value::from_json(json!(3)), Value::Int(3));
        assert_eq!(Value::from_json(json!(3.5)), Value::Float(3.5));
        assert_eq!(Value::from_json(json!("x")), Value::from("x"));
        assert!(matches!(Value::from_json(json!({"a": 1})), Value::Object(_)));
        assert_eq!(Value::from_json(json!({"a": [1, 2]})).to_json(), json!({"a": [1, 2]}));
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(4)), Value::Int(4));
    }
}
