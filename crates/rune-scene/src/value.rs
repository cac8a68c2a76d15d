//! Dynamic values exchanged through field paths, bindings and descriptors.
//!
//! Descriptors are authored as JSON, so `Value` mirrors the JSON data model
//! with one extra case: a reference to an object living in the [`Stage`].
//!
//! [`Stage`]: crate::stage::Stage

use serde::{Deserialize, Serialize};

use crate::stage::ObjectId;

/// A dynamically typed property value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Reference to a live object. Serialized as `{"object": {...}}`.
    Object { object: ObjectId },
    List(Vec<Value>),
}

impl Value {
    pub fn object(id: ObjectId) -> Self {
        Self::Object { object: id }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Number(n) => Some(*n != 0.0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Self::Object { object } => Some(*object),
            _ => None,
        }
    }

    /// Collect every object reference held by this value.
    ///
    /// A single reference yields one id, a list yields the ids of its object
    /// elements in order, anything else yields nothing.
    pub fn objects(&self) -> Vec<ObjectId> {
        match self {
            Self::Object { object } => vec![*object],
            Self::List(items) => items.iter().filter_map(Value::as_object).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Number(v as f64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Number(v as f64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Self::object(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_json_shapes() {
        let parsed: Vec<Value> = serde_json::from_str(r#"[null, true, 2.5, "$a.b", [1, 2]]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Number(2.5),
                Value::Text("$a.b".into()),
                Value::List(vec![Value::Number(1.0), Value::Number(2.0)]),
            ]
        );
    }

    #[test]
    fn test_object_list_collects_only_references() {
        let a = ObjectId::new(1, 0);
        let b = ObjectId::new(4, 2);
        let list = Value::List(vec![Value::object(a), Value::Number(3.0), Value::object(b)]);
        assert_eq!(list.objects(), vec![a, b]);
        assert!(Value::Number(1.0).objects().is_empty());
    }
}
