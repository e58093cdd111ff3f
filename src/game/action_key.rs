//! Canonical action keys.
//!
//! A key is derived from the semantic content of an action, never from its
//! in-memory layout: the action is serialized to a JSON value and every object
//! is rebuilt with its fields in sorted order before rendering, so two actions
//! that differ only in field insertion order share a key.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Canonical, injective string identifying an action.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionKey(String);

impl ActionKey {
    /// Wraps an explicit key produced by a game-specific encoding.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Builds the key from the action's `serde` representation.
    pub fn canonical<T: Serialize + ?Sized>(action: &T) -> crate::Result<Self> {
        let value = sort_object_keys(serde_json::to_value(action)?);
        Ok(Self(serde_json::to_string(&value)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn sort_object_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (key, inner) in entries {
                sorted.insert(key, sort_object_keys(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_object_keys).collect()),
        other => other,
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ActionKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}
