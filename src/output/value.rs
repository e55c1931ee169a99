// src/output/value.rs

//! Structured value accumulated from the export stream.
//!
//! Filling follows unification rules: structs merge field by field, lists
//! of equal length merge element by element, and leaves must be equal.
//! Anything else is a conflict, and a conflicting fill leaves the value
//! untouched.

use std::fmt;

use serde_json::{Map, Value as Json};
use thiserror::Error;

/// Two different values met at the same field path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("conflicting values at '{path}': {existing} != {incoming}")]
pub struct MergeConflict {
    /// Dotted field path, `<root>` for the top level.
    pub path: String,
    pub existing: String,
    pub incoming: String,
}

/// A hierarchical, mergeable value.
#[derive(Debug, Clone, PartialEq)]
pub struct Value(Json);

impl Value {
    /// The empty struct `{}`.
    pub fn empty_struct() -> Self {
        Value(Json::Object(Map::new()))
    }

    pub fn from_json(json: Json) -> Self {
        Value(json)
    }

    pub fn as_json(&self) -> &Json {
        &self.0
    }

    pub fn into_json(self) -> Json {
        self.0
    }

    /// True for `{}`.
    pub fn is_empty(&self) -> bool {
        matches!(&self.0, Json::Object(map) if map.is_empty())
    }

    /// Look up a dotted field path such as `"app.image.tag"`.
    pub fn lookup(&self, path: &str) -> Option<&Json> {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(&self.0, |current, segment| match current {
                Json::Object(map) => map.get(segment),
                Json::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }

    /// Unify `other` into `self`.
    pub fn fill(&mut self, other: Value) -> Result<(), MergeConflict> {
        let mut merged = self.0.clone();
        let mut path = Vec::new();
        unify(&mut merged, other.0, &mut path)?;
        self.0 = merged;
        Ok(())
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::empty_struct()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        Value(json)
    }
}

fn unify(dst: &mut Json, src: Json, path: &mut Vec<String>) -> Result<(), MergeConflict> {
    match (dst, src) {
        (Json::Object(existing), Json::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(slot) => {
                        path.push(key);
                        unify(slot, value, path)?;
                        path.pop();
                    }
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
            Ok(())
        }
        (Json::Array(existing), Json::Array(incoming)) if existing.len() == incoming.len() => {
            for (i, (slot, value)) in existing.iter_mut().zip(incoming).enumerate() {
                path.push(i.to_string());
                unify(slot, value, path)?;
                path.pop();
            }
            Ok(())
        }
        (existing, incoming) if *existing == incoming => Ok(()),
        (existing, incoming) => Err(MergeConflict {
            path: render_path(path),
            existing: existing.to_string(),
            incoming: incoming.to_string(),
        }),
    }
}

fn render_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}
