// src/output/decode.rs

use serde_json::Value as Json;

use crate::errors::{PlansolveError, Result};

use super::value::Value;

/// Decoder for one structured source format found in the export stream.
pub trait SourceDecoder: Send + Sync {
    /// File extension, including the leading dot.
    fn extension(&self) -> &str;

    /// Whether an entry at `path` should be decoded at all.
    fn matches(&self, path: &str) -> bool {
        path.ends_with(self.extension())
    }

    /// Decode `contents` read from `path` into a struct value.
    fn decode(&self, path: &str, contents: &[u8]) -> Result<Value>;
}

/// `.json` files, decoded with `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl SourceDecoder for JsonDecoder {
    fn extension(&self) -> &str {
        ".json"
    }

    fn decode(&self, path: &str, contents: &[u8]) -> Result<Value> {
        let json: Json = serde_json::from_slice(contents).map_err(|e| decode_error(path, e))?;
        ensure_struct(path, json)
    }
}

/// `.toml` files, decoded with `toml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlDecoder;

impl SourceDecoder for TomlDecoder {
    fn extension(&self) -> &str {
        ".toml"
    }

    fn decode(&self, path: &str, contents: &[u8]) -> Result<Value> {
        let text = std::str::from_utf8(contents).map_err(|e| decode_error(path, e))?;
        let json: Json = toml::from_str(text).map_err(|e| decode_error(path, e))?;
        ensure_struct(path, json)
    }
}

fn ensure_struct(path: &str, json: Json) -> Result<Value> {
    if !json.is_object() {
        return Err(PlansolveError::DecodeError {
            path: path.to_string(),
            message: "top-level value must be a struct".to_string(),
        });
    }
    Ok(Value::from_json(json))
}

fn decode_error(path: &str, err: impl std::fmt::Display) -> PlansolveError {
    PlansolveError::DecodeError {
        path: path.to_string(),
        message: err.to_string(),
    }
}
