//! ABI descriptions and the dynamic codec driven by them.
//!
//! An [`Abi`] is parsed from the JSON or binary form contracts publish on
//! chain. Resolving a type name walks typedefs, structs and variants into a
//! [`resolver::ResolvedType`] graph, which the dynamic codec then uses to
//! translate untyped [`serde_json::Value`]s to and from the binary wire
//! format.

pub mod def;
pub mod dynamic;
pub mod resolver;

pub use def::AbiDef;
pub use resolver::{Abi, Builtin, ResolvedType, TypeKind};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Name does not resolve to a builtin, struct, variant or alias
    #[error("unknown type {0}")]
    UnknownType(String),

    /// Variant alternative name or index out of range
    #[error("unknown variant {0}")]
    UnknownVariant(String),

    /// A struct's base chain reaches itself
    #[error("circular reference in struct {0}")]
    CircularReference(String),

    /// Value shape does not fit the resolved type
    #[error("{path}: expected {expected}, got {value}")]
    InvalidValue {
        expected: String,
        value: String,
        path: String,
    },

    /// The node has no codec (unresolved type name on the encode side)
    #[error("type {0} is not encodable")]
    TypeNotEncodable(String),

    /// Nesting deeper than the codec is willing to walk
    #[error("maximum nesting depth exceeded")]
    MaxDepthExceeded,

    #[error(transparent)]
    Codec(#[from] sable_codec::Error),

    #[error("invalid ABI JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Recursively sort object keys, for stable test output.
pub fn sort_json_keys(value: &serde_json::Value) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map
                .iter()
                .map(|(k, v)| (k.clone(), sort_json_keys(v)))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_json_keys).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorting_is_recursive() {
        let value = json!({"b": 1, "a": {"z": [ {"y": 1, "x": 2} ], "w": 3}});
        let sorted = sort_json_keys(&value);
        assert_eq!(
            serde_json::to_string(&sorted).unwrap(),
            r#"{"a":{"w":3,"z":[{"x":2,"y":1}]},"b":1}"#
        );
    }
}
