//! Album encoding/decoding for storage
//!
//! The backing document is a single top-level JSON array of album objects.
//! There is no version header.

pub mod album;

use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;

pub use album::{Album, NewAlbum};

/// Decode a JSON object into `T`
///
/// Derived struct deserializers also take a JSON array and fill fields by
/// position, so anything other than an object is rejected first.
pub fn decode_object<T: DeserializeOwned>(bytes: &[u8]) -> serde_json::Result<T> {
    match serde_json::from_slice::<Value>(bytes)? {
        value @ Value::Object(_) => serde_json::from_value(value),
        other => Err(serde_json::Error::custom(format!(
            "expected a JSON object, found {}",
            kind(&other)
        ))),
    }
}

/// Decode a backing document into an album collection
pub fn decode(bytes: &[u8]) -> serde_json::Result<Vec<Album>> {
    let items = match serde_json::from_slice::<Value>(bytes)? {
        Value::Array(items) => items,
        other => {
            return Err(serde_json::Error::custom(format!(
                "expected a JSON array of albums, found {}",
                kind(&other)
            )));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(_) => serde_json::from_value(item),
            other => Err(serde_json::Error::custom(format!(
                "album {} is {}, expected a JSON object",
                i,
                kind(&other)
            ))),
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Encode an album collection as a backing document
pub fn encode(albums: &[Album]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec_pretty(albums)
}
