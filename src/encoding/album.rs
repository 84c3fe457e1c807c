//! Album record encoding/decoding

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// A music release held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    /// Identifier, unique within the collection and never changed once assigned
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(deserialize_with = "deserialize_price")]
    pub price: f64,
}

/// Album payload submitted by a client, before an id is assigned
///
/// Missing fields fall back to their zero value. Any `id` sent by the
/// client is ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewAlbum {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub price: f64,
}

impl NewAlbum {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, price: f64) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            price,
        }
    }

    /// Attach an id, producing the stored record
    pub fn with_id(self, id: impl Into<String>) -> Album {
        Album {
            id: id.into(),
            title: self.title,
            artist: self.artist,
            price: self.price,
        }
    }
}

/// Accepts a price written as a JSON number or as a numeric string
fn deserialize_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Number(f64),
        Text(String),
    }

    match Price::deserialize(deserializer)? {
        Price::Number(n) => Ok(n),
        Price::Text(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| D::Error::custom(format!("invalid price '{}'", s))),
    }
}
