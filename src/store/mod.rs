//! Album store
//!
//! Two backends share the [`AlbumStore`] interface: [`MemoryStore`] keeps the
//! collection in process memory, [`FileStore`] treats a single JSON document
//! as the source of truth and reloads it on every operation.

pub mod file;
pub mod memory;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{Backend, StoreConfig};
use crate::encoding::{Album, NewAlbum};
use crate::error::Result;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Store handle shared between request handlers
pub type SharedStore = Arc<dyn AlbumStore>;

/// Operations every album store backend provides
#[async_trait]
pub trait AlbumStore: Send + Sync {
    /// Return the full collection in insertion order
    async fn list(&self) -> Result<Vec<Album>>;

    /// Assign an id to the candidate, append it and return the stored album
    async fn create(&self, candidate: NewAlbum) -> Result<Album>;

    /// Remove every album whose id is listed. Unknown ids are ignored.
    async fn delete_many(&self, ids: &[String]) -> Result<()>;
}

/// How a newly created album gets its id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdStrategy {
    /// Collection length plus one. Collides with an existing id once any
    /// album has been deleted.
    #[default]
    Length,
    /// Largest numeric id plus one. Never hands out an id that is present.
    NextFree,
}

impl IdStrategy {
    /// Pick the id for an album about to be appended to `albums`
    pub fn assign(&self, albums: &[Album]) -> String {
        match self {
            IdStrategy::Length => (albums.len() + 1).to_string(),
            IdStrategy::NextFree => {
                let taken: HashSet<&str> = albums.iter().map(|a| a.id.as_str()).collect();
                let max = albums
                    .iter()
                    .filter_map(|a| a.id.parse::<u128>().ok())
                    .max()
                    .unwrap_or(0);
                // past the numeric ceiling, fall back to the lowest free id
                let mut next = max.checked_add(1).unwrap_or(1);
                while taken.contains(next.to_string().as_str()) {
                    next += 1;
                }
                next.to_string()
            }
        }
    }
}

impl std::str::FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "length" => Ok(IdStrategy::Length),
            "next-free" => Ok(IdStrategy::NextFree),
            other => Err(format!("unknown id strategy '{}'", other)),
        }
    }
}

/// Remove every album whose id is in `ids`, returning how many were removed
///
/// Walks the collection from the last index to the first so that removing
/// an element never shifts one that has not been examined yet.
pub(crate) fn remove_ids(albums: &mut Vec<Album>, ids: &[String]) -> usize {
    let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let mut removed = 0;
    for i in (0..albums.len()).rev() {
        if wanted.contains(albums[i].id.as_str()) {
            albums.remove(i);
            removed += 1;
        }
    }
    removed
}

/// Sample collection a fresh store starts from
pub fn seed_albums() -> Vec<Album> {
    vec![
        NewAlbum::new("Blue Train", "John Coltrane", 56.99).with_id("1"),
        NewAlbum::new("Jeru", "Gerry Mulligan", 17.99).with_id("2"),
        NewAlbum::new("Sarah Vaughan and Clifford Brown", "Sarah Vaughan", 39.99).with_id("3"),
    ]
}

/// Build the store backend selected by the configuration
pub async fn open(config: &StoreConfig) -> Result<SharedStore> {
    let seed = if config.seed { seed_albums() } else { Vec::new() };

    let store: SharedStore = match config.backend {
        Backend::Memory => {
            info!("Using in-memory album store ({} seed albums)", seed.len());
            Arc::new(MemoryStore::new(seed, config.id_strategy))
        }
        Backend::File => {
            let store = FileStore::open(&config.path, seed, config.id_strategy).await?;
            info!("Using file-backed album store at {}", store.path().display());
            Arc::new(store)
        }
    };

    Ok(store)
}
