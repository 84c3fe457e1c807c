use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use super::{AlbumStore, IdStrategy, remove_ids};
use crate::encoding::{Album, NewAlbum};
use crate::error::{Result, StoreError};

/// In-memory album store
///
/// The collection lives for as long as the process does.
pub struct MemoryStore {
    albums: RwLock<Vec<Album>>,
    ids: IdStrategy,
}

impl MemoryStore {
    /// Create a store holding the given albums
    pub fn new(albums: Vec<Album>, ids: IdStrategy) -> Self {
        Self {
            albums: RwLock::new(albums),
            ids,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Vec::new(), IdStrategy::default())
    }
}

#[async_trait]
impl AlbumStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Album>> {
        let albums = self.albums.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(albums.clone())
    }

    async fn create(&self, candidate: NewAlbum) -> Result<Album> {
        let mut albums = self.albums.write().map_err(|_| StoreError::LockPoisoned)?;
        let album = candidate.with_id(self.ids.assign(&albums));
        albums.push(album.clone());
        debug!("Created album {} ({} total)", album.id, albums.len());
        Ok(album)
    }

    async fn delete_many(&self, ids: &[String]) -> Result<()> {
        let mut albums = self.albums.write().map_err(|_| StoreError::LockPoisoned)?;
        let removed = remove_ids(&mut albums, ids);
        debug!("Deleted {} of {} requested albums", removed, ids.len());
        Ok(())
    }
}
