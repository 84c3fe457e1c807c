use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{AlbumStore, IdStrategy, remove_ids};
use crate::encoding::{self, Album, NewAlbum};
use crate::error::{Result, StoreError};

/// Album store backed by a single JSON document
///
/// Nothing is cached between operations: every call reads the whole document
/// and every mutation rewrites it. A process-wide lock serializes the
/// load-mutate-save cycle, so writers inside this process never lose each
/// other's updates. Other processes writing the same file are not guarded
/// against and the last writer wins.
pub struct FileStore {
    path: PathBuf,
    ids: IdStrategy,
    lock: Mutex<()>,
}

impl FileStore {
    /// Open the store at `path`, writing `seed` as the initial document if the
    /// file does not exist yet. An existing document is left untouched.
    pub async fn open(path: impl AsRef<Path>, seed: Vec<Album>, ids: IdStrategy) -> Result<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            ids,
            lock: Mutex::new(()),
        };

        let exists = tokio::fs::try_exists(&store.path)
            .await
            .map_err(|source| StoreError::Read {
                path: store.path.clone(),
                source,
            })?;
        if !exists {
            info!(
                "Backing document {} not found, creating it with {} albums",
                store.path.display(),
                seed.len()
            );
            store.save(&seed).await?;
        }

        Ok(store)
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<Album>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })?;

        encoding::decode(&bytes).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, albums: &[Album]) -> Result<()> {
        let bytes = encoding::encode(albums).map_err(StoreError::Encode)?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

#[async_trait]
impl AlbumStore for FileStore {
    async fn list(&self) -> Result<Vec<Album>> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    async fn create(&self, candidate: NewAlbum) -> Result<Album> {
        let _guard = self.lock.lock().await;
        let mut albums = self.load().await?;
        let album = candidate.with_id(self.ids.assign(&albums));
        albums.push(album.clone());
        self.save(&albums).await?;
        debug!("Created album {} ({} total)", album.id, albums.len());
        Ok(album)
    }

    async fn delete_many(&self, ids: &[String]) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut albums = self.load().await?;
        let removed = remove_ids(&mut albums, ids);
        self.save(&albums).await?;
        debug!("Deleted {} of {} requested albums", removed, ids.len());
        Ok(())
    }
}
