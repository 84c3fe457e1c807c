use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::encoding::{self, NewAlbum};
use crate::protocol::reply::Reply;
use crate::store::AlbumStore;

/// Body of a bulk delete request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub ids: Vec<String>,
}

/// Album commands
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// List every album
    List,
    /// Create an album from the client payload
    Create(NewAlbum),
    /// Delete every album whose id is listed
    DeleteMany(DeleteRequest),
    /// Request body did not decode; carries the decoder message
    Invalid(String),
}

impl Command {
    /// Parse a create request body
    pub fn create(body: &[u8]) -> Self {
        match encoding::decode_object::<NewAlbum>(body) {
            Ok(album) => Command::Create(album),
            Err(e) => Command::Invalid(e.to_string()),
        }
    }

    /// Parse a bulk delete request body
    pub fn delete_many(body: &[u8]) -> Self {
        match encoding::decode_object::<DeleteRequest>(body) {
            Ok(req) => Command::DeleteMany(req),
            Err(e) => Command::Invalid(e.to_string()),
        }
    }

    /// Execute the command on the given store and return the reply
    pub async fn execute(self, store: &dyn AlbumStore) -> Reply {
        let result = match self {
            Command::List => store.list().await.map(Reply::Albums),
            Command::Create(album) => store.create(album).await.map(Reply::Created),
            Command::DeleteMany(req) => store.delete_many(&req.ids).await.map(|_| Reply::Deleted),
            Command::Invalid(msg) => {
                warn!("Rejected malformed request body: {}", msg);
                return Reply::BadRequest(msg);
            }
        };

        result.unwrap_or_else(|e| {
            error!("Album store operation failed: {}", e);
            Reply::Internal(e.to_string())
        })
    }
}
