use serde::Serialize;
use tracing::error;

use crate::encoding::Album;

/// Message returned after a successful bulk delete
pub const DELETED_MESSAGE: &str = "Selected items deleted";

/// Outcome of a command, ready to be written back to the client
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
  /// Full album collection
  Albums(Vec<Album>),
  /// Album stored by a create
  Created(Album),
  /// Bulk delete finished
  Deleted,
  /// Request body could not be decoded
  BadRequest(String),
  /// The store failed to load or persist the collection
  Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
  error: &'a str,
}

#[derive(Serialize)]
struct MessageBody<'a> {
  message: &'a str,
}

impl Reply {
  /// HTTP status code for this reply
  pub fn status(&self) -> u16 {
    match self {
      Reply::Albums(_) | Reply::Deleted => 200,
      Reply::Created(_) => 201,
      Reply::BadRequest(_) => 400,
      Reply::Internal(_) => 500,
    }
  }

  /// Encode the reply body as JSON bytes
  pub fn encode(&self) -> Vec<u8> {
    let encoded = match self {
      Reply::Albums(albums) => serde_json::to_vec_pretty(albums),
      Reply::Created(album) => serde_json::to_vec(album),
      Reply::Deleted => serde_json::to_vec(&MessageBody {
        message: DELETED_MESSAGE,
      }),
      Reply::BadRequest(msg) | Reply::Internal(msg) => serde_json::to_vec(&ErrorBody { error: msg }),
    };
    or_encode_error(encoded)
  }
}

/// Body sent when a reply could not be serialized
const ENCODE_FAILED_BODY: &[u8] = br#"{"error":"failed to encode reply"}"#;

fn or_encode_error(encoded: serde_json::Result<Vec<u8>>) -> Vec<u8> {
  encoded.unwrap_or_else(|e| {
    error!("Failed to encode reply: {}", e);
    ENCODE_FAILED_BODY.to_vec()
  })
}
