use std::net::SocketAddr;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::protocol::{Command, Reply};
use crate::store::SharedStore;

/// HTTP server exposing the album store
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    store: SharedStore,
}

impl Server {
    /// Create and bind the HTTP server to the specified address
    pub async fn bind(addr: &str, store: SharedStore) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("HTTP server bound to {}", local_addr);

        Ok(Self {
            listener,
            local_addr,
            store,
        })
    }

    /// Get local listening address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve requests until ctrl-c is received
    pub async fn run(self) -> std::io::Result<()> {
        info!("Server started, listening on {}", self.local_addr);

        axum::serve(self.listener, router(self.store))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

/// Build the `/albums` router with CORS and request tracing
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route(
            "/albums",
            get(list_albums).post(create_album).delete(delete_albums),
        )
        .layer(middleware::from_fn(preflight))
        // CORS headers, also applied to preflight answers
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, GET, OPTIONS, PUT, DELETE"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static("600"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

async fn list_albums(State(store): State<SharedStore>) -> Reply {
    Command::List.execute(store.as_ref()).await
}

async fn create_album(State(store): State<SharedStore>, body: Bytes) -> Reply {
    Command::create(&body).execute(store.as_ref()).await
}

async fn delete_albums(State(store): State<SharedStore>, body: Bytes) -> Reply {
    Command::delete_many(&body).execute(store.as_ref()).await
}

/// Answers any OPTIONS request with an empty 204
async fn preflight(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }
    next.run(request).await
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
            Body::from(self.encode()),
        )
            .into_response()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        // never resolve, keep serving
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::NewAlbum;
    use crate::store::{FileStore, IdStrategy, MemoryStore, seed_albums};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn memory_router() -> Router {
        let seed = vec![NewAlbum::new("Blue Train", "John Coltrane", 56.99).with_id("1")];
        router(Arc::new(MemoryStore::new(seed, IdStrategy::Length)))
    }

    fn request(method: Method, body: &str) -> Request {
        axum::http::Request::builder()
            .method(method)
            .uri("/albums")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &Router, req: Request) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let app = memory_router();

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                r#"{"title":"Jeru","artist":"Gerry Mulligan","price":17.99}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            body,
            json!({"id": "2", "title": "Jeru", "artist": "Gerry Mulligan", "price": 17.99})
        );

        let (status, body) = send(&app, request(Method::GET, "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {"id": "1", "title": "Blue Train", "artist": "John Coltrane", "price": 56.99},
                {"id": "2", "title": "Jeru", "artist": "Gerry Mulligan", "price": 17.99}
            ])
        );
    }

    #[tokio::test]
    async fn test_create_malformed_body() {
        let app = memory_router();

        let (status, body) = send(&app, request(Method::POST, "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (_, body) = send(&app, request(Method::GET, "")).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_selected() {
        let app = router(Arc::new(MemoryStore::new(seed_albums(), IdStrategy::Length)));

        let (status, body) = send(&app, request(Method::DELETE, r#"{"ids":["1","3"]}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Selected items deleted"}));

        let (_, body) = send(&app, request(Method::GET, "")).await;
        assert_eq!(
            body,
            json!([{"id": "2", "title": "Jeru", "artist": "Gerry Mulligan", "price": 17.99}])
        );
    }

    #[tokio::test]
    async fn test_delete_unknown_and_malformed() {
        let app = memory_router();

        let (status, body) = send(&app, request(Method::DELETE, r#"{"ids":["999"]}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Selected items deleted"}));

        let (status, body) = send(&app, request(Method::DELETE, r#"["1"]"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_array_bodies_rejected() {
        let app = router(Arc::new(MemoryStore::new(seed_albums(), IdStrategy::Length)));

        let (status, body) = send(
            &app,
            request(Method::POST, r#"["Jeru","Gerry Mulligan",17.99]"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = send(&app, request(Method::DELETE, r#"[["1"]]"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&app, request(Method::GET, "")).await;
        assert_eq!(body, serde_json::to_value(seed_albums()).unwrap());
    }

    #[tokio::test]
    async fn test_cors_headers_on_unknown_path() {
        let app = memory_router();
        let req = axum::http::Request::builder()
            .method(Method::GET)
            .uri("/missing")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let app = memory_router();
        let response = app.oneshot(request(Method::GET, "")).await.unwrap();
        let headers = response.headers();

        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_METHODS],
            "POST, GET, OPTIONS, PUT, DELETE"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "600");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn test_options_preflight() {
        let app = memory_router();
        let response = app.oneshot(request(Method::OPTIONS, "")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_file_store_failure_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("albums.json"), seed_albums(), IdStrategy::Length)
            .await
            .unwrap();
        std::fs::write(store.path(), "[{\"id\": 1}]").unwrap();
        let app = router(Arc::new(store));

        let (status, body) = send(&app, request(Method::GET, "")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("albums.json"));

        // the server keeps answering
        let (status, _) = send(&app, request(Method::POST, "bad")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("albums.json");
        let store = FileStore::open(&path, seed_albums(), IdStrategy::Length)
            .await
            .unwrap();
        let app = router(Arc::new(store));

        let (status, created) = send(
            &app,
            request(Method::POST, r#"{"title":"Giant Steps","artist":"John Coltrane","price":"12.5"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["id"], "4");
        assert_eq!(created["price"], 12.5);

        let reopened = FileStore::open(&path, Vec::new(), IdStrategy::Length)
            .await
            .unwrap();
        let app = router(Arc::new(reopened));
        let (_, body) = send(&app, request(Method::GET, "")).await;
        assert_eq!(body[3], created);
    }
}
