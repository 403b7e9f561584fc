//! HTTP server for the chat API
//!
//! Routes:
//! - `POST /api/chat` for JSON or streamed chat completions
//! - `GET /health` for liveness checks

use axum::{
    Json, Router,
    extract::State,
    http::HeaderValue,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::chat::{ChatReply, ChatRequest, ChatService};
use crate::config::ServerConfig;
use crate::error::{Result, ScoutError};

use super::streaming::SseResponse;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Chat orchestration over the configured providers
    pub service: ChatService,
}

/// The chat API server
pub struct ChatServer {
    config: ServerConfig,
    service: ChatService,
}

impl ChatServer {
    pub fn new(config: ServerConfig, service: ChatService) -> Self {
        Self { config, service }
    }

    /// Bind the listen address and serve until Ctrl+C or SIGTERM
    pub async fn serve(&self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .listen_addr
            .parse()
            .map_err(|e| ScoutError::Config(format!("Invalid listen address: {e}")))?;

        let app_state = Arc::new(AppState {
            config: self.config.clone(),
            service: self.service.clone(),
        });

        let app = create_router(app_state);

        tracing::info!("Starting chat server on {addr}");
        if self.config.allowed_origins.is_empty() {
            tracing::info!("CORS: all origins allowed");
        } else {
            tracing::info!(
                "CORS: {} origins configured",
                self.config.allowed_origins.len()
            );
        }

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ScoutError::General(format!("Failed to bind to {addr}: {e}")))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ScoutError::General(format!("Server error: {e}")))?;

        tracing::info!("Chat server shut down gracefully");
        Ok(())
    }
}

/// Create the router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/chat", post(chat_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin when the list is empty, otherwise only the listed origins.
/// Entries that are not valid header values are skipped.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin {origin:?}: {e}");
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}

/// Health check endpoint - returns JSON status
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Handle a chat request in either response mode
async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> std::result::Result<Response, ScoutError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!(
        "chat",
        %request_id,
        model = %request.model,
        stream = request.stream,
        web_search = request.web_search,
    );

    let reply = async move {
        tracing::info!("Chat request with {} messages", request.messages.len());
        state.service.handle(request).await
    }
    .instrument(span)
    .await?;

    match reply {
        ChatReply::Complete(response) => Ok(Json(response).into_response()),
        ChatReply::Stream(events) => Ok(SseResponse::new(events).into_response()),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockCompletionProvider, MockSearch};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    fn test_state(allowed_origins: Vec<String>) -> Arc<AppState> {
        let service = ChatService::new(
            Arc::new(MockCompletionProvider::with_text("ok")),
            Arc::new(MockSearch::new("unused")),
        );
        Arc::new(AppState {
            config: ServerConfig {
                allowed_origins,
                ..ServerConfig::default()
            },
            service,
        })
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_router(test_state(Vec::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin_by_default() {
        let app = create_router(test_state(Vec::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_restricted_origins() {
        let app = create_router(test_state(vec!["https://app.example.com".to_string()]));

        let allowed = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "https://app.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            allowed
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://app.example.com"
        );

        let other = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "https://evil.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(
            other
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_chat_requires_post() {
        let app = create_router(test_state(Vec::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/chat")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_invalid_listen_address() {
        let server = ChatServer::new(
            ServerConfig {
                listen_addr: "not-an-address".to_string(),
                allowed_origins: Vec::new(),
            },
            test_state(Vec::new()).service.clone(),
        );

        let result = server.serve().await;
        assert!(matches!(result, Err(ScoutError::Config(_))));
    }
}
