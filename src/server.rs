//! HTTP read API.
//!
//! Exposes the ranking service as JSON. Nothing here writes to the store.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/topics` | Known topics and their configured query counts |
//! | `GET`  | `/topics/{topic}/content` | Ranked content for one topic |
//! | `POST` | `/content/fetch` | Ranked content merged across topics |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "retrieval_unavailable", "message": "content store unavailable" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404),
//! `retrieval_unavailable` (503).

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use curator_core::error::RetrievalError;
use curator_core::models::{ContentItem, Topic};
use curator_core::retrieval::{fetch, fetch_many};
use curator_core::store::{ContentStore, TopicQuery};

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Shared state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    store: Arc<dyn ContentStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ContentStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}

/// Starts the server against the configured SQLite database.
///
/// Binds to `[server].bind` and runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    let store: Arc<dyn ContentStore> = Arc::new(SqliteStore::new(pool));
    serve(AppState::new(config.clone(), store)).await
}

/// Starts the server with an explicit store.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let bind_addr = state.config.server.bind.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "server listening");
    println!("Listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/topics", get(handle_topics))
        .route("/topics/{topic}/content", get(handle_topic_content))
        .route("/content/fetch", post(handle_fetch))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

impl From<RetrievalError> for AppError {
    fn from(err: RetrievalError) -> Self {
        let status = match &err {
            RetrievalError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            RetrievalError::Unavailable(source) => {
                tracing::error!(error = %source, "retrieval failed");
                StatusCode::SERVICE_UNAVAILABLE
            }
        };
        AppError {
            status,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /topics ============

#[derive(Serialize)]
struct TopicInfo {
    id: &'static str,
    name: &'static str,
    label: &'static str,
    queries: usize,
}

#[derive(Serialize)]
struct TopicsResponse {
    topics: Vec<TopicInfo>,
}

async fn handle_topics(State(state): State<AppState>) -> Json<TopicsResponse> {
    let topics = Topic::ALL
        .into_iter()
        .map(|t| TopicInfo {
            id: t.as_str(),
            name: t.display_name(),
            label: t.label(),
            queries: state
                .config
                .topics
                .get(&t)
                .map(|c| c.queries.len())
                .unwrap_or(0),
        })
        .collect();
    Json(TopicsResponse { topics })
}

// ============ GET /topics/{topic}/content ============

#[derive(Deserialize)]
struct ContentParams {
    min_quality: Option<f64>,
    limit: Option<usize>,
}

#[derive(Serialize)]
struct TopicContentResponse {
    topic: Topic,
    items: Vec<ContentItem>,
}

async fn handle_topic_content(
    State(state): State<AppState>,
    Path(topic): Path<String>,
    params: Result<Query<ContentParams>, QueryRejection>,
) -> Result<Json<TopicContentResponse>, AppError> {
    let topic: Topic = topic.parse().map_err(|e| not_found(format!("{}", e)))?;
    let Query(params) = params.map_err(|e| bad_request(e.body_text()))?;

    let query = TopicQuery {
        topic,
        min_quality: params
            .min_quality
            .unwrap_or(state.config.retrieval.min_quality),
        limit: params.limit.unwrap_or(state.config.retrieval.final_limit),
    };
    let items = fetch(state.store.as_ref(), &query).await?;
    Ok(Json(TopicContentResponse { topic, items }))
}

// ============ POST /content/fetch ============

#[derive(Deserialize)]
struct FetchRequest {
    topics: Vec<String>,
    #[serde(default)]
    min_quality: Option<f64>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Serialize)]
struct FetchResponse {
    items: Vec<ContentItem>,
}

async fn handle_fetch(
    State(state): State<AppState>,
    body: Result<Json<FetchRequest>, JsonRejection>,
) -> Result<Json<FetchResponse>, AppError> {
    let Json(req) = body.map_err(|e| bad_request(e.body_text()))?;
    if req.topics.is_empty() {
        return Err(bad_request("topics must not be empty"));
    }
    let topics = req
        .topics
        .iter()
        .map(|t| t.parse::<Topic>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| bad_request(e.to_string()))?;

    let items = fetch_many(
        state.store.as_ref(),
        &topics,
        req.min_quality
            .unwrap_or(state.config.retrieval.min_quality),
        req.limit.unwrap_or(state.config.retrieval.final_limit),
    )
    .await?;
    Ok(Json(FetchResponse { items }))
}
