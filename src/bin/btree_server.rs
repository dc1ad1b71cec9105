//! HTTP server for visualizing an in-memory B-tree.
//!
//! Provides REST API endpoints for:
//! - Key insertion, lookup and deletion
//! - Tree visualization export
//! - Resetting the tree with a new minimum degree
//!
//! The listen address comes from `BTREE_SERVER_ADDR` (default `0.0.0.0:3001`).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use btree_arena::{BTreeConfig, Key, SharedBTree, TreeNode, TreeStats};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:3001";

/// Application state shared across handlers
struct AppState {
    /// Replaced wholesale when the tree is reset with a new degree
    tree: RwLock<SharedBTree>,
}

impl AppState {
    fn new() -> Self {
        Self {
            tree: RwLock::new(SharedBTree::default()),
        }
    }

    fn tree(&self) -> SharedBTree {
        self.tree.read().clone()
    }
}

type SharedState = Arc<AppState>;

type ApiError = (StatusCode, Json<OperationResponse>);

/// Request to reset the tree
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetRequest {
    min_degree: Option<usize>,
}

/// Request for key operations
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyRequest {
    key: Key,
}

/// Request for bulk insertion
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkInsertRequest {
    keys: Vec<Key>,
}

/// Response for search operations
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    key: Key,
    found: bool,
}

/// Response for operations that return success/failure
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    success: bool,
    message: String,
}

/// Tree visualization response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TreeResponse {
    tree: Option<TreeNode>,
    stats: TreeStats,
    valid: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = Arc::new(AppState::new());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/tree", get(get_tree))
        .route("/api/tree", post(reset_tree))
        .route("/api/config", get(get_config))
        .route("/api/keys", get(list_keys))
        .route("/api/keys", post(insert_key))
        .route("/api/keys/:key", get(search_key))
        .route("/api/keys/:key", delete(delete_key))
        .route("/api/stats", get(get_stats))
        .route("/api/clear", post(clear_tree))
        .route("/api/bulk", post(bulk_insert))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = std::env::var("BTREE_SERVER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "server.bind_failed");
            std::process::exit(1);
        }
    };
    info!(%addr, "server.listening");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server.stopped");
        std::process::exit(1);
    }
}

fn bad_request(message: String) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(OperationResponse {
            success: false,
            message,
        }),
    )
}

async fn reset_tree(
    State(state): State<SharedState>,
    Json(req): Json<ResetRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    let current = state.tree().config();
    let config = BTreeConfig::new(req.min_degree.unwrap_or(current.min_degree));

    let tree = SharedBTree::new(config).map_err(|e| bad_request(e.to_string()))?;
    *state.tree.write() = tree;
    info!(min_degree = config.min_degree, "server.tree_reset");

    Ok(Json(OperationResponse {
        success: true,
        message: format!("Tree reset with min_degree={}", config.min_degree),
    }))
}

async fn get_config(State(state): State<SharedState>) -> Json<BTreeConfig> {
    Json(state.tree().config())
}

async fn search_key(
    State(state): State<SharedState>,
    Path(key): Path<Key>,
) -> Json<SearchResponse> {
    let found = state.tree().contains(key);
    Json(SearchResponse { key, found })
}

async fn insert_key(
    State(state): State<SharedState>,
    Json(req): Json<KeyRequest>,
) -> Json<OperationResponse> {
    let inserted = state.tree().insert(req.key);
    Json(OperationResponse {
        success: inserted,
        message: if inserted {
            format!("Inserted key {}", req.key)
        } else {
            format!("Key {} already present", req.key)
        },
    })
}

async fn delete_key(
    State(state): State<SharedState>,
    Path(key): Path<Key>,
) -> Json<OperationResponse> {
    let deleted = state.tree().delete(key);
    Json(OperationResponse {
        success: true,
        message: if deleted {
            format!("Deleted key {}", key)
        } else {
            format!("Key {} not found", key)
        },
    })
}

async fn list_keys(State(state): State<SharedState>) -> Json<Vec<Key>> {
    Json(state.tree().traverse())
}

async fn get_tree(State(state): State<SharedState>) -> Json<TreeResponse> {
    let tree = state.tree();
    Json(TreeResponse {
        tree: tree.export_tree(),
        stats: tree.stats(),
        valid: tree.validate().is_ok(),
    })
}

async fn get_stats(State(state): State<SharedState>) -> Json<TreeStats> {
    Json(state.tree().stats())
}

async fn clear_tree(State(state): State<SharedState>) -> Json<OperationResponse> {
    state.tree().clear();
    Json(OperationResponse {
        success: true,
        message: "Tree cleared".to_string(),
    })
}

async fn bulk_insert(
    State(state): State<SharedState>,
    Json(req): Json<BulkInsertRequest>,
) -> Json<OperationResponse> {
    let total = req.keys.len();
    let inserted = state.tree().insert_many(req.keys);
    Json(OperationResponse {
        success: true,
        message: format!("Inserted {} of {} keys", inserted, total),
    })
}
