//! REST API handlers.
//!
//! Each handler runs one provider operation through `ProviderHandle` and
//! returns a JSON envelope.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::warn;

use fleetscale_manager::ManagerError;
use fleetscale_provider::{NodeGroup, PROVIDER_NAME, ProviderError, ProviderResult};

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

fn status_for(err: &ProviderError) -> StatusCode {
    match err {
        ProviderError::NodeGroupNotFound(_) | ProviderError::Manager(ManagerError::UnitNotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        ProviderError::InvalidDelta(_)
        | ProviderError::SizeIncreaseTooLarge { .. }
        | ProviderError::SizeDecreaseTooLarge { .. }
        | ProviderError::WouldDeleteRegisteredNodes { .. } => StatusCode::BAD_REQUEST,
        ProviderError::Manager(ManagerError::Fleet(_)) | ProviderError::Init { .. } => {
            StatusCode::BAD_GATEWAY
        }
        ProviderError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        ProviderError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond<T: Serialize>(result: ProviderResult<T>) -> Response {
    match result {
        Ok(data) => ApiResponse::ok(data).into_response(),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                warn!(error = %e, status = status.as_u16(), "provider operation failed");
            }
            error_response(&e.to_string(), status).into_response()
        }
    }
}

// ── Health ─────────────────────────────────────────────────────

/// GET /healthz
pub async fn healthz() -> impl IntoResponse {
    ApiResponse::ok(serde_json::json!({
        "status": "ok",
        "provider": PROVIDER_NAME,
    }))
}

// ── Node groups ────────────────────────────────────────────────

/// GET /api/v1/node-groups
pub async fn list_node_groups(State(state): State<ApiState>) -> Response {
    let result = state
        .provider
        .call(|p| Ok(p.node_groups().iter().map(NodeGroup::summary).collect::<Vec<_>>()))
        .await;
    respond(result)
}

/// GET /api/v1/node-groups/{id}
pub async fn get_node_group(State(state): State<ApiState>, Path(id): Path<String>) -> Response {
    let result = state
        .provider
        .call(move |p| Ok(p.node_group(&id)?.summary()))
        .await;
    respond(result)
}

/// GET /api/v1/node-groups/{id}/nodes
pub async fn list_nodes(State(state): State<ApiState>, Path(id): Path<String>) -> Response {
    let result = state
        .provider
        .call(move |p| Ok(p.node_group(&id)?.nodes()))
        .await;
    respond(result)
}

// ── Scaling ────────────────────────────────────────────────────

/// Size change request body.
#[derive(Debug, Deserialize)]
pub struct DeltaRequest {
    pub delta: usize,
}

/// Node removal request body.
#[derive(Debug, Deserialize)]
pub struct DeleteNodesRequest {
    pub nodes: Vec<String>,
}

/// POST /api/v1/node-groups/{id}/increase-size
pub async fn increase_size(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(req): Json<DeltaRequest>,
) -> Response {
    let result = state
        .provider
        .call(move |p| {
            let group = p.node_group_mut(&id)?;
            group.increase_size(req.delta)?;
            Ok(group.summary())
        })
        .await;
    respond(result)
}

/// POST /api/v1/node-groups/{id}/delete-nodes
pub async fn delete_nodes(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(req): Json<DeleteNodesRequest>,
) -> Response {
    let result = state
        .provider
        .call(move |p| {
            let group = p.node_group_mut(&id)?;
            group.delete_nodes(&req.nodes)?;
            Ok(group.summary())
        })
        .await;
    respond(result)
}

/// POST /api/v1/node-groups/{id}/decrease-target-size
pub async fn decrease_target_size(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(req): Json<DeltaRequest>,
) -> Response {
    let result = state
        .provider
        .call(move |p| {
            let group = p.node_group_mut(&id)?;
            group.decrease_target_size(req.delta)?;
            Ok(group.summary())
        })
        .await;
    respond(result)
}

// ── Nodes ──────────────────────────────────────────────────────

/// GET /api/v1/nodes/{node}/node-group
pub async fn node_group_for_node(
    State(state): State<ApiState>,
    Path(node): Path<String>,
) -> Response {
    let result = state
        .provider
        .call(move |p| {
            p.node_group_for_node(&node)
                .map(NodeGroup::summary)
                .ok_or_else(|| ManagerError::UnitNotFound(node).into())
        })
        .await;
    respond(result)
}

/// POST /api/v1/refresh
pub async fn refresh(State(state): State<ApiState>) -> Response {
    let result = state
        .provider
        .call(|p| {
            p.refresh()?;
            Ok(p.node_groups().iter().map(NodeGroup::summary).collect::<Vec<_>>())
        })
        .await;
    respond(result)
}
