//! fleetscale-api: REST API for the external autoscaler.
//!
//! Every handler goes through the shared [`ProviderHandle`], so API calls and
//! the refresh loop never touch a node group at the same time.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/healthz` | Liveness |
//! | GET | `/api/v1/node-groups` | List node groups |
//! | GET | `/api/v1/node-groups/{id}` | Get one node group |
//! | GET | `/api/v1/node-groups/{id}/nodes` | List the group's instances |
//! | POST | `/api/v1/node-groups/{id}/increase-size` | Add units |
//! | POST | `/api/v1/node-groups/{id}/delete-nodes` | Remove specific nodes |
//! | POST | `/api/v1/node-groups/{id}/decrease-target-size` | Lower the target |
//! | GET | `/api/v1/nodes/{node}/node-group` | Group owning a node |
//! | POST | `/api/v1/refresh` | Reconcile every group now |

pub mod handlers;

use axum::Router;
use axum::routing::{get, post};
use fleetscale_provider::ProviderHandle;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub provider: ProviderHandle,
}

/// Build the complete API router.
pub fn build_router(provider: ProviderHandle) -> Router {
    let state = ApiState { provider };

    let api_routes = Router::new()
        .route("/node-groups", get(handlers::list_node_groups))
        .route("/node-groups/{id}", get(handlers::get_node_group))
        .route("/node-groups/{id}/nodes", get(handlers::list_nodes))
        .route("/node-groups/{id}/increase-size", post(handlers::increase_size))
        .route("/node-groups/{id}/delete-nodes", post(handlers::delete_nodes))
        .route(
            "/node-groups/{id}/decrease-target-size",
            post(handlers::decrease_target_size),
        )
        .route("/nodes/{node}/node-group", get(handlers::node_group_for_node))
        .route("/refresh", post(handlers::refresh))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/healthz", get(handlers::healthz))
}
