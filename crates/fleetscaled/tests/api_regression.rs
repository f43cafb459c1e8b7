//! API regression tests.
//!
//! Drives the full router the daemon serves against a scripted fleet:
//! listing groups, scaling up and down, node lookups, and refresh.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use fleetscale_api::build_router;
use fleetscale_client::{
    DestroyUnitResult, FakeFleet, FleetCall, FleetClient, FleetSnapshot, MachineStatus, UnitStatus,
};
use fleetscale_core::{FleetConfig, IdentitySource};
use fleetscale_provider::{FleetProvider, ProviderHandle};
use tower::ServiceExt;

const CONFIG: &str = r#"
[manager]
refresh_interval = "1s"
operation_timeout = "5s"

[[node_groups]]
spec = "1:4:k8s:worker"
"#;

fn snapshot(units: &[(&str, &str)]) -> FleetSnapshot {
    let mut snapshot = FleetSnapshot::default();
    let app = snapshot.applications.entry("worker".to_string()).or_default();
    for (unit, agent) in units {
        let machine = unit.trim_start_matches("worker/").to_string();
        app.units
            .insert(unit.to_string(), UnitStatus::new(agent, "active", &machine));
        snapshot.machines.insert(
            machine.clone(),
            MachineStatus {
                hostname: format!("node-{machine}"),
                ..Default::default()
            },
        );
    }
    snapshot
}

fn test_handle(fleet: &Arc<FakeFleet>) -> ProviderHandle {
    let config = FleetConfig::from_toml_str(CONFIG).unwrap();
    let specs = config.node_group_specs(&[]).unwrap();
    fleet.push_status(snapshot(&[("worker/0", "idle"), ("worker/1", "idle")]));

    let client = fleet.clone() as Arc<dyn FleetClient>;
    let provider =
        FleetProvider::build(&specs, Arc::new(IdentitySource::Hostname), move |_| client.clone())
            .unwrap();
    ProviderHandle::new(provider, config.operation_timeout().unwrap())
}

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn healthz_responds() {
    let fleet = Arc::new(FakeFleet::new());
    let router = build_router(test_handle(&fleet));

    let resp = router.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["data"]["provider"], "juju");
}

#[tokio::test]
async fn lists_configured_node_groups() {
    let fleet = Arc::new(FakeFleet::new());
    let router = build_router(test_handle(&fleet));

    let resp = router.oneshot(get("/api/v1/node-groups")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    let groups = body["data"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["id"], "juju-k8s-worker");
    assert_eq!(groups[0]["min_size"], 1);
    assert_eq!(groups[0]["max_size"], 4);
    assert_eq!(groups[0]["target_size"], 2);
}

#[tokio::test]
async fn nodes_carry_identity_and_phase() {
    let fleet = Arc::new(FakeFleet::new());
    let router = build_router(test_handle(&fleet));

    let resp = router
        .oneshot(get("/api/v1/node-groups/juju-k8s-worker/nodes"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    let nodes = body["data"].as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0]["unit"], "worker/0");
    assert_eq!(nodes[0]["node"], "node-0");
    assert_eq!(nodes[0]["phase"], "running");
}

#[tokio::test]
async fn scale_up_then_refresh_promotes_new_unit() {
    let fleet = Arc::new(FakeFleet::new());
    let router = build_router(test_handle(&fleet));

    let existing = [("worker/0", "idle"), ("worker/1", "idle")];
    let added = [("worker/0", "idle"), ("worker/1", "idle"), ("worker/2", "allocating")];
    fleet
        .push_status(snapshot(&existing))
        .push_add_units(&[])
        .push_status(snapshot(&added));

    let resp = router
        .clone()
        .oneshot(json_post(
            "/api/v1/node-groups/juju-k8s-worker/increase-size",
            serde_json::json!({ "delta": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["target_size"], 3);

    let resp = router
        .clone()
        .oneshot(get("/api/v1/node-groups/juju-k8s-worker/nodes"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"][2]["phase"], "creating");
    assert!(body["data"][2]["node"].is_null());

    let ready = [("worker/0", "idle"), ("worker/1", "idle"), ("worker/2", "idle")];
    fleet.push_status(snapshot(&ready));

    let resp = router
        .clone()
        .oneshot(json_post("/api/v1/refresh", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = router
        .oneshot(get("/api/v1/nodes/node-2/node-group"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["id"], "juju-k8s-worker");
    assert!(fleet.is_exhausted());
}

#[tokio::test]
async fn increase_beyond_max_is_rejected() {
    let fleet = Arc::new(FakeFleet::new());
    let router = build_router(test_handle(&fleet));

    let resp = router
        .oneshot(json_post(
            "/api/v1/node-groups/juju-k8s-worker/increase-size",
            serde_json::json!({ "delta": 3 }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("max: 4"));
    assert_eq!(fleet.calls().len(), 1);
}

#[tokio::test]
async fn delete_nodes_destroys_backing_unit() {
    let fleet = Arc::new(FakeFleet::new());
    let router = build_router(test_handle(&fleet));
    fleet.push_destroy_units(vec![DestroyUnitResult {
        unit: "worker/1".to_string(),
        error: None,
    }]);

    let resp = router
        .clone()
        .oneshot(json_post(
            "/api/v1/node-groups/juju-k8s-worker/delete-nodes",
            serde_json::json!({ "nodes": ["node-1"] }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let calls = fleet.calls();
    match calls.last().unwrap() {
        FleetCall::DestroyUnits(params) => assert_eq!(params.units, vec!["worker/1".to_string()]),
        other => panic!("unexpected call {other:?}"),
    }

    // Below min.
    let resp = router
        .oneshot(json_post(
            "/api/v1/node-groups/juju-k8s-worker/delete-nodes",
            serde_json::json!({ "nodes": ["node-0"] }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_group_and_node_are_not_found() {
    let fleet = Arc::new(FakeFleet::new());
    let router = build_router(test_handle(&fleet));

    let resp = router
        .clone()
        .oneshot(get("/api/v1/node-groups/juju-k8s-db"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = router
        .oneshot(get("/api/v1/nodes/node-7/node-group"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn fleet_outage_during_refresh_is_bad_gateway() {
    let fleet = Arc::new(FakeFleet::new());
    let router = build_router(test_handle(&fleet));
    fleet.push_status_error("connection refused");

    let resp = router
        .clone()
        .oneshot(json_post("/api/v1/refresh", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    // Nothing was dropped.
    let resp = router
        .oneshot(get("/api/v1/node-groups/juju-k8s-worker"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"]["size"], 2);
}
