//! The HTTP surface driving a full session.

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use stepgraph_integration_tests::REFERENCE_GRAPH;
use stepgraph_model::parse;
use stepgraph_recorder::Algorithm;
use stepgraph_vis::{Session, VisConfig, VisServer};
use tower::ServiceExt;

fn server(speed_ms: u64) -> VisServer {
    let graph = parse(REFERENCE_GRAPH).unwrap();
    let session = Session::new(graph, Algorithm::DepthFirst, None).unwrap();
    let config = VisConfig {
        speed_ms,
        ..VisConfig::default()
    };
    VisServer::new(session, &config)
}

async fn call(router: &Router, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    call(router, Method::POST, uri, Body::from(body.to_string())).await
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    call(router, Method::GET, uri, Body::empty()).await
}

#[tokio::test(start_paused = true)]
async fn play_through_the_api() {
    let server = server(100);
    let router = server.router();

    let (status, body) = post(&router, "/api/playback/play", Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isPlaying"], true);
    let total = body["totalSnapshots"].as_u64().unwrap();

    tokio::time::sleep(Duration::from_millis(100 * total + 50)).await;

    let (_, view) = get(&router, "/api/snapshot").await;
    assert_eq!(view["status"]["isPlaying"], false);
    assert_eq!(view["status"]["currentIndex"], total - 1);
    assert_eq!(view["snapshot"]["kind"], "complete");
    assert_eq!(view["snapshot"]["finishedOrder"], json!(["D", "B", "C", "A"]));
}

#[tokio::test]
async fn edit_then_rerun_records_new_graph() {
    let server = server(1000);
    let router = server.router();

    let edit = json!({ "op": "add_edge", "from": "C", "to": "D" });
    let (status, _) = post(&router, "/api/graph/edit", edit).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(&router, "/api/run", json!({ "algorithm": "bfs" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentIndex"], 0);

    let (_, summary) = get(&router, "/api/status").await;
    assert_eq!(summary["algorithm"], "bfs");
    assert_eq!(summary["start"], "A");
    assert_eq!(summary["edgeCount"], 4);

    let request = Request::get("/api/graph").body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let text = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let graph = parse(std::str::from_utf8(&text).unwrap()).unwrap();
    assert_eq!(graph.edges("C").unwrap().len(), 1);
}

#[tokio::test]
async fn removing_every_node_leaves_nothing_to_run() {
    let server = server(1000);
    let router = server.router();

    for id in ["A", "B", "C", "D"] {
        let (status, _) = post(&router, "/api/graph/edit", json!({ "op": "remove_node", "id": id })).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, summary) = get(&router, "/api/status").await;
    assert_eq!(summary["nodeCount"], 0);
    assert_eq!(summary["snapshotCount"], 2);

    let (status, body) = post(&router, "/api/run", json!({ "algorithm": "dfs" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("no nodes"));
}

#[tokio::test]
async fn layout_is_stable_between_requests() {
    let server = server(1000);
    let router = server.router();

    let (_, first) = get(&router, "/api/layout").await;
    let (_, second) = get(&router, "/api/layout").await;
    assert_eq!(first, second);
    assert_eq!(first["A"], json!({ "x": 400.0, "y": 125.0 }));
}
