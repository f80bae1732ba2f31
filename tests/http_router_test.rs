use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use publisher_graph::adapters::http::{router, GRAPHQL_PATH, HEALTH_PATH};
use publisher_graph::domain::ports::SharedStore;
use publisher_graph::{build_schema, MemoryStore, SyndicationClient};
use std::sync::Arc;
use tower::ServiceExt;

fn app(graphiql: bool) -> axum::Router {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let schema = build_schema(store, SyndicationClient::new(vec![])).unwrap();
    router(schema, graphiql)
}

#[tokio::test]
async fn test_health() {
    let response = app(true)
        .oneshot(Request::get(HEALTH_PATH).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn test_graphql_post() {
    let request = Request::builder()
        .method(Method::POST)
        .uri(GRAPHQL_PATH)
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({"query": "{ wordCampRocks }"}).to_string(),
        ))
        .unwrap();

    let response = app(false).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["wordCampRocks"], "Yes, it does");
}

#[tokio::test]
async fn test_graphiql_can_be_disabled() {
    let enabled = app(true)
        .oneshot(Request::get(GRAPHQL_PATH).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(enabled.status(), StatusCode::OK);

    let disabled = app(false)
        .oneshot(Request::get(GRAPHQL_PATH).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(disabled.status(), StatusCode::METHOD_NOT_ALLOWED);
}
