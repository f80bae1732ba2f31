use httpmock::prelude::*;
use publisher_graph::core::syndication::SYNDICATED_BOOKS_QUERY;
use publisher_graph::domain::ports::SharedStore;
use publisher_graph::{build_schema, MemoryStore, SyndicationClient};
use serde_json::json;
use std::sync::Arc;

const QUERY: &str = "{ syndicatedBooks { id title price sourceName } }";
const UNREACHABLE: &str = "http://127.0.0.1:1/graphql";

fn schema_with_endpoints(endpoints: Vec<String>) -> async_graphql::dynamic::Schema {
    let store: SharedStore = Arc::new(MemoryStore::new());
    build_schema(store, SyndicationClient::new(endpoints)).unwrap()
}

async fn syndicated_books(schema: &async_graphql::dynamic::Schema) -> serde_json::Value {
    let response = schema.execute(QUERY).await;
    assert!(response.errors.is_empty(), "unexpected errors: {:?}", response.errors);
    response.data.into_json().unwrap()["syndicatedBooks"].clone()
}

#[tokio::test]
async fn test_one_endpoint_down_keeps_the_other() {
    let server = MockServer::start();
    let publisher_a = server.mock(|when, then| {
        when.method(POST)
            .path("/a/graphql")
            .json_body(json!({ "query": SYNDICATED_BOOKS_QUERY }));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "data": {"books": [{"id": "1", "title": "T1", "price": "9.99", "sourceName": "A"}]}
            }));
    });

    let schema = schema_with_endpoints(vec![server.url("/a/graphql"), UNREACHABLE.to_string()]);
    let books = syndicated_books(&schema).await;

    publisher_a.assert();
    assert_eq!(
        books,
        json!([{"id": "1", "title": "T1", "price": "9.99", "sourceName": "A"}])
    );
}

#[tokio::test]
async fn test_all_endpoints_malformed_yields_empty_list() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/a/graphql");
        then.status(200)
            .header("Content-Type", "application/json")
            .body("<html>not json</html>");
    });
    server.mock(|when, then| {
        when.method(POST).path("/b/graphql");
        then.status(200)
            .header("Content-Type", "application/json")
            .body("{\"data\":");
    });

    let schema = schema_with_endpoints(vec![server.url("/a/graphql"), server.url("/b/graphql")]);
    assert_eq!(syndicated_books(&schema).await, json!([]));
}

#[tokio::test]
async fn test_every_kind_of_failure_yields_empty_list() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/server-error");
        then.status(500)
            .header("Content-Type", "application/json")
            .json_body(json!({"data": {"books": [{"id": "x"}]}}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/graphql-error");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"errors": [{"message": "Cannot query field books"}]}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/not-a-list");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"data": {"books": "none"}}));
    });

    let schema = schema_with_endpoints(vec![
        server.url("/server-error"),
        server.url("/graphql-error"),
        server.url("/not-a-list"),
        UNREACHABLE.to_string(),
    ]);
    assert_eq!(syndicated_books(&schema).await, json!([]));
}

#[tokio::test]
async fn test_results_follow_endpoint_order_then_response_order() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/b/graphql");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"data": {"books": [
                {"id": "b1", "title": "B One", "price": "1.00", "sourceName": "B"},
                {"id": "b2", "title": "B Two", "price": "2.00", "sourceName": "B"}
            ]}}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/a/graphql");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"data": {"books": [
                {"id": "a1", "title": "A One", "price": "3.00", "sourceName": "A"},
                "not a book",
                {"id": 7, "title": "A Two", "price": 4.5, "sourceName": "A"}
            ]}}));
    });

    // B is listed first on purpose.
    let schema = schema_with_endpoints(vec![server.url("/b/graphql"), server.url("/a/graphql")]);
    let first = syndicated_books(&schema).await;

    let ids: Vec<_> = first
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["b1", "b2", "a1", "7"]);
    assert_eq!(first[3]["price"], json!("4.5"));

    let second = syndicated_books(&schema).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_no_endpoints_configured() {
    let schema = schema_with_endpoints(vec![]);
    assert_eq!(syndicated_books(&schema).await, json!([]));
}
