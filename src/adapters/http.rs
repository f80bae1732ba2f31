use crate::utils::error::{PublisherError, Result};
use async_graphql::dynamic::Schema;
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::GraphQL;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post_service};
use axum::Router;
use std::net::SocketAddr;

pub const GRAPHQL_PATH: &str = "/graphql";
pub const HEALTH_PATH: &str = "/health";

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}

async fn health() -> &'static str {
    "ok"
}

/// `POST /graphql` executes queries; `GET /graphql` serves GraphiQL when enabled.
pub fn router(schema: Schema, graphiql_enabled: bool) -> Router {
    let graphql = if graphiql_enabled {
        get(graphiql).post_service(GraphQL::new(schema))
    } else {
        post_service(GraphQL::new(schema))
    };

    Router::new()
        .route(GRAPHQL_PATH, graphql)
        .route(HEALTH_PATH, get(health))
}

pub async fn serve(addr: SocketAddr, router: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| PublisherError::ServerError {
            message: format!("cannot bind {}: {}", addr, e),
        })?;

    tracing::info!("GraphQL endpoint listening on http://{}{}", addr, GRAPHQL_PATH);
    axum::serve(listener, router).await?;
    Ok(())
}
