//! Backend de cadastro de contrapartes: fachada GraphQL sobre PostgreSQL/PostGIS.

pub mod common;
pub mod config;
pub mod db;
pub mod handlers;
pub mod models;
pub mod services;

#[cfg(test)]
mod test_support;

use async_graphql_axum::GraphQL;
use axum::{routing::get, Router};

use crate::config::AppState;

pub fn app(app_state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::health))
        .route(
            "/graphql",
            get(handlers::graphql::graphiql).post_service(GraphQL::new(app_state.schema.clone())),
        )
        .with_state(app_state)
}
