//! Route definitions.

pub mod callback;
pub mod health;
pub mod script;
pub mod tasks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /tasks/video          submit video generation (POST)
/// /tasks/image          submit image generation (POST)
/// /tasks/{id}           query task status (GET, ?owner=)
/// /script-analysis      synchronous screenplay analysis (POST)
/// /callback             provider webhook (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Generation task submission and status queries.
        .nest("/tasks", tasks::router())
        // Synchronous screenplay analysis.
        .merge(script::router())
        // Inbound provider webhook.
        .merge(callback::router())
}
