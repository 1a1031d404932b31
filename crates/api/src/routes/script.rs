//! Route definition for screenplay analysis.

use axum::routing::post;
use axum::Router;

use crate::handlers::script;
use crate::state::AppState;

/// Mounts `POST /script-analysis`.
pub fn router() -> Router<AppState> {
    Router::new().route("/script-analysis", post(script::analyze_script))
}
