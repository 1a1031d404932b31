//! Route definition for the inbound provider webhook.

use axum::routing::post;
use axum::Router;

use crate::handlers::callback;
use crate::state::AppState;

/// Mounts `POST /callback`.
pub fn router() -> Router<AppState> {
    Router::new().route("/callback", post(callback::receive_callback))
}
