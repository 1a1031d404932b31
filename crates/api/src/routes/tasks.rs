//! Route definitions for the `/tasks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// POST   /video     -> create_video_task
/// POST   /image     -> create_image_task
/// GET    /{id}      -> get_task
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/video", post(tasks::create_video_task))
        .route("/image", post(tasks::create_image_task))
        .route("/{id}", get(tasks::get_task))
}
