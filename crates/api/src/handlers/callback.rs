//! Handler for the provider webhook endpoint.
//!
//! The body is taken as raw bytes rather than through the `Json`
//! extractor: a malformed payload must still be acknowledged with 200,
//! not bounced with a framework-generated 400 that the provider would
//! retry forever.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::reconcile;
use crate::state::AppState;

/// Query parameters attached to the callback URL at submission time.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Internal task id under the embedded-id correlation strategy.
    /// Kept as a raw string: an unparseable value is treated as absent,
    /// not rejected.
    pub task: Option<String>,
}

/// Acknowledgement returned to the provider for every delivery.
#[derive(Debug, Serialize)]
pub struct CallbackAck {
    pub status: String,
}

/// POST /api/v1/callback
///
/// Reconcile one webhook delivery. Always answers 200 with an outcome
/// description; the only exception is a database fault, which becomes a
/// 500 so the provider's own retry redelivers once storage is back.
pub async fn receive_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    body: Bytes,
) -> AppResult<Json<CallbackAck>> {
    let outcome = reconcile::reconcile(&state.pool, query.task.as_deref(), &body).await?;

    Ok(Json(CallbackAck {
        status: outcome.describe().to_string(),
    }))
}
