use std::sync::Arc;

use crate::config::ServerConfig;
use crate::submit::SubmitQueue;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: cineforge_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Kie.ai generation client.
    pub kie: Arc<cineforge_kie::KieClient>,
    /// Gemini text-model client.
    pub gemini: Arc<cineforge_gemini::GeminiClient>,
    /// Handle to the background submission queue.
    pub submit_queue: SubmitQueue,
}
