//! Task entity model and DTOs for the generation task ledger.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cineforge_core::types::{TaskId, Timestamp};

use super::status::{StatusId, TaskStatus};

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub owner: Option<String>,
    pub prompt: String,
    pub kind: String,
    pub status_id: StatusId,
    pub correlation_mode: String,
    /// Provider-assigned job id, set at most once after submission.
    pub external_id: Option<String>,
    /// Result URL on completed tasks, diagnostic message on failed ones.
    pub result_location: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    /// Decoded lifecycle status.
    ///
    /// The column is constrained to the seeded ids, so an unknown value
    /// can only mean schema drift; it is surfaced as `None` rather than
    /// panicking.
    pub fn status(&self) -> Option<TaskStatus> {
        TaskStatus::from_id(self.status_id)
    }
}

/// DTO for submitting a new generation task via
/// `POST /api/v1/tasks/{video,image}`.
#[derive(Debug, Deserialize)]
pub struct CreateTask {
    pub prompt: String,
    pub owner: Option<String>,
}
