//! Handlers for the `/tasks` resource: generation task submission and
//! status queries.
//!
//! Submission returns as soon as the ledger row exists and the job is
//! queued for the background dispatcher; the provider call itself never
//! blocks the request path. Status reporting is eventually consistent:
//! a client may still observe `pending` after the background submission
//! has started.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use cineforge_core::error::CoreError;
use cineforge_core::task::{self, TaskKind};
use cineforge_core::types::{TaskId, Timestamp};
use cineforge_db::models::task::{CreateTask, Task};
use cineforge_db::repositories::TaskRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::submit::SubmitJob;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Response for a freshly accepted generation task.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAccepted {
    pub task_id: TaskId,
    pub message: String,
}

/// Full client-facing task representation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub task_id: TaskId,
    pub owner: Option<String>,
    pub prompt: String,
    pub kind: String,
    pub status: &'static str,
    pub external_id: Option<String>,
    pub result_location: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Task> for TaskView {
    fn from(task: Task) -> Self {
        let status = task.status().map(|s| s.name()).unwrap_or("unknown");
        Self {
            task_id: task.id,
            owner: task.owner,
            prompt: task.prompt,
            kind: task.kind,
            status,
            external_id: task.external_id,
            result_location: task.result_location,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Query parameters for `GET /api/v1/tasks/{id}`.
#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    /// Owner identifier for scoped tasks.
    pub owner: Option<String>,
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks/video
///
/// Accept a video generation task. Returns 202 with the task id; the
/// provider submission happens in the background.
pub async fn create_video_task(
    State(state): State<AppState>,
    Json(input): Json<CreateTask>,
) -> AppResult<impl IntoResponse> {
    create_task(state, input, TaskKind::Video).await
}

/// POST /api/v1/tasks/image
///
/// Accept an image generation task.
pub async fn create_image_task(
    State(state): State<AppState>,
    Json(input): Json<CreateTask>,
) -> AppResult<impl IntoResponse> {
    create_task(state, input, TaskKind::Image).await
}

/// Shared submission path: validate, persist, enqueue.
///
/// Errors on this path (validation, ledger write, full queue) surface
/// synchronously; everything after the enqueue is recorded in ledger
/// state only.
async fn create_task(
    state: AppState,
    input: CreateTask,
    kind: TaskKind,
) -> AppResult<(StatusCode, Json<DataResponse<TaskAccepted>>)> {
    task::validate_prompt(&input.prompt).map_err(AppError::Core)?;
    task::validate_owner(input.owner.as_deref()).map_err(AppError::Core)?;

    let created = TaskRepo::create(
        &state.pool,
        input.prompt.trim(),
        kind.as_str(),
        input.owner.as_deref(),
        state.config.correlation_mode.as_str(),
    )
    .await?;

    state
        .submit_queue
        .enqueue(SubmitJob {
            task_id: created.id,
            kind,
        })
        .map_err(|e| AppError::InternalError(format!("Cannot queue submission: {e}")))?;

    tracing::info!(
        task_id = %created.id,
        kind = %kind,
        mode = %created.correlation_mode,
        "Generation task accepted",
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: TaskAccepted {
                task_id: created.id,
                message: format!("{kind} generation started in the background"),
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Status query
// ---------------------------------------------------------------------------

/// GET /api/v1/tasks/{id}
///
/// Look up a task's current state. A task created with an owner is only
/// visible when the matching `owner` query parameter is supplied; any
/// mismatch answers 404 so non-owners cannot probe for existence.
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
    Query(params): Query<TaskQuery>,
) -> AppResult<impl IntoResponse> {
    let task = TaskRepo::find_for_owner(&state.pool, task_id, params.owner.as_deref())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id.to_string(),
        }))?;

    Ok(Json(DataResponse {
        data: TaskView::from(task),
    }))
}
