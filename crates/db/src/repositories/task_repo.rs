//! Repository for the `tasks` table — the generation task ledger.
//!
//! All mutations are atomic per task. Status transitions go through
//! [`TaskRepo::transition`], which enforces the monotonic lifecycle and
//! absorbs webhook redeliveries as no-ops instead of errors.

use sqlx::PgPool;

use cineforge_core::types::TaskId;

use crate::models::status::TaskStatus;
use crate::models::task::Task;

/// Column list for `tasks` queries.
const COLUMNS: &str = "\
    id, owner, prompt, kind, status_id, correlation_mode, \
    external_id, result_location, created_at, updated_at";

/// Provides ledger operations for generation tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Create a new pending task with a freshly generated id.
    pub async fn create(
        pool: &PgPool,
        prompt: &str,
        kind: &str,
        owner: Option<&str>,
        correlation_mode: &str,
    ) -> Result<Task, sqlx::Error> {
        let id = uuid::Uuid::new_v4();
        let query = format!(
            "INSERT INTO tasks (id, owner, prompt, kind, status_id, correlation_mode) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(owner)
            .bind(prompt)
            .bind(kind)
            .bind(TaskStatus::Pending.id())
            .bind(correlation_mode)
            .fetch_one(pool)
            .await
    }

    /// Find a task by its internal id.
    pub async fn find_by_id(pool: &PgPool, id: TaskId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a task by id, scoped to the supplied owner.
    ///
    /// A task created with an owner is only visible to that owner; the
    /// wrong (or a missing) owner yields `None`, indistinguishable from
    /// a task that does not exist. Unowned tasks are visible to anyone.
    pub async fn find_for_owner(
        pool: &PgPool,
        id: TaskId,
        owner: Option<&str>,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 AND (owner IS NULL OR owner = $2)");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(owner)
            .fetch_optional(pool)
            .await
    }

    /// Find the task linked to a provider-assigned job id.
    ///
    /// Backed by the `uq_tasks_external_id` partial unique index, so the
    /// match is unambiguous.
    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE external_id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// Record the provider-assigned job id on a task.
    ///
    /// The id is set at most once: re-linking the same value is a no-op,
    /// and an attempt to overwrite a different value leaves the row
    /// untouched and logs the anomaly. Returns `None` only when the task
    /// does not exist — the caller treats that as a lost-linkage
    /// condition to surface, not an error to crash on.
    pub async fn link_external_id(
        pool: &PgPool,
        id: TaskId,
        external_id: &str,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET external_id = $2, updated_at = NOW() \
             WHERE id = $1 AND (external_id IS NULL OR external_id = $2) \
             RETURNING {COLUMNS}"
        );
        let linked = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(external_id)
            .fetch_optional(pool)
            .await?;

        if let Some(task) = linked {
            return Ok(Some(task));
        }

        // Either the task is gone or it is already linked to a different
        // provider id. Keep the first linkage in the latter case.
        let existing = Self::find_by_id(pool, id).await?;
        if let Some(ref task) = existing {
            tracing::warn!(
                task_id = %id,
                external_id,
                existing = ?task.external_id,
                "Refusing to overwrite an already-linked external id",
            );
        }
        Ok(existing)
    }

    /// Apply a status transition, refreshing `updated_at` on writes.
    ///
    /// Lifecycle rules:
    /// - forward transitions (`pending -> processing -> terminal`) apply;
    /// - repeating the current status is a no-op returning the unchanged
    ///   row, which makes webhook redelivery idempotent;
    /// - a backwards transition is ignored and logged;
    /// - a conflicting terminal transition (completed vs failed) applies
    ///   last-writer-wins and logs the anomaly.
    ///
    /// The read and the write share a single-row transaction
    /// (`SELECT .. FOR UPDATE`), so concurrent callbacks for the same
    /// task serialise instead of interleaving.
    ///
    /// `result_location` is only written when provided; `None` preserves
    /// the stored value.
    pub async fn transition(
        pool: &PgPool,
        id: TaskId,
        new_status: TaskStatus,
        result_location: Option<&str>,
    ) -> Result<Option<Task>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 FOR UPDATE");
        let Some(task) = sqlx::query_as::<_, Task>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let Some(current) = task.status() else {
            tracing::error!(task_id = %id, status_id = task.status_id, "Task row has unknown status id");
            return Ok(Some(task));
        };

        if new_status == current {
            // Redelivered callback or repeated mark: nothing to do.
            return Ok(Some(task));
        }

        if current.is_terminal() {
            if new_status.is_terminal() {
                tracing::warn!(
                    task_id = %id,
                    from = current.name(),
                    to = new_status.name(),
                    "Conflicting terminal transition; last writer wins",
                );
            } else {
                tracing::warn!(
                    task_id = %id,
                    from = current.name(),
                    to = new_status.name(),
                    "Ignoring backwards transition on terminal task",
                );
                return Ok(Some(task));
            }
        } else if new_status.id() < current.id() {
            tracing::warn!(
                task_id = %id,
                from = current.name(),
                to = new_status.name(),
                "Ignoring backwards status transition",
            );
            return Ok(Some(task));
        }

        let update = format!(
            "UPDATE tasks \
             SET status_id = $2, \
                 result_location = COALESCE($3, result_location), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Task>(&update)
            .bind(id)
            .bind(new_status.id())
            .bind(result_location)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(updated))
    }
}
