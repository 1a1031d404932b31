//! Callback reconciliation: match an inbound webhook delivery to its
//! originating task and apply the terminal transition exactly once.
//!
//! Deliveries are at-least-once, unordered, and occasionally malformed.
//! Every outcome short of a database fault resolves to an
//! acknowledgement: a payload that cannot be parsed or matched is
//! logged and discarded, never bounced back to the provider, because a
//! non-2xx answer would trigger its redelivery storm.

use sqlx::PgPool;

use cineforge_core::types::TaskId;
use cineforge_db::models::status::TaskStatus;
use cineforge_db::models::task::Task;
use cineforge_db::repositories::TaskRepo;
use cineforge_kie::CallbackEnvelope;

/// What happened to one callback delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Result recorded; the task is completed.
    Completed(TaskId),
    /// Provider reported a failure; the task is failed.
    Failed(TaskId),
    /// Body was not parseable JSON. Discarded.
    MalformedPayload,
    /// No ledger entry matches the callback. Discarded.
    Unmatched,
    /// Success payload without a usable result list. Discarded, the task
    /// keeps its current status.
    MissingResult(TaskId),
}

impl Outcome {
    /// Short description returned to the provider in the acknowledgement.
    pub fn describe(&self) -> &'static str {
        match self {
            Outcome::Completed(_) => "result recorded",
            Outcome::Failed(_) => "failure recorded",
            Outcome::MalformedPayload => "ignored: malformed payload",
            Outcome::Unmatched => "ignored: unmatched callback",
            Outcome::MissingResult(_) => "ignored: missing result",
        }
    }
}

/// Reconcile one callback delivery against the ledger.
///
/// `embedded_id` is the raw `task` query parameter, present when the
/// callback URL was built with the embedded-id strategy. A database
/// error is the only failure this function propagates; the resulting
/// 500 is deliberate, since no mutation happened and the provider's
/// retry will land once the database is back.
pub async fn reconcile(
    pool: &PgPool,
    embedded_id: Option<&str>,
    body: &[u8],
) -> Result<Outcome, sqlx::Error> {
    let envelope = match CallbackEnvelope::parse(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(error = %e, "Discarding malformed callback payload");
            return Ok(Outcome::MalformedPayload);
        }
    };

    let task = resolve_task(pool, embedded_id, &envelope).await?;

    if !envelope.is_success() {
        let Some(task) = task else {
            tracing::warn!(
                code = envelope.code,
                msg = envelope.message(),
                "Provider failure callback did not match any task",
            );
            return Ok(Outcome::Unmatched);
        };
        TaskRepo::transition(pool, task.id, TaskStatus::Failed, Some(envelope.message())).await?;
        tracing::info!(
            task_id = %task.id,
            code = envelope.code,
            "Callback reported provider failure",
        );
        return Ok(Outcome::Failed(task.id));
    }

    let Some(task) = task else {
        tracing::warn!(
            embedded_id = ?embedded_id,
            provider_task_id = ?envelope.provider_task_id(),
            "Discarding unmatched callback",
        );
        return Ok(Outcome::Unmatched);
    };

    let Some(result_url) = envelope.first_result_url() else {
        tracing::warn!(
            task_id = %task.id,
            "Success callback carries no result list; task left untouched",
        );
        return Ok(Outcome::MissingResult(task.id));
    };

    // Idempotent by ledger contract: a redelivered callback repeats the
    // same terminal transition and lands as a no-op.
    TaskRepo::transition(pool, task.id, TaskStatus::Completed, Some(result_url)).await?;
    tracing::info!(task_id = %task.id, result_url, "Callback result recorded");
    Ok(Outcome::Completed(task.id))
}

/// Resolve the callback to a ledger entry.
///
/// The embedded-id strategy wins when the request carries a parseable
/// `task` parameter; otherwise the provider-reported id inside the body
/// is looked up through the external-id index (linked strategy).
async fn resolve_task(
    pool: &PgPool,
    embedded_id: Option<&str>,
    envelope: &CallbackEnvelope,
) -> Result<Option<Task>, sqlx::Error> {
    if let Some(raw) = embedded_id {
        match raw.parse::<TaskId>() {
            Ok(id) => return TaskRepo::find_by_id(pool, id).await,
            Err(_) => {
                tracing::warn!(raw, "Ignoring unparseable task parameter on callback");
            }
        }
    }

    if let Some(external_id) = envelope.provider_task_id() {
        return TaskRepo::find_by_external_id(pool, external_id).await;
    }

    Ok(None)
}
