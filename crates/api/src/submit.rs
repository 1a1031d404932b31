//! Background submission dispatcher.
//!
//! Generation requests return to the client as soon as the ledger row
//! exists; the provider call happens here. A bounded mpsc queue feeds a
//! fixed pool of worker tasks, each running until the cancellation token
//! fires, so load cannot fan out into unbounded per-request spawns.
//!
//! A submission gets exactly one attempt: any rejection or transport
//! error marks the task failed, and the failure surfaces to clients only
//! through a later status query.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use cineforge_core::task::{CorrelationMode, TaskKind};
use cineforge_core::types::TaskId;
use cineforge_db::models::status::TaskStatus;
use cineforge_db::repositories::TaskRepo;
use cineforge_kie::{callback_url, KieClient};

/// A unit of work handed from the HTTP layer to the dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct SubmitJob {
    pub task_id: TaskId,
    pub kind: TaskKind,
}

/// Why a job could not be enqueued.
#[derive(Debug, thiserror::Error)]
pub enum EnqueueError {
    /// The queue is at capacity; the caller surfaces this synchronously.
    #[error("Submission queue is full")]
    QueueFull,

    /// The workers have shut down.
    #[error("Submission workers are not running")]
    Closed,
}

/// Cloneable handle for enqueueing submission jobs.
#[derive(Clone)]
pub struct SubmitQueue {
    tx: mpsc::Sender<SubmitJob>,
}

impl SubmitQueue {
    /// Enqueue a job without blocking the request path.
    pub fn enqueue(&self, job: SubmitJob) -> Result<(), EnqueueError> {
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => EnqueueError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => EnqueueError::Closed,
        })
    }
}

/// Background submission dispatcher: a fixed pool of workers draining
/// the shared queue.
pub struct SubmitDispatcher {
    pool: PgPool,
    kie: Arc<KieClient>,
    public_base_url: String,
}

impl SubmitDispatcher {
    /// Spawn the worker pool and return the queue handle plus the worker
    /// join handles (awaited during graceful shutdown).
    pub fn start(
        pool: PgPool,
        kie: Arc<KieClient>,
        public_base_url: String,
        workers: usize,
        queue_depth: usize,
        cancel: CancellationToken,
    ) -> (SubmitQueue, Vec<JoinHandle<()>>) {
        let (tx, rx) = mpsc::channel(queue_depth.max(1));
        let rx = Arc::new(Mutex::new(rx));

        let dispatcher = Arc::new(Self {
            pool,
            kie,
            public_base_url,
        });

        let handles = (0..workers.max(1))
            .map(|worker| {
                tokio::spawn(Arc::clone(&dispatcher).worker_loop(
                    worker,
                    Arc::clone(&rx),
                    cancel.clone(),
                ))
            })
            .collect();

        tracing::info!(workers, queue_depth, "Submission dispatcher started");

        (SubmitQueue { tx }, handles)
    }

    /// Drain the queue until cancellation or channel closure.
    async fn worker_loop(
        self: Arc<Self>,
        worker: usize,
        rx: Arc<Mutex<mpsc::Receiver<SubmitJob>>>,
        cancel: CancellationToken,
    ) {
        loop {
            // Hold the receiver lock only while waiting for a job so the
            // other workers can pick up work during processing.
            let job = {
                let mut rx = rx.lock().await;
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    job = rx.recv() => job,
                }
            };

            let Some(job) = job else {
                break;
            };

            if let Err(e) = self.process(job).await {
                tracing::error!(
                    task_id = %job.task_id,
                    error = %e,
                    "Submission processing failed",
                );
            }
        }

        tracing::info!(worker, "Submission worker stopped");
    }

    /// Submit one task to the provider and record the outcome.
    async fn process(&self, job: SubmitJob) -> Result<(), sqlx::Error> {
        let SubmitJob { task_id, kind } = job;

        // Mark the task processing before calling out, so a status query
        // issued during the provider call reflects in-flight work.
        let Some(task) =
            TaskRepo::transition(&self.pool, task_id, TaskStatus::Processing, None).await?
        else {
            tracing::warn!(task_id = %task_id, "Queued task no longer exists; dropping job");
            return Ok(());
        };

        let mode = match task.correlation_mode.parse::<CorrelationMode>() {
            Ok(mode) => mode,
            Err(_) => {
                tracing::error!(
                    task_id = %task_id,
                    correlation_mode = %task.correlation_mode,
                    "Task row has unknown correlation mode; assuming embedded",
                );
                CorrelationMode::Embedded
            }
        };

        let callback = callback_url(&self.public_base_url, mode, task_id);

        let result = match kind {
            TaskKind::Video => self.kie.generate_video(&task.prompt, &callback).await,
            TaskKind::Image => self.kie.generate_image(&task.prompt, &callback).await,
        };

        match result {
            Ok(provider_id) => self.record_accepted(task_id, mode, provider_id).await,
            Err(e) => {
                tracing::error!(task_id = %task_id, kind = %kind, error = %e, "Provider submission failed");
                TaskRepo::transition(
                    &self.pool,
                    task_id,
                    TaskStatus::Failed,
                    Some(&format!("Kie submission failed: {e}")),
                )
                .await?;
                Ok(())
            }
        }
    }

    /// Wire up callback correlation after the provider accepted the job.
    async fn record_accepted(
        &self,
        task_id: TaskId,
        mode: CorrelationMode,
        provider_id: Option<String>,
    ) -> Result<(), sqlx::Error> {
        match mode {
            CorrelationMode::Embedded => {
                // The task id travels inside the callback URL; nothing to
                // record beyond the processing status already set.
                tracing::info!(task_id = %task_id, "Job submitted with embedded callback id");
                Ok(())
            }
            CorrelationMode::Linked => match provider_id {
                Some(external_id) => {
                    if TaskRepo::link_external_id(&self.pool, task_id, &external_id)
                        .await?
                        .is_none()
                    {
                        tracing::warn!(
                            task_id = %task_id,
                            external_id = %external_id,
                            "Lost linkage: task vanished before the external id could be recorded",
                        );
                    } else {
                        tracing::info!(
                            task_id = %task_id,
                            external_id = %external_id,
                            "Job submitted and linked to provider id",
                        );
                    }
                    Ok(())
                }
                None => {
                    // A success-shaped response without a job identifier
                    // leaves the callback unmatchable: treat as rejection.
                    TaskRepo::transition(
                        &self.pool,
                        task_id,
                        TaskStatus::Failed,
                        Some("provider response did not include a task id"),
                    )
                    .await?;
                    Ok(())
                }
            },
        }
    }
}
