//! The transcription service.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::error::TranscriberError;
use crate::config::Config;
use crate::events::{Event, EventBus};
use crate::job::{Job, JobError, JobManager, JobStatus};
use crate::metrics;
use crate::pipeline::{
    PipelineConfig, PipelineError, PipelineObserver, Stage, TranscriptionPipeline,
    TranscriptionRequest, TranscriptionResult,
};
use crate::runner::{CommandLog, CommandRunner};
use crate::settings::{Settings, SettingsProvider};

/// Construction parameters for [`Transcriber`].
#[derive(Debug, Clone)]
pub struct TranscriberOptions {
    pub pipeline: PipelineConfig,
    /// Events retained for incremental reads.
    pub event_capacity: usize,
    /// Buffer of each live subscriber.
    pub broadcast_capacity: usize,
}

impl Default for TranscriberOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for TranscriberOptions {
    fn from(config: &Config) -> Self {
        Self {
            pipeline: config.tools.clone(),
            event_capacity: config.events.capacity,
            broadcast_capacity: config.events.broadcast_capacity,
        }
    }
}

/// Bookkeeping for the job whose pipeline task is in flight.
struct ActiveJob {
    job_id: String,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

struct Inner {
    pipeline: TranscriptionPipeline<Arc<dyn CommandRunner>>,
    settings: Arc<dyn SettingsProvider>,
    jobs: JobManager,
    events: EventBus,
    live: broadcast::Sender<Event>,
    // Serializes append + push so live subscribers see bus order.
    publish_lock: Mutex<()>,
    active: Mutex<Option<ActiveJob>>,
}

/// Runs at most one transcription job at a time and records what happens.
///
/// Cloning is cheap; clones share the same job state and event log.
#[derive(Clone)]
pub struct Transcriber {
    inner: Arc<Inner>,
}

impl Transcriber {
    pub fn new(
        options: TranscriberOptions,
        runner: Arc<dyn CommandRunner>,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        let (live, _) = broadcast::channel(options.broadcast_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                pipeline: TranscriptionPipeline::new(options.pipeline, runner),
                settings,
                jobs: JobManager::new(),
                events: EventBus::new(options.event_capacity),
                live,
                publish_lock: Mutex::new(()),
                active: Mutex::new(None),
            }),
        }
    }

    /// Starts a job for `input_path` using the current settings.
    ///
    /// Returns as soon as the pipeline task is spawned. Outcomes are reported
    /// through the event log.
    pub async fn start_transcription(
        &self,
        input_path: impl Into<PathBuf>,
    ) -> Result<Job, TranscriberError> {
        let settings = self.inner.settings.load().await?;
        let job_id = format!("job-{}", Uuid::new_v4());
        let cancel = CancellationToken::new();

        {
            let mut active = self.inner.lock_active();
            self.inner.jobs.start(job_id.clone())?;
            *active = Some(ActiveJob {
                job_id: job_id.clone(),
                cancel: cancel.clone(),
                task: None,
            });
        }

        metrics::JOBS_STARTED.inc();
        info!(job_id = %job_id, "Job started");
        self.inner.publish(Event::status(
            &job_id,
            JobStatus::Preprocessing,
            "Job started",
        ));

        let request = TranscriptionRequest {
            input_path: input_path.into(),
            model_path: PathBuf::from(settings.model_path),
            language: settings.language,
            output_dir: PathBuf::from(settings.output_dir),
        };

        let inner = Arc::clone(&self.inner);
        let task_job_id = job_id.clone();
        let handle = tokio::spawn(async move {
            inner.run_job(task_job_id, request, cancel).await;
        });

        if let Some(active) = self.inner.lock_active().as_mut() {
            if active.job_id == job_id {
                active.task = Some(handle);
            }
        }

        Ok(Job::new(job_id, JobStatus::Preprocessing))
    }

    /// Requests cancellation of the running job.
    pub fn cancel_transcription(&self) -> Result<(), TranscriberError> {
        let (job_id, cancelled) = {
            let active = self.inner.lock_active();
            let Some(active) = active.as_ref() else {
                return Err(JobError::NoRunningJob.into());
            };
            active.cancel.cancel();
            match self.inner.jobs.cancel() {
                Ok(()) => (active.job_id.clone(), true),
                // The task reached a terminal status first and reports it itself.
                Err(JobError::NoRunningJob) => (active.job_id.clone(), false),
                Err(e) => return Err(e.into()),
            }
        };

        if cancelled {
            info!(job_id = %job_id, "Cancellation requested");
            metrics::JOBS_FINISHED.with_label_values(&["cancelled"]).inc();
            self.inner
                .publish_status(&job_id, JobStatus::Cancelled, "Cancellation requested");
        } else {
            debug!(job_id = %job_id, "Cancellation raced with job completion");
        }
        Ok(())
    }

    /// Whether a pipeline task is still in flight (including its final bookkeeping).
    pub fn has_active_job(&self) -> bool {
        self.inner.lock_active().is_some()
    }

    /// Snapshot of the current job.
    pub fn current_job(&self) -> Job {
        self.inner.jobs.current()
    }

    /// Retained events with a sequence greater than `since`.
    pub fn job_events(&self, since: u64) -> Vec<Event> {
        self.inner.events.since(since)
    }

    /// Receives every event from now on, as it is published.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.live.subscribe()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.events
    }

    pub async fn get_settings(&self) -> Result<Settings, TranscriberError> {
        Ok(self.inner.settings.load().await?)
    }

    pub async fn save_settings(&self, settings: Settings) -> Result<Settings, TranscriberError> {
        Ok(self.inner.settings.save(settings.normalized()).await?)
    }

    /// Cancels any running job and waits up to `grace` for its task to finish.
    pub async fn shutdown(&self, grace: Duration) {
        let task = {
            let mut active = self.inner.lock_active();
            match active.as_mut() {
                Some(active) => active.task.take(),
                None => return,
            }
        };

        if let Err(e) = self.cancel_transcription() {
            debug!("Nothing to cancel on shutdown: {}", e);
        }

        if let Some(task) = task {
            match tokio::time::timeout(grace, task).await {
                Ok(Ok(())) => info!("Running job stopped"),
                Ok(Err(e)) => error!("Job task failed during shutdown: {}", e),
                Err(_) => warn!("Timed out waiting for running job to stop"),
            }
        }
    }
}

impl Inner {
    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<ActiveJob>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: Event) {
        let _guard = self.publish_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let event = self.events.publish(event);
        // No subscribers is fine; the event stays in the log.
        let _ = self.live.send(event);
    }

    fn publish_status(&self, job_id: &str, status: JobStatus, message: &str) {
        self.publish(Event::status(job_id, status, message));
    }

    async fn run_job(&self, job_id: String, request: TranscriptionRequest, cancel: CancellationToken) {
        let observer = JobObserver {
            inner: self,
            job_id: &job_id,
            cancel: &cancel,
        };

        match self.pipeline.run(&request, &observer, &cancel).await {
            Ok(result) => self.finish_success(&job_id, result),
            Err(e) if e.is_cancelled() || cancel.is_cancelled() => self.finish_cancelled(&job_id, &e),
            Err(e) => self.finish_failed(&job_id, e),
        }

        self.clear_active(&job_id);
    }

    fn finish_success(&self, job_id: &str, mut result: TranscriptionResult) {
        if let Err(e) = result.workspace.release() {
            warn!(job_id = %job_id, "Failed to clean up workspace: {}", e);
            self.publish(Event::error(job_id, format!("cleanup temporary files: {}", e)));
        }

        match self.with_own_job(job_id, |jobs| jobs.transition(JobStatus::Done)) {
            Some(Ok(())) => {
                info!(job_id = %job_id, text_path = %result.text_path.display(), "Job completed");
                metrics::JOBS_FINISHED.with_label_values(&["done"]).inc();
                self.publish_status(job_id, JobStatus::Done, "Job completed");
                self.publish(Event::result(job_id, result.text_path));
            }
            Some(Err(e)) => {
                warn!(job_id = %job_id, "Pipeline finished but job could not complete: {}", e);
            }
            None => debug!(job_id = %job_id, "Job superseded before completion"),
        }
    }

    fn finish_cancelled(&self, job_id: &str, err: &PipelineError) {
        debug!(job_id = %job_id, stage = %err.stage(), "Pipeline stopped after cancellation");
        // Fails when cancel_transcription already moved the job and published.
        match self.with_own_job(job_id, |jobs| jobs.cancel()) {
            Some(Ok(())) => {
                info!(job_id = %job_id, "Job cancelled");
                metrics::JOBS_FINISHED.with_label_values(&["cancelled"]).inc();
                self.publish_status(job_id, JobStatus::Cancelled, "Job cancelled");
            }
            Some(Err(_)) => {}
            None => debug!(job_id = %job_id, "Job superseded before cancellation finished"),
        }
    }

    fn finish_failed(&self, job_id: &str, err: PipelineError) {
        error!(job_id = %job_id, stage = %err.stage(), "Job failed: {}", err);

        match self.with_own_job(job_id, |jobs| jobs.transition(JobStatus::Failed)) {
            Some(Ok(())) => {}
            Some(Err(e)) => {
                warn!(job_id = %job_id, "Could not mark job failed: {}", e);
                return;
            }
            None => {
                debug!(job_id = %job_id, "Job superseded before failure was recorded");
                return;
            }
        }
        metrics::JOBS_FINISHED.with_label_values(&["failed"]).inc();

        self.publish_status(job_id, JobStatus::Failed, "Job failed");
        self.publish(Event::error(job_id, err.to_string()).with_status(JobStatus::Failed));
        if let Some(log) = err.command_log().filter(|log| !log.command.is_empty()) {
            self.publish(Event::log(job_id, "Failed command", log));
        }
    }

    /// Runs `f` against the job manager only while `job_id` is still the
    /// active job; a newer start owns the manager once it replaced it.
    fn with_own_job<T>(&self, job_id: &str, f: impl FnOnce(&JobManager) -> T) -> Option<T> {
        let active = self.lock_active();
        match active.as_ref() {
            Some(current) if current.job_id == job_id => Some(f(&self.jobs)),
            _ => None,
        }
    }

    fn clear_active(&self, job_id: &str) {
        let mut active = self.lock_active();
        if active.as_ref().is_some_and(|a| a.job_id == job_id) {
            *active = None;
        }
    }
}

/// Forwards pipeline progress for one job.
struct JobObserver<'a> {
    inner: &'a Inner,
    job_id: &'a str,
    cancel: &'a CancellationToken,
}

impl PipelineObserver for JobObserver<'_> {
    fn on_stage(&self, stage: Stage) {
        let status = JobStatus::from(stage);
        // Under the active lock, so a concurrent cancel cannot be overwritten.
        let transition = self.inner.with_own_job(self.job_id, |jobs| {
            if self.cancel.is_cancelled() {
                None
            } else {
                Some(jobs.transition(status))
            }
        });
        match transition.flatten() {
            None => {
                debug!(job_id = %self.job_id, stage = %stage, "Skipping stage after cancellation");
            }
            Some(Ok(())) => self.inner.publish_status(
                self.job_id,
                status,
                &format!("Running {} stage", stage),
            ),
            Some(Err(e)) => {
                debug!(job_id = %self.job_id, stage = %stage, "Stage transition skipped: {}", e)
            }
        }
    }

    fn on_command(&self, log: &CommandLog) {
        debug!(
            job_id = %self.job_id,
            command = %log.command,
            exit_code = log.exit_code,
            "Command completed"
        );
        self.inner
            .publish(Event::log(self.job_id, "Command completed", log));
    }
}
