//! Report fetching facade
//!
//! [`ReportFetcher`] ties the pieces together: it owns the task store and
//! job tracker, spawns one background task per report run, and broadcasts
//! lifecycle [`Event`]s to any number of subscribers.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::jobs::JobTracker;
use crate::tasks::{TaskSpec, TaskStore};
use crate::types::{Event, Job, JobId, JobStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

mod client;
mod output;
mod pager;
mod runner;
mod xml;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use client::AnalyticsClient;
pub use pager::{FetchParams, ProgressFn, RowStream};
pub use runner::{run_report, RunOptions};

/// Capacity of the lifecycle event channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Coordinates report runs: task configuration, job tracking, events
#[derive(Clone)]
pub struct ReportFetcher {
    /// Task configuration store
    pub tasks: Arc<TaskStore>,
    /// Job tracker
    pub jobs: Arc<JobTracker>,
    pub(crate) config: Arc<Config>,
    pub(crate) event_tx: broadcast::Sender<Event>,
}

impl ReportFetcher {
    /// Create a fetcher, opening the task store named by the configuration
    pub async fn new(config: Config) -> Result<Self> {
        let tasks = TaskStore::open(config.tasks_file.clone()).await?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            tasks: Arc::new(tasks),
            jobs: Arc::new(JobTracker::new()),
            config: Arc::new(config),
            event_tx,
        })
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    fn emit(&self, event: Event) {
        // Send fails only when nobody is subscribed
        let _ = self.event_tx.send(event);
    }

    /// Start a report run for a configured task
    ///
    /// Returns the pending job immediately; the fetch runs in a spawned
    /// background task and records its outcome in the job tracker.
    pub async fn run_task(&self, task_name: &str, test_mode: bool) -> Result<Job> {
        let task = self
            .tasks
            .get(task_name)
            .await?
            .ok_or_else(|| Error::TaskNotFound(task_name.to_string()))?;

        let job = self.jobs.create(task_name, test_mode).await;
        self.emit(Event::JobQueued {
            id: job.id.clone(),
            task_name: task_name.to_string(),
            test_mode,
        });

        let fetcher = self.clone();
        let job_id = job.id.clone();
        tokio::spawn(async move {
            fetcher.execute_job(&job_id, task.spec, test_mode).await;
        });

        Ok(job)
    }

    /// Cancel a pending or running job
    ///
    /// Cancellation is bookkeeping only: the fetch loop is not interrupted,
    /// and a run that later finishes records its real outcome.
    pub async fn cancel_job(&self, job_id: &str) -> Result<Job> {
        let job = self
            .jobs
            .get(job_id)
            .await
            .ok_or_else(|| Error::JobNotFound(job_id.to_string()))?;

        if !self.jobs.cancel(job_id).await {
            return Err(Error::JobNotCancellable {
                id: job_id.to_string(),
                status: job.status.to_string(),
            });
        }
        self.emit(Event::JobCancelled { id: job.id.clone() });

        self.jobs
            .get(job_id)
            .await
            .ok_or_else(|| Error::JobNotFound(job_id.to_string()))
    }

    async fn execute_job(&self, job_id: &JobId, task: TaskSpec, test_mode: bool) {
        self.jobs
            .update_status(job_id.as_str(), JobStatus::Running)
            .await;
        self.emit(Event::JobStarted { id: job_id.clone() });

        let api_key = match std::env::var(&self.config.analytics.api_key_env) {
            Ok(key) => key,
            Err(_) => {
                let error = Error::MissingApiKey {
                    var: self.config.analytics.api_key_env.clone(),
                }
                .to_string();
                tracing::error!(job_id = %job_id, error = %error, "report run failed");
                self.jobs.fail(job_id.as_str(), error.clone()).await;
                self.emit(Event::JobFailed {
                    id: job_id.clone(),
                    error,
                });
                return;
            }
        };

        let client = AnalyticsClient::new(
            self.config.analytics.base_url.clone(),
            api_key,
            self.config
                .analytics
                .request_timeout_secs
                .map(Duration::from_secs),
        );

        // Progress flows through a channel so the fetch loop never awaits
        // tracker locks or slow subscribers
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<(u64, String)>();
        let progress: ProgressFn = Box::new(move |rows, message| {
            let _ = progress_tx.send((rows, message));
        });

        let consumer = {
            let fetcher = self.clone();
            let job_id = job_id.clone();
            tokio::spawn(async move {
                while let Some((rows_fetched, message)) = progress_rx.recv().await {
                    fetcher
                        .jobs
                        .update_progress(job_id.as_str(), rows_fetched, message.clone())
                        .await;
                    fetcher.emit(Event::JobProgress {
                        id: job_id.clone(),
                        rows_fetched,
                        message,
                    });
                }
            })
        };

        let options = RunOptions {
            test_mode,
            page_size: self.config.analytics.page_size,
            progress_interval: self.config.analytics.progress_interval,
            progress: Some(progress),
        };
        let result = run_report(&client, &task, options).await;

        // The progress sender is dropped with the run; drain before the
        // final state so no progress lands after completion
        let _ = consumer.await;

        match result {
            Ok(outcome) => {
                self.jobs
                    .complete(
                        job_id.as_str(),
                        outcome.output_file.clone(),
                        outcome.rows_fetched,
                        outcome.truncated,
                    )
                    .await;
                self.emit(Event::JobCompleted {
                    id: job_id.clone(),
                    output_file: outcome.output_file,
                    rows_fetched: outcome.rows_fetched,
                    truncated: outcome.truncated,
                });
            }
            Err(e) => {
                let error = e.to_string();
                tracing::error!(job_id = %job_id, error = %error, "report run failed");
                self.jobs.fail(job_id.as_str(), error.clone()).await;
                self.emit(Event::JobFailed {
                    id: job_id.clone(),
                    error,
                });
            }
        }
    }
}
