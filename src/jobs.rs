//! In-memory job tracker
//!
//! One [`Job`] record per asynchronous report run, keyed by job id. All
//! methods are safe to call concurrently from independent runs. Cancelling
//! only updates bookkeeping state: the underlying fetch loop is never
//! interrupted, and a run that later finishes overwrites the cancelled
//! status with its real outcome.

use crate::types::{Job, JobId, JobStatus};
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

/// Tracks every job created in this process
#[derive(Debug, Default)]
pub struct JobTracker {
    jobs: RwLock<HashMap<String, Job>>,
}

impl JobTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new pending job
    pub async fn create(&self, task_name: &str, test_mode: bool) -> Job {
        let job = Job {
            id: JobId::generate(),
            task_name: task_name.to_string(),
            test_mode,
            status: JobStatus::Pending,
            started_at: Utc::now(),
            completed_at: None,
            rows_fetched: 0,
            output_file: None,
            error_message: None,
            progress_message: String::new(),
            truncated: false,
        };
        let mut jobs = self.jobs.write().await;
        jobs.insert(job.id.to_string(), job.clone());
        job
    }

    /// Look up a job by id
    pub async fn get(&self, job_id: &str) -> Option<Job> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// List jobs, newest first, up to `limit`
    pub async fn list(&self, limit: usize) -> Vec<Job> {
        let jobs = self.jobs.read().await;
        let mut all: Vec<Job> = jobs.values().cloned().collect();
        all.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        all.truncate(limit);
        all
    }

    /// Update a job's status
    pub async fn update_status(&self, job_id: &str, status: JobStatus) {
        if let Some(job) = self.jobs.write().await.get_mut(job_id) {
            job.status = status;
        }
    }

    /// Record fetch progress
    pub async fn update_progress(&self, job_id: &str, rows_fetched: u64, message: String) {
        if let Some(job) = self.jobs.write().await.get_mut(job_id) {
            job.rows_fetched = rows_fetched;
            job.progress_message = message;
        }
    }

    /// Mark a job completed with its output file and final row count
    pub async fn complete(
        &self,
        job_id: &str,
        output_file: PathBuf,
        rows_fetched: u64,
        truncated: bool,
    ) {
        if let Some(job) = self.jobs.write().await.get_mut(job_id) {
            job.status = JobStatus::Completed;
            job.completed_at = Some(Utc::now());
            job.output_file = Some(output_file);
            job.rows_fetched = rows_fetched;
            job.truncated = truncated;
        }
    }

    /// Mark a job failed with an error message
    pub async fn fail(&self, job_id: &str, error_message: String) {
        if let Some(job) = self.jobs.write().await.get_mut(job_id) {
            job.status = JobStatus::Failed;
            job.completed_at = Some(Utc::now());
            job.error_message = Some(error_message);
        }
    }

    /// Cancel a pending or running job; returns whether the cancel applied
    pub async fn cancel(&self, job_id: &str) -> bool {
        if let Some(job) = self.jobs.write().await.get_mut(job_id) {
            if job.status.is_active() {
                job.status = JobStatus::Cancelled;
                job.completed_at = Some(Utc::now());
                return true;
            }
        }
        false
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_starts_pending_with_zero_rows() {
        let tracker = JobTracker::new();
        let job = tracker.create("loans", false).await;

        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.rows_fetched, 0);
        assert_eq!(job.task_name, "loans");
        assert!(!job.test_mode);
        assert!(job.completed_at.is_none());

        let fetched = tracker.get(job.id.as_str()).await.unwrap();
        assert_eq!(fetched.id, job.id);
    }

    #[tokio::test]
    async fn list_returns_newest_first_and_honors_limit() {
        let tracker = JobTracker::new();
        for _ in 0..5 {
            tracker.create("loans", false).await;
            // Distinct timestamps for a stable sort order
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        let newest = tracker.create("fines", true).await;

        let listed = tracker.list(3).await;
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].id, newest.id);
        assert!(listed[0].started_at >= listed[1].started_at);
        assert!(listed[1].started_at >= listed[2].started_at);
    }

    #[tokio::test]
    async fn progress_updates_rows_and_message() {
        let tracker = JobTracker::new();
        let job = tracker.create("loans", false).await;

        tracker
            .update_progress(job.id.as_str(), 200, "Fetched 200 rows...".into())
            .await;

        let fetched = tracker.get(job.id.as_str()).await.unwrap();
        assert_eq!(fetched.rows_fetched, 200);
        assert_eq!(fetched.progress_message, "Fetched 200 rows...");
    }

    #[tokio::test]
    async fn complete_records_output_and_truncation() {
        let tracker = JobTracker::new();
        let job = tracker.create("loans", false).await;

        tracker
            .complete(job.id.as_str(), PathBuf::from("/out/loans.csv"), 1234, true)
            .await;

        let fetched = tracker.get(job.id.as_str()).await.unwrap();
        assert_eq!(fetched.status, JobStatus::Completed);
        assert_eq!(fetched.output_file, Some(PathBuf::from("/out/loans.csv")));
        assert_eq!(fetched.rows_fetched, 1234);
        assert!(fetched.truncated);
        assert!(fetched.completed_at.is_some());
    }

    #[tokio::test]
    async fn fail_records_error_message() {
        let tracker = JobTracker::new();
        let job = tracker.create("loans", false).await;

        tracker
            .fail(job.id.as_str(), "no headers found for report 'x'".into())
            .await;

        let fetched = tracker.get(job.id.as_str()).await.unwrap();
        assert_eq!(fetched.status, JobStatus::Failed);
        assert_eq!(
            fetched.error_message.as_deref(),
            Some("no headers found for report 'x'")
        );
    }

    #[tokio::test]
    async fn cancel_applies_only_to_active_jobs() {
        let tracker = JobTracker::new();

        let pending = tracker.create("loans", false).await;
        assert!(tracker.cancel(pending.id.as_str()).await);
        assert_eq!(
            tracker.get(pending.id.as_str()).await.unwrap().status,
            JobStatus::Cancelled
        );

        let done = tracker.create("loans", false).await;
        tracker
            .complete(done.id.as_str(), PathBuf::from("/out/x.csv"), 1, false)
            .await;
        assert!(!tracker.cancel(done.id.as_str()).await);

        assert!(!tracker.cancel("missing0").await);
    }

    #[tokio::test]
    async fn completion_overwrites_a_cancelled_status() {
        // Cancel is bookkeeping only; a run that finishes anyway records
        // its real outcome, matching the original job manager.
        let tracker = JobTracker::new();
        let job = tracker.create("loans", false).await;

        assert!(tracker.cancel(job.id.as_str()).await);
        tracker
            .complete(job.id.as_str(), PathBuf::from("/out/x.csv"), 10, false)
            .await;

        let fetched = tracker.get(job.id.as_str()).await.unwrap();
        assert_eq!(fetched.status, JobStatus::Completed);
    }
}
