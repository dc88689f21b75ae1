//! One complete report run: resolve headers, fetch rows, write the output
//!
//! A run is driven by a [`TaskSpec`]: where the report lives, where the
//! output goes, and which locations and row cap apply in test mode. Header
//! resolution failing is fatal and no output file is touched; a page
//! failure mid-fetch still writes the rows collected so far and flags the
//! outcome as truncated.

use crate::error::{Error, Result};
use crate::logs::RunLogger;
use crate::tasks::TaskSpec;
use crate::types::RunOutcome;
use std::path::PathBuf;

use super::client::AnalyticsClient;
use super::output::write_output;
use super::pager::{FetchParams, ProgressFn, RowStream};

/// Options of one run, resolved from configuration by the caller
pub struct RunOptions {
    /// Use the task's test output/log locations and row cap
    pub test_mode: bool,
    /// Rows requested per page
    pub page_size: usize,
    /// Invoke the progress callback every N yielded rows
    pub progress_interval: u64,
    /// Optional progress callback
    pub progress: Option<ProgressFn>,
}

/// Execute one report run end to end
pub async fn run_report(
    client: &AnalyticsClient,
    task: &TaskSpec,
    options: RunOptions,
) -> Result<RunOutcome> {
    let output_dir: PathBuf = if options.test_mode {
        task.test_output_path
            .clone()
            .unwrap_or_else(|| task.output_path.clone())
    } else {
        task.output_path.clone()
    };
    let log_dir = if options.test_mode {
        task.test_log_dir.clone()
    } else {
        Some(task.log_dir.clone())
    };
    let max_rows = if options.test_mode {
        task.test_row_limit
    } else {
        None
    };

    let mut run_log = match log_dir {
        Some(dir) => Some(RunLogger::create(&dir)?),
        None => None,
    };
    if let Some(log) = run_log.as_mut() {
        log.info(&format!(
            "Starting report fetch: {} (test_mode={})",
            task.report_path, options.test_mode
        ));
    }

    let columns = client.resolve_headers(&task.report_path).await;
    if columns.is_empty() {
        let err = Error::NoHeaders {
            report_path: task.report_path.clone(),
        };
        if let Some(log) = run_log.as_mut() {
            log.error(&err.to_string());
        }
        return Err(err);
    }
    if let Some(log) = run_log.as_mut() {
        log.info(&format!("Resolved {} columns", columns.len()));
    }

    let stream = RowStream::new(
        client,
        FetchParams {
            report_path: task.report_path.clone(),
            page_size: options.page_size,
            max_rows,
            progress_interval: options.progress_interval,
            progress: options.progress,
        },
    );
    let outcome = stream.collect().await;
    let rows_fetched = outcome.rows.len() as u64;

    let dest = output_dir.join(&task.output_file_name);
    write_output(task.output_format, &columns, &outcome.rows, &dest)?;

    if let Some(log) = run_log.as_mut() {
        if outcome.truncated {
            log.error(&format!(
                "Fetch ended early after {rows_fetched} rows; output is partial"
            ));
        }
        log.info(&format!(
            "Wrote {} rows to {}",
            rows_fetched,
            dest.display()
        ));
    }
    tracing::info!(
        report_path = %task.report_path,
        rows = rows_fetched,
        truncated = outcome.truncated,
        output = %dest.display(),
        "report run finished"
    );

    Ok(RunOutcome {
        output_file: dest,
        rows_fetched,
        truncated: outcome.truncated,
    })
}
