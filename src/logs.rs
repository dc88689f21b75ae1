//! Per-run log files and log directory browsing
//!
//! Each report run writes a timestamped `download_analytics_log_*.log` file
//! into the task's log directory. The API exposes those directories
//! read-only: list the files, tail one file.

use crate::error::{Error, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use utoipa::ToSchema;

/// Writer for one run's log file
///
/// Write failures are downgraded to tracing warnings so a full log disk
/// cannot fail an otherwise healthy run mid-flight.
#[derive(Debug)]
pub struct RunLogger {
    file: std::fs::File,
    path: PathBuf,
}

impl RunLogger {
    /// Create the log directory and a fresh timestamped log file in it
    pub fn create(log_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(log_dir)?;
        let name = format!(
            "download_analytics_log_{}.log",
            Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = log_dir.join(name);
        let file = std::fs::File::create(&path)?;
        Ok(Self { file, path })
    }

    /// Path of the log file being written
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an INFO line
    pub fn info(&mut self, message: &str) {
        self.write_line("INFO", message);
    }

    /// Append an ERROR line
    pub fn error(&mut self, message: &str) {
        self.write_line("ERROR", message);
    }

    fn write_line(&mut self, level: &str, message: &str) {
        let line = format!(
            "{} - {} - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            level,
            message
        );
        if let Err(e) = self.file.write_all(line.as_bytes()) {
            tracing::warn!(error = %e, path = %self.path.display(), "failed to write run log line");
        }
    }
}

/// Metadata of one log file in a task's log directory
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LogFile {
    /// File name
    pub name: String,
    /// Full path on disk
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Modification time as seconds since the Unix epoch
    pub modified: i64,
}

/// Content of a (tailed) log file
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LogContent {
    /// File name
    pub name: String,
    /// File content (last `tail` lines when tailing)
    pub content: String,
}

/// List `.log` files in a directory, newest first
///
/// A missing directory is an empty listing, not an error: log directories
/// only come into existence when the first run writes to them.
pub fn list_log_files(dir: &Path) -> Result<Vec<LogFile>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(".log") {
            continue;
        }
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        let modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        files.push(LogFile {
            name,
            path: entry.path(),
            size: meta.len(),
            modified,
        });
    }
    files.sort_by(|a, b| b.modified.cmp(&a.modified).then(b.name.cmp(&a.name)));
    Ok(files)
}

/// Read the last `tail` lines of a log file (`tail == 0` reads everything)
///
/// The filename must be a bare name: separators and parent references are
/// rejected so a request cannot escape the log directory.
pub fn read_log_file(dir: &Path, filename: &str, tail: usize) -> Result<LogContent> {
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(Error::InvalidPath(filename.to_string()));
    }
    let path = dir.join(filename);
    if !path.is_file() {
        return Err(Error::NotFound(format!("log file '{filename}'")));
    }
    let raw = std::fs::read(&path)?;
    let text = String::from_utf8_lossy(&raw);
    let content = if tail > 0 {
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let start = lines.len().saturating_sub(tail);
        lines[start..].concat()
    } else {
        text.into_owned()
    };
    Ok(LogContent {
        name: filename.to_string(),
        content,
    })
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn run_logger_creates_directory_and_named_file() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        let mut logger = RunLogger::create(&log_dir).unwrap();
        logger.info("Started task: loans");
        logger.error("Failed to fetch rows: 500");

        let file_name = logger
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        assert!(file_name.starts_with("download_analytics_log_"));
        assert!(file_name.ends_with(".log"));

        let content = std::fs::read_to_string(logger.path()).unwrap();
        assert!(content.contains("INFO - Started task: loans"));
        assert!(content.contains("ERROR - Failed to fetch rows: 500"));
    }

    #[test]
    fn list_skips_non_log_files_and_sorts_newest_first() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.log"), "a").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::write(dir.path().join("b.log"), "bb").unwrap();

        let files = list_log_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.name.ends_with(".log")));
        assert!(files[0].modified >= files[1].modified);
    }

    #[test]
    fn list_of_missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        let files = list_log_files(&dir.path().join("never_created")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn read_tails_the_requested_number_of_lines() {
        let dir = tempdir().unwrap();
        let lines: Vec<String> = (1..=10).map(|i| format!("line {i}")).collect();
        std::fs::write(dir.path().join("run.log"), lines.join("\n") + "\n").unwrap();

        let tailed = read_log_file(dir.path(), "run.log", 3).unwrap();
        assert_eq!(tailed.content, "line 8\nline 9\nline 10\n");

        let full = read_log_file(dir.path(), "run.log", 0).unwrap();
        assert_eq!(full.content.lines().count(), 10);
    }

    #[test]
    fn read_rejects_path_traversal() {
        let dir = tempdir().unwrap();

        for bad in ["../secret.log", "sub/run.log", "..\\run.log"] {
            let err = read_log_file(dir.path(), bad, 500).unwrap_err();
            assert!(matches!(err, Error::InvalidPath(_)), "accepted {bad}");
        }
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = read_log_file(dir.path(), "ghost.log", 500).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
