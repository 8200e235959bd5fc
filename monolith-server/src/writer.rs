//! Volume write logs: one timestamped text report per write operation

use chrono::{DateTime, Local, SecondsFormat};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::runtime::{format_uptime, RuntimeDiagnostics};

/// Everything a write report embeds, captured before any I/O happens
#[derive(Debug, Clone)]
pub struct ReportSnapshot {
    pub timestamp: DateTime<Local>,
    pub operation: u64,
    pub app_name: String,
    pub environment: String,
    pub hostname: String,
    pub client_addr: String,
    pub runtime_version: String,
    pub total_requests: u64,
    pub uptime: Duration,
    pub diagnostics: RuntimeDiagnostics,
    pub method: String,
    pub path: String,
    pub user_agent: String,
}

/// Result of a successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenLog {
    pub file_name: String,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Write failures, each tied to the path that failed
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("Failed to create log directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create log file {}: {source}", path.display())]
    CreateFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write log content to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// File name for a report taken at `timestamp`. Second resolution, so two
/// writes in the same second share a name and the later one wins.
pub fn log_file_name(timestamp: &DateTime<Local>) -> String {
    format!("{}-log.txt", timestamp.format("%Y%m%d-%H%M%S"))
}

/// Render the text report for a write operation
pub fn render_report(snapshot: &ReportSnapshot) -> String {
    let d = &snapshot.diagnostics;
    format!(
        r#"========================================
{app} - Volume Write Log
========================================

Timestamp:        {timestamp}
Operation Number: {op}
Application:      {app}
Environment:      {env}
Hostname:         {host}
Client Address:   {client}
Runtime:          {runtime}
Total Requests:   {total}
Uptime:           {uptime}

----------------------------------------
Log Entry Details
----------------------------------------

This log file was created by write operation #{op}.

System Information:
- Worker Threads:  {workers}
- Active Tasks:    {tasks}
- OS Threads:      {threads}
- Memory Resident: {mem} MB

Request Information:
- Method:         {method}
- Path:           {path}
- User Agent:     {agent}
- Remote Address: {client}

========================================
End of Log
========================================
"#,
        app = snapshot.app_name,
        timestamp = snapshot.timestamp.to_rfc3339_opts(SecondsFormat::Secs, false),
        op = snapshot.operation,
        env = snapshot.environment,
        host = snapshot.hostname,
        client = snapshot.client_addr,
        runtime = snapshot.runtime_version,
        total = snapshot.total_requests,
        uptime = format_uptime(snapshot.uptime),
        workers = d.worker_threads,
        tasks = d.active_tasks,
        threads = d.os_threads,
        mem = d.memory_rss_mb,
        method = snapshot.method,
        path = snapshot.path,
        agent = snapshot.user_agent,
    )
}

/// Writes reports into a single directory
#[derive(Debug, Clone)]
pub struct LogWriter {
    dir: PathBuf,
}

impl LogWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if needed and write the rendered report,
    /// replacing any file of the same name.
    pub async fn write(&self, snapshot: &ReportSnapshot) -> Result<WrittenLog, WriteError> {
        debug!("Ensuring log directory exists: {}", self.dir.display());
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| WriteError::CreateDir {
                path: self.dir.clone(),
                source,
            })?;

        let file_name = log_file_name(&snapshot.timestamp);
        let path = self.dir.join(&file_name);
        let content = render_report(snapshot);

        info!("Creating log file: {}", path.display());
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .await
            .map_err(|source| WriteError::CreateFile {
                path: path.clone(),
                source,
            })?;

        debug!("Writing {} bytes to {}", content.len(), path.display());
        let written = match file.write_all(content.as_bytes()).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };
        written.map_err(|source| WriteError::Write {
            path: path.clone(),
            source,
        })?;

        Ok(WrittenLog {
            file_name,
            path,
            bytes: content.len(),
        })
    }
}
