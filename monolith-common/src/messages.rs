//! JSON records served by the API endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `GET /api/info`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppInfo {
    pub app_name: String,

    pub environment: String,

    /// Configured database user, reported verbatim
    pub db_user: String,

    pub version: String,

    pub hostname: String,

    pub timestamp: DateTime<Utc>,
}

/// Body of `GET /api/stats`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stats {
    /// Uptime rounded to seconds, e.g. `1h2m3s`
    pub uptime: String,

    pub uptime_seconds: u64,

    /// Requests handled by the API and health endpoints
    pub total_requests: u64,

    /// Write operations attempted
    pub write_operations: u64,

    pub runtime_version: String,

    /// Async runtime worker threads
    pub worker_threads: usize,

    /// Tasks currently alive on the async runtime
    pub active_tasks: usize,

    /// OS threads in the process (0 when unavailable)
    pub os_threads: usize,

    /// Resident memory in MB (0 when unavailable)
    pub memory_rss_mb: u64,

    /// RFC 3339 server time
    pub server_time: String,
}
