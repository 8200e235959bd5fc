//! Process and async runtime diagnostics

use std::time::Duration;

/// Point-in-time view of the process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeDiagnostics {
    pub worker_threads: usize,
    pub active_tasks: usize,
    pub os_threads: usize,
    pub memory_rss_mb: u64,
}

impl RuntimeDiagnostics {
    /// Collect diagnostics. Values that cannot be read are reported as 0.
    pub async fn collect() -> Self {
        let (worker_threads, active_tasks) = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let metrics = handle.metrics();
                (metrics.num_workers(), metrics.num_alive_tasks())
            }
            Err(_) => (0, 0),
        };

        let status = tokio::fs::read_to_string("/proc/self/status")
            .await
            .unwrap_or_default();
        let (os_threads, memory_rss_mb) = parse_proc_status(&status);

        Self {
            worker_threads,
            active_tasks,
            os_threads,
            memory_rss_mb,
        }
    }
}

/// Extract the thread count and resident memory (MB) from a
/// `/proc/<pid>/status` document.
fn parse_proc_status(status: &str) -> (usize, u64) {
    let mut threads = 0;
    let mut rss_kb = 0u64;

    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("Threads:") {
            threads = rest.trim().parse().unwrap_or(0);
        } else if let Some(rest) = line.strip_prefix("VmRSS:") {
            rss_kb = rest
                .split_whitespace()
                .next()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
        }
    }

    (threads, rss_kb / 1024)
}

/// Compiler that built the binary and target platform,
/// e.g. `rustc 1.80.0 (051478957 2024-07-21) linux/x86_64`
pub fn runtime_version() -> String {
    format!(
        "{} {}/{}",
        env!("MONOLITH_RUSTC_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Whole seconds, rounding half up
pub fn round_secs(uptime: Duration) -> u64 {
    let secs = uptime.as_secs();
    if uptime.subsec_millis() >= 500 {
        secs + 1
    } else {
        secs
    }
}

/// Render a duration rounded to whole seconds: `1h2m3s`, `4m5s`, `6s`
pub fn format_uptime(uptime: Duration) -> String {
    let secs = round_secs(uptime);

    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
