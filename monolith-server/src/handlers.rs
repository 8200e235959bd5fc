//! API and health endpoint handlers

use chrono::{Local, SecondsFormat, Utc};
use hyper::StatusCode;
use monolith_common::{AppInfo, Stats};
use tracing::{debug, error, info, warn};

use crate::middleware::RequestContext;
use crate::response::{self, HttpResponse};
use crate::runtime::{format_uptime, round_secs, runtime_version, RuntimeDiagnostics};
use crate::stats::Counter;
use crate::writer::ReportSnapshot;
use crate::AppState;

const UNKNOWN_HOST: &str = "unknown";

async fn hostname(state: &AppState) -> String {
    state.env.hostname().await.unwrap_or_else(|| {
        warn!("Failed to resolve hostname, using '{}'", UNKNOWN_HOST);
        UNKNOWN_HOST.to_string()
    })
}

/// `GET /api/info`
pub async fn info(state: &AppState) -> HttpResponse {
    state.counters.increment(Counter::TotalRequests);

    let info = AppInfo {
        app_name: state.env.app_name(),
        environment: state.env.app_env(),
        db_user: state.env.db_user(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        hostname: hostname(state).await,
        timestamp: Utc::now(),
    };

    info!(
        "Sending app info: app_name={}, environment={}, hostname={}",
        info.app_name, info.environment, info.hostname
    );
    response::json(&info)
}

/// `POST /api/write`
pub async fn write(state: &AppState, ctx: &RequestContext) -> HttpResponse {
    state.counters.increment(Counter::TotalRequests);
    let operation = state.counters.increment_and_get(Counter::WriteOps);

    let snapshot = ReportSnapshot {
        timestamp: Local::now(),
        operation,
        app_name: state.env.app_name(),
        environment: state.env.app_env(),
        hostname: hostname(state).await,
        client_addr: ctx.remote_addr.to_string(),
        runtime_version: runtime_version(),
        total_requests: state.counters.read(Counter::TotalRequests),
        uptime: state.start_time.elapsed(),
        diagnostics: RuntimeDiagnostics::collect().await,
        method: ctx.method.to_string(),
        path: ctx.path.clone(),
        user_agent: ctx.user_agent.clone(),
    };

    match state.writer.write(&snapshot).await {
        Ok(written) => {
            info!(
                "Write operation #{} stored {} ({} bytes)",
                operation,
                written.path.display(),
                written.bytes
            );
            let body = format!(
                "Data written to volume successfully\n\
                 \n\
                 File: {}\n\
                 Operation: #{}\n\
                 Timestamp: {}\n\
                 Size: {} bytes\n\
                 \n\
                 Log directory: {}\n",
                written.file_name,
                operation,
                snapshot.timestamp.to_rfc3339_opts(SecondsFormat::Secs, false),
                written.bytes,
                state.writer.dir().display(),
            );
            response::text(StatusCode::OK, body)
        }
        Err(e) => {
            error!("Write operation #{} failed: {}", operation, e);
            response::text(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// `GET /api/stats`
pub async fn stats(state: &AppState) -> HttpResponse {
    state.counters.increment(Counter::TotalRequests);

    let uptime = state.start_time.elapsed();
    let diagnostics = RuntimeDiagnostics::collect().await;
    let stats = Stats {
        uptime: format_uptime(uptime),
        uptime_seconds: round_secs(uptime),
        total_requests: state.counters.read(Counter::TotalRequests),
        write_operations: state.counters.read(Counter::WriteOps),
        runtime_version: runtime_version(),
        worker_threads: diagnostics.worker_threads,
        active_tasks: diagnostics.active_tasks,
        os_threads: diagnostics.os_threads,
        memory_rss_mb: diagnostics.memory_rss_mb,
        server_time: Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
    };

    debug!(
        "Stats collected: uptime={}, requests={}, write_ops={}, memory={}MB",
        stats.uptime, stats.total_requests, stats.write_operations, stats.memory_rss_mb
    );
    response::json(&stats)
}

/// `GET /health`
pub async fn health(state: &AppState) -> HttpResponse {
    state.counters.increment(Counter::TotalRequests);
    response::text(StatusCode::OK, "OK")
}
