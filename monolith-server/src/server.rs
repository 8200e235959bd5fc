//! HTTP listener and request routing

use anyhow::Result;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::handlers;
use crate::middleware::{self, RequestContext};
use crate::response::{self, HttpResponse};
use crate::static_files;
use crate::AppState;

/// Bind the listener configured for `state`
pub async fn bind(state: &AppState) -> Result<TcpListener> {
    let addr: SocketAddr = state.config.listen_address().parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on http://{}", addr);
    Ok(listener)
}

/// Accept connections forever, one task per connection
pub async fn run_server(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    loop {
        let (stream, remote_addr) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let state = state.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let state = state.clone();
                async move { handle_request(state, req, remote_addr).await }
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                debug!("Connection error: {:?}", err);
            }
        });
    }
}

/// Handle incoming HTTP request
pub async fn handle_request<B>(
    state: Arc<AppState>,
    req: Request<B>,
    remote_addr: SocketAddr,
) -> Result<HttpResponse, Infallible> {
    let ctx = RequestContext::from_request(&req, remote_addr);
    drop(req);

    let response = middleware::log_request(&ctx, route(&state, &ctx)).await;
    Ok(response)
}

async fn route(state: &AppState, ctx: &RequestContext) -> HttpResponse {
    let readable = ctx.method == Method::GET || ctx.method == Method::HEAD;

    match ctx.path.as_str() {
        "/api/write" if ctx.method == Method::POST => handlers::write(state, ctx).await,
        "/api/write" => response::method_not_allowed("POST"),
        "/api/info" | "/api/stats" | "/health" if !readable => {
            response::method_not_allowed("GET, HEAD")
        }
        "/api/info" => handlers::info(state).await,
        "/api/stats" => handlers::stats(state).await,
        "/health" => handlers::health(state).await,
        _ if !readable => response::method_not_allowed("GET, HEAD"),
        path => static_files::serve(&state.config.static_files, path).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{self, EnvResolver};
    use crate::runtime::format_uptime;
    use crate::stats::Counter;
    use bytes::Bytes;
    use http_body_util::{BodyExt, Empty};
    use hyper::header::{ALLOW, CONTENT_TYPE};
    use hyper::StatusCode;
    use monolith_common::{AppInfo, MonolithConfig, Stats};
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    fn test_state(log_dir: &Path, static_root: &Path) -> Arc<AppState> {
        let mut config = MonolithConfig::default();
        config.storage.log_dir = log_dir.to_path_buf();
        config.static_files[0].root = static_root.to_path_buf();

        let env = EnvResolver::fixed([
            (env::APP_NAME, "demo-app"),
            (env::APP_ENV, "test"),
            (env::HOSTNAME, "pod-1"),
        ]);
        Arc::new(AppState::new(config, env))
    }

    async fn send(state: &Arc<AppState>, method: Method, path: &str) -> HttpResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("User-Agent", "test-client/1.0")
            .body(Empty::<Bytes>::new())
            .unwrap();
        handle_request(state.clone(), req, "192.0.2.10:40000".parse().unwrap())
            .await
            .unwrap()
    }

    async fn body_string(response: HttpResponse) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn log_files(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .map(|rd| rd.map(|e| e.unwrap().path()).collect())
            .unwrap_or_default()
    }

    fn is_log_file_name(name: &str) -> bool {
        let Some(stamp) = name.strip_suffix("-log.txt") else {
            return false;
        };
        let bytes = stamp.as_bytes();
        bytes.len() == 15
            && bytes[8] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 8 || b.is_ascii_digit())
    }

    #[tokio::test]
    async fn test_health_always_ok() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(&tmp.path().join("log"), tmp.path());

        for _ in 0..3 {
            let response = send(&state, Method::GET, "/health").await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_string(response).await, "OK");
        }
        assert_eq!(state.counters.read(Counter::TotalRequests), 3);
        assert_eq!(state.counters.read(Counter::WriteOps), 0);
    }

    #[tokio::test]
    async fn test_info_returns_app_info() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(&tmp.path().join("log"), tmp.path());

        let response = send(&state, Method::GET, "/api/info").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

        let info: AppInfo = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(info.app_name, "demo-app");
        assert_eq!(info.environment, "test");
        assert_eq!(info.db_user, env::DEFAULT_DB_USER);
        assert_eq!(info.hostname, "pod-1");
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(state.counters.read(Counter::TotalRequests), 1);
    }

    #[tokio::test]
    async fn test_info_without_hostname_uses_sentinel() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = MonolithConfig::default();
        config.storage.log_dir = tmp.path().to_path_buf();
        let state = Arc::new(AppState::new(config, EnvResolver::fixed::<_, &str, &str>([])));

        let response = send(&state, Method::GET, "/api/info").await;
        let info: AppInfo = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(info.hostname, "unknown");
        assert_eq!(info.app_name, env::DEFAULT_APP_NAME);
    }

    #[tokio::test]
    async fn test_stats_reflect_counters() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(&tmp.path().join("log"), tmp.path());

        send(&state, Method::GET, "/health").await;
        send(&state, Method::POST, "/api/write").await;

        let response = send(&state, Method::GET, "/api/stats").await;
        assert_eq!(response.status(), StatusCode::OK);

        let value: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        for field in [
            "uptime",
            "uptime_seconds",
            "total_requests",
            "write_operations",
            "runtime_version",
            "worker_threads",
            "active_tasks",
            "os_threads",
            "memory_rss_mb",
            "server_time",
        ] {
            assert!(!value[field].is_null(), "missing field {}", field);
        }

        let stats: Stats = serde_json::from_value(value).unwrap();
        assert_eq!(stats.total_requests, 3);
        assert_eq!(stats.write_operations, 1);
        assert_eq!(
            stats.uptime,
            format_uptime(Duration::from_secs(stats.uptime_seconds))
        );
    }

    #[tokio::test]
    async fn test_write_produces_one_file() {
        let tmp = tempfile::tempdir().unwrap();
        let log_dir = tmp.path().join("data").join("log");
        let state = test_state(&log_dir, tmp.path());

        let response = send(&state, Method::POST, "/api/write").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("Operation: #1\n"));

        let files = log_files(&log_dir);
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_str().unwrap().to_string();
        assert!(is_log_file_name(&name), "unexpected file name {}", name);
        assert!(body.contains(&format!("File: {}\n", name)));

        let content = std::fs::read_to_string(&files[0]).unwrap();
        let current = state.counters.read(Counter::WriteOps);
        assert!(content.contains(&format!("Operation Number: {}\n", current)));
        assert!(content.contains("- User Agent:     test-client/1.0\n"));
        assert!(content.contains("192.0.2.10:40000"));
        assert!(body.contains(&format!("Size: {} bytes", content.len())));
    }

    #[tokio::test]
    async fn test_write_to_unusable_directory_is_500() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("occupied");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let state = test_state(&blocker.join("log"), tmp.path());

        let response = send(&state, Method::POST, "/api/write").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(response)
            .await
            .starts_with("Failed to create log directory"));

        assert_eq!(state.counters.read(Counter::TotalRequests), 1);
        assert_eq!(state.counters.read(Counter::WriteOps), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_count_exactly() {
        let tmp = tempfile::tempdir().unwrap();
        let log_dir = tmp.path().join("log");
        let state = test_state(&log_dir, tmp.path());
        let n = 32;

        let requests = (0..n).map(|_| {
            let state = state.clone();
            tokio::spawn(async move { send(&state, Method::POST, "/api/write").await.status() })
        });
        let statuses = futures::future::join_all(requests).await;

        for status in statuses {
            assert_eq!(status.unwrap(), StatusCode::OK);
        }
        assert_eq!(state.counters.read(Counter::TotalRequests), n);
        assert_eq!(state.counters.read(Counter::WriteOps), n);

        // writes in the same second share a file
        let files = log_files(&log_dir);
        assert!(!files.is_empty() && files.len() <= n as usize);
    }

    #[tokio::test]
    async fn test_method_rules() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(&tmp.path().join("log"), tmp.path());

        let response = send(&state, Method::GET, "/api/write").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "POST");

        let response = send(&state, Method::DELETE, "/health").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        assert_eq!(state.counters.read(Counter::TotalRequests), 0);
        assert!(log_files(&tmp.path().join("log")).is_empty());

        let response = send(&state, Method::HEAD, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.counters.read(Counter::TotalRequests), 1);
    }

    #[tokio::test]
    async fn test_bind_fails_on_occupied_port() {
        let tmp = tempfile::tempdir().unwrap();
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = occupied.local_addr().unwrap().port();

        let mut config = MonolithConfig::default();
        config.server.bind_address = "127.0.0.1".to_string();
        config.server.port = port;
        config.storage.log_dir = tmp.path().to_path_buf();
        let state = AppState::new(config, EnvResolver::fixed::<_, &str, &str>([]));

        assert!(bind(&state).await.is_err());
    }

    #[tokio::test]
    async fn test_bind_rejects_unparsable_address() {
        let mut config = MonolithConfig::default();
        config.server.bind_address = "not an ip".to_string();
        let state = AppState::new(config, EnvResolver::fixed::<_, &str, &str>([]));

        assert!(bind(&state).await.is_err());
    }

    #[tokio::test]
    async fn test_bind_free_port() {
        let mut config = MonolithConfig::default();
        config.server.bind_address = "127.0.0.1".to_string();
        config.server.port = 0;
        let state = AppState::new(config, EnvResolver::fixed::<_, &str, &str>([]));

        let listener = bind(&state).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[tokio::test]
    async fn test_static_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("index.html"), "<h1>monolith</h1>").unwrap();
        let state = test_state(&tmp.path().join("log"), tmp.path());

        let response = send(&state, Method::GET, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "<h1>monolith</h1>");

        let response = send(&state, Method::GET, "/missing.js").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(state.counters.read(Counter::TotalRequests), 0);
    }
}
