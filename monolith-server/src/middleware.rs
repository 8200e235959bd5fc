//! Per-request context and access logging

use hyper::header::USER_AGENT;
use hyper::{Method, Request};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Instant;
use tracing::{info, info_span, Instrument};

use crate::response::HttpResponse;

/// What handlers need to know about the request being served
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub remote_addr: SocketAddr,
    /// Empty when the client sent none
    pub user_agent: String,
}

impl RequestContext {
    pub fn from_request<B>(req: &Request<B>, remote_addr: SocketAddr) -> Self {
        let user_agent = req
            .headers()
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            remote_addr,
            user_agent,
        }
    }
}

/// Run `handler` inside a request span, logging its start and completion.
///
/// The response passes through untouched.
pub async fn log_request<F>(ctx: &RequestContext, handler: F) -> HttpResponse
where
    F: Future<Output = HttpResponse>,
{
    let span = info_span!(
        "request",
        method = %ctx.method,
        path = %ctx.path,
        remote = %ctx.remote_addr,
    );

    async move {
        let start = Instant::now();
        info!(user_agent = %ctx.user_agent, "request started");

        let response = handler.await;

        info!(
            status = response.status().as_u16(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "request completed"
        );
        response
    }
    .instrument(span)
    .await
}
