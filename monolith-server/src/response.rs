//! Response builders shared by handlers and the static file server

use bytes::Bytes;
use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::convert::Infallible;
use tracing::error;

pub type HttpResponse = Response<BoxBody<Bytes, Infallible>>;

/// Create a full body
pub fn full_body(data: impl Into<Bytes>) -> BoxBody<Bytes, Infallible> {
    Full::new(data.into()).map_err(|never| match never {}).boxed()
}

pub fn with_content_type(
    status: StatusCode,
    content_type: &'static str,
    data: impl Into<Bytes>,
) -> HttpResponse {
    let mut response = Response::new(full_body(data));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

pub fn text(status: StatusCode, body: impl Into<String>) -> HttpResponse {
    with_content_type(status, "text/plain; charset=utf-8", body.into())
}

/// Serialize `value` as JSON; encoding failure becomes a 500
pub fn json<T: Serialize>(value: &T) -> HttpResponse {
    match serde_json::to_vec(value) {
        Ok(body) => with_content_type(StatusCode::OK, "application/json", body),
        Err(e) => {
            error!("Failed to encode JSON response: {}", e);
            text(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Create an HTML error page
pub fn error_page(status: StatusCode) -> HttpResponse {
    let reason = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{code} {reason}</title></head>
<body>
    <h1>{code} {reason}</h1>
    <hr>
    <p>Monolith Server</p>
</body>
</html>"#,
        code = status.as_u16(),
        reason = reason,
    );
    with_content_type(status, "text/html", body)
}

/// 405 with the methods the resource does accept
pub fn method_not_allowed(allow: &'static str) -> HttpResponse {
    let mut response = text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static(allow));
    response
}
