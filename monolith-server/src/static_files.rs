//! Static file serving for the web front end

use hyper::StatusCode;
use monolith_common::StaticFileConfig;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

use crate::response::{self, HttpResponse};

/// Serve `path` from the first mount whose prefix matches, or 404
pub async fn serve(mounts: &[StaticFileConfig], path: &str) -> HttpResponse {
    for mount in mounts {
        let Some(relative) = strip_mount(&mount.path, path) else {
            continue;
        };
        let Some(target) = resolve(&mount.root, relative) else {
            return response::error_page(StatusCode::NOT_FOUND);
        };

        if target.is_dir() {
            let index = target.join(&mount.index);
            if index.is_file() {
                return send_file(&index).await;
            }
            if mount.directory_listing {
                let listing = directory_listing(&target, path).await;
                return response::with_content_type(StatusCode::OK, "text/html", listing);
            }
        } else if target.is_file() {
            return send_file(&target).await;
        }
    }

    response::error_page(StatusCode::NOT_FOUND)
}

/// Part of `path` below the mount prefix, if the mount covers it
fn strip_mount<'a>(prefix: &str, path: &'a str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix.trim_end_matches('/'))?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest.trim_start_matches('/'))
    } else {
        None
    }
}

/// Join `relative` onto `root`, refusing anything that climbs out of it
fn resolve(root: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    if relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        Some(root.join(relative))
    } else {
        None
    }
}

async fn send_file(path: &Path) -> HttpResponse {
    match tokio::fs::read(path).await {
        Ok(contents) => {
            response::with_content_type(StatusCode::OK, guess_content_type(path), contents)
        }
        Err(e) => {
            warn!("Failed to read file {}: {}", path.display(), e);
            response::error_page(StatusCode::NOT_FOUND)
        }
    }
}

/// Guess content type from file extension
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}

async fn directory_listing(dir: &Path, url_path: &str) -> String {
    let mut entries = Vec::new();

    if let Ok(mut read_dir) = tokio::fs::read_dir(dir).await {
        while let Ok(Some(entry)) = read_dir.next_entry().await {
            if let Ok(name) = entry.file_name().into_string() {
                let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
                entries.push((name, is_dir));
            }
        }
    }

    // directories first, then by name
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let base = if url_path.ends_with('/') {
        url_path.to_string()
    } else {
        format!("{}/", url_path)
    };

    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Index of {base}</title></head>\n<body>\n<h1>Index of {base}</h1>\n<ul>\n"
    );
    for (name, is_dir) in entries {
        let suffix = if is_dir { "/" } else { "" };
        html.push_str(&format!(
            "<li><a href=\"{base}{name}{suffix}\">{name}{suffix}</a></li>\n"
        ));
    }
    html.push_str("</ul>\n</body>\n</html>\n");
    html
}
