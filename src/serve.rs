//! Development server.
//!
//! A blocking `tiny_http` loop over [`routes::route`]. Each request:
//!
//! ```text
//! request ──► method check ──► context refresh check ──► route ──► response
//!                                                           │
//!                             engines check their sources ◄─┘
//! ```
//!
//! There are no background threads and no file watcher. Posts, projects and
//! the knowledge base notice edits through their own freshness checks; the
//! context document is re-read only by the explicit check before routing.

use crate::routes::{self, Reply};
use crate::site::Site;
use std::fs;
use std::io::Cursor;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Instant;
use thiserror::Error;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use tracing::{debug, info, warn};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid interface address: {0}")]
    Interface(#[from] std::net::AddrParseError),
    #[error("failed to bind after {attempts} attempts (ports {first}-{last}): {message}")]
    Bind {
        attempts: u16,
        first: u16,
        last: u16,
        message: String,
    },
}

/// Serve the site until the process is stopped.
pub fn serve(site: &Site) -> Result<(), ServeError> {
    let interface: IpAddr = site.config().serve.interface.parse()?;
    let (server, addr) = try_bind_port(interface, site.config().serve.port, MAX_PORT_RETRIES)?;

    info!(%addr, preview = site.preview(), "serving http://{addr}");
    for shadowed in routes::shadowed_slugs(site) {
        warn!("{shadowed}");
    }

    for request in server.incoming_requests() {
        if let Err(error) = handle_request(request, site) {
            warn!(%error, "failed to send response");
        }
    }
    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr), ServeError> {
    let mut last_error = String::new();
    let mut port = base_port;
    for offset in 0..max_retries {
        port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);
        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    info!(base_port, port, "port in use, using another");
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = e.to_string(),
        }
    }
    Err(ServeError::Bind {
        attempts: max_retries,
        first: base_port,
        last: port,
        message: last_error,
    })
}

// ============================================================================
// Request Handling
// ============================================================================

/// Split a raw request URL into path and query.
pub fn split_url(url: &str) -> (&str, Option<&str>) {
    match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    }
}

fn handle_request(request: Request, site: &Site) -> std::io::Result<()> {
    let started = Instant::now();
    let method = request.method().clone();
    let url = request.url().to_string();

    if !matches!(method, Method::Get | Method::Head) {
        debug!(%method, %url, status = 405, "request");
        return request.respond(text_response(405, "405 Method Not Allowed"));
    }

    site.refresh_context();
    let (path, query) = split_url(&url);
    let reply = routes::route(site, path, query);
    let status = reply.status();

    let result = match reply {
        Reply::Html(body) => request.respond(body_response(
            200,
            body.into_bytes(),
            "text/html; charset=utf-8",
        )),
        Reply::Json(body) => request.respond(body_response(
            200,
            body.into_bytes(),
            "application/json; charset=utf-8",
        )),
        Reply::File(file) => match fs::read(&file) {
            Ok(content) => request.respond(body_response(200, content, guess_content_type(&file))),
            Err(error) => {
                warn!(file = %file.display(), %error, "failed to read static file");
                request.respond(text_response(500, "500 Internal Server Error"))
            }
        },
        Reply::NotFound => request.respond(body_response(
            404,
            routes::not_found_page(site, path).into_bytes(),
            "text/html; charset=utf-8",
        )),
        Reply::Redirect(location) => {
            let mut response = text_response(status, "");
            if let Ok(header) = Header::from_bytes("Location", location.as_bytes()) {
                response.add_header(header);
            }
            request.respond(response)
        }
        Reply::Error(message) => {
            warn!(%url, %message, "request failed");
            request.respond(text_response(500, "500 Internal Server Error"))
        }
    };

    debug!(
        %method,
        %url,
        status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    result
}

// ============================================================================
// Response Helpers
// ============================================================================

fn body_response(status: u16, content: Vec<u8>, content_type: &str) -> Response<Cursor<Vec<u8>>> {
    let mut response = Response::from_data(content).with_status_code(StatusCode(status));
    if let Ok(header) = Header::from_bytes("Content-Type", content_type) {
        response.add_header(header);
    }
    response
}

fn text_response(status: u16, text: &str) -> Response<Cursor<Vec<u8>>> {
    body_response(status, text.as_bytes().to_vec(), "text/plain; charset=utf-8")
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
pub fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        // Web content
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        // Documents
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",

        _ => "application/octet-stream",
    }
}
