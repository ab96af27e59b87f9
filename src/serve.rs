//! Static and api server for the built site.
//!
//! Built on `tiny_http`; every request is handled on the main thread.
//!
//! ```text
//!   /api/*        → api::Api (JSON)
//!   /posts/*      → paths.posts     (saved captures and their images)
//!   /projects/*   → paths.projects  (project folders)
//!   anything else → paths.dist, falling back to dist/index.html
//! ```

use crate::{
    api::{API_MOUNT, Api, ApiReply},
    config::{SiteConfig, cfg},
    log,
    utils::path::safe_join,
};
use anyhow::{Context, Result, anyhow};
use std::{
    borrow::Cow,
    fs,
    io::Read,
    net::SocketAddr,
    path::Path,
    sync::Arc,
};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

/// Public path of the posts folder.
pub const POSTS_MOUNT: &str = "/posts";

/// Public path of the projects folder.
pub const PROJECTS_MOUNT: &str = "/projects";

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the server and block until Ctrl+C.
pub fn serve_site() -> Result<()> {
    let c = cfg();
    let interface: std::net::IpAddr = c.serve.interface.parse()?;
    let base_port = c.serve.port;

    let (server, addr) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    // Set up Ctrl+C handler for graceful shutdown
    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "{} at http://{}", c.base.title, addr);
    if !c.paths.dist.join("index.html").is_file() {
        log!("serve"; "no index.html in {}, only the api and content folders are served", c.paths.dist.display());
    }

    let api = Api::new(&c);
    for request in server.incoming_requests() {
        let target = format!("{} {}", request.method(), request.url());
        if let Err(e) = handle_request(request, &c, &api) {
            log!("serve"; "{target}: {e:#}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: std::net::IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map_or_else(|| "no attempt made".to_owned(), |e| e.to_string())
    ))
}

// ============================================================================
// Request Handling
// ============================================================================

/// Where a request path is served from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Route<'a> {
    Api,
    /// File under a content folder mount; no SPA fallback.
    Content { root: &'a Path, rest: String },
    /// File from `dist`, falling back to `dist/index.html`.
    Site { rest: String },
}

fn resolve_route<'a>(path: &str, config: &'a SiteConfig) -> Route<'a> {
    if mount_rest(path, API_MOUNT).is_some() {
        return Route::Api;
    }

    // Decode URL-encoded characters (e.g., %20 → space)
    let decoded = urlencoding::decode(path)
        .map(Cow::into_owned)
        .unwrap_or_default();

    let mounts = [
        (POSTS_MOUNT, config.paths.posts.as_path()),
        (PROJECTS_MOUNT, config.paths.projects.as_path()),
    ];
    for (mount, root) in mounts {
        if let Some(rest) = mount_rest(&decoded, mount) {
            return Route::Content {
                root,
                rest: rest.to_owned(),
            };
        }
    }
    Route::Site { rest: decoded }
}

/// `path` below `mount`: `/posts/a.html` → `a.html`, `/posts` → ``.
fn mount_rest<'a>(path: &'a str, mount: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(mount)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('/')
    }
}

fn handle_request(mut request: Request, config: &SiteConfig, api: &Api) -> Result<()> {
    let cors = config.serve.cors;
    let url = request.url().to_owned();
    let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));

    if *request.method() == Method::Options {
        return respond_preflight(request, cors);
    }

    match resolve_route(path, config) {
        Route::Api => {
            let body = read_body(&mut request, config.contact.max_body_bytes)?;
            let reply = api.handle(request.method(), path, query, &body);
            if reply.status >= 500 {
                log!("serve"; "{} {} -> {}", request.method(), path, reply.status);
            }
            respond_json(request, reply, cors)
        }
        Route::Content { root, rest } => match safe_join(root, &rest) {
            Some(file) if file.is_file() => serve_file(request, &file),
            _ => serve_not_found(request),
        },
        Route::Site { rest } => {
            let dist = &config.paths.dist;
            let Some(local_path) = safe_join(dist, &rest) else {
                return serve_not_found(request);
            };

            if local_path.is_file() {
                return serve_file(request, &local_path);
            }
            let index = local_path.join("index.html");
            if local_path.is_dir() && index.is_file() {
                return serve_file(request, &index);
            }

            // SPA fallback
            let spa_index = dist.join("index.html");
            if spa_index.is_file() {
                return serve_file(request, &spa_index);
            }
            serve_not_found(request)
        }
    }
}

/// Read at most `limit + 1` bytes so oversized bodies are still detectable.
fn read_body(request: &mut Request, limit: usize) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    request
        .as_reader()
        .take(limit as u64 + 1)
        .read_to_end(&mut body)
        .context("Failed to read request body")?;
    Ok(body)
}

// ============================================================================
// Response Helpers
// ============================================================================

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name, value).map_err(|()| anyhow!("invalid header {name}: {value}"))
}

fn cors_headers(cors: bool) -> Result<Vec<Header>> {
    if !cors {
        return Ok(Vec::new());
    }
    CORS_HEADERS
        .iter()
        .map(|(name, value)| header(name, value))
        .collect()
}

/// Serve a file with appropriate content type.
fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let content_type = guess_content_type(path);

    let response = Response::from_data(content).with_header(header("Content-Type", content_type)?);

    request.respond(response)?;
    Ok(())
}

fn respond_json(request: Request, reply: ApiReply, cors: bool) -> Result<()> {
    let mut response = Response::from_string(reply.body)
        .with_status_code(StatusCode(reply.status))
        .with_header(header("Content-Type", "application/json; charset=utf-8")?);
    for cors_header in cors_headers(cors)? {
        response.add_header(cors_header);
    }
    request.respond(response)?;
    Ok(())
}

/// Answer an `OPTIONS` preflight.
fn respond_preflight(request: Request, cors: bool) -> Result<()> {
    let mut response = Response::empty(StatusCode(204));
    for cors_header in cors_headers(cors)? {
        response.add_header(cors_header);
    }
    request.respond(response)?;
    Ok(())
}

/// Serve 404 Not Found response.
fn serve_not_found(request: Request) -> Result<()> {
    let response = Response::from_string("404 Not Found")
        .with_status_code(StatusCode(404))
        .with_header(header("Content-Type", "text/plain")?);
    request.respond(response)?;
    Ok(())
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
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

        // Video
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        // Documents
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",

        // Default binary
        _ => "application/octet-stream",
    }
}

// ============================================================================
// Tests
// ============================================================================
