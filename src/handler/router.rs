//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: route lookup, dispatch, common headers and
//! access logging.

use crate::config::AppState;
use crate::handler::pictures;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::{Endpoint, RouteLookup};
use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, SERVER};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request headers the picture endpoints care about
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub range_header: Option<String>,
}

impl<'a> RequestContext<'a> {
    fn from_parts(parts: &'a Parts) -> Self {
        Self {
            path: parts.uri.path(),
            is_head: parts.method == Method::HEAD,
            if_none_match: header_string(parts, "if-none-match"),
            if_modified_since: header_string(parts, "if-modified-since"),
            range_header: header_string(parts, "range"),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _body) = req.into_parts();
    let ctx = RequestContext::from_parts(&parts);

    let mut response = route_request(&parts.method, &ctx, &state).await;
    apply_common_headers(&mut response, &state);
    if ctx.is_head {
        // Content-Length stays as computed for the GET body
        *response.body_mut() = Full::new(Bytes::new());
    }

    if state.access_log() {
        log_access(&parts, &response, remote_addr, started, &state);
    }

    Ok(response)
}

/// Route request through the route table
async fn route_request(
    method: &Method,
    ctx: &RequestContext<'_>,
    state: &AppState,
) -> Response<Full<Bytes>> {
    if method == Method::OPTIONS {
        return http::build_options_response(state.config.http.enable_cors);
    }

    match state.routes.lookup(method, ctx.path) {
        RouteLookup::Matched {
            endpoint: Endpoint::ListPictures,
            ..
        } => pictures::list_pictures(state).await,
        RouteLookup::Matched {
            endpoint: Endpoint::GetPicture,
            param,
        } => pictures::get_picture(ctx, state, param).await,
        RouteLookup::MethodNotAllowed => {
            logger::log_warning(&format!("Method not allowed: {method} {}", ctx.path));
            http::build_405_response()
        }
        RouteLookup::NotFound => http::build_404_response(),
    }
}

fn apply_common_headers(response: &mut Response<Full<Bytes>>, state: &AppState) {
    let headers = response.headers_mut();
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        headers.insert(SERVER, server);
    }
    if state.config.http.enable_cors {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }
}

fn log_access(
    req: &Parts,
    response: &Response<Full<Bytes>>,
    remote_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method.to_string(),
        req.uri.path().to_string(),
    );
    entry.query = req.uri.query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version)
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header_string(req, "referer");
    entry.user_agent = header_string(req, "user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

fn header_string(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::pictures::PictureRoot;
    use http_body_util::BodyExt;
    use hyper::StatusCode;
    use std::fs;
    use tempfile::TempDir;

    const CAT: [u8; 3] = [0xFF, 0xD8, 0xFF];
    const SECRET: &[u8] = b"TOP-SECRET-BYTES";

    /// `<tmp>/app_secret.txt`, `<tmp>/pictures/{cat.jpg, my cat.png, thumbs/small.png}`
    fn test_state() -> (TempDir, Arc<AppState>) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app_secret.txt"), SECRET).unwrap();

        let pictures = dir.path().join("pictures");
        fs::create_dir_all(pictures.join("thumbs")).unwrap();
        fs::write(pictures.join("cat.jpg"), CAT).unwrap();
        fs::write(pictures.join("my cat.png"), b"png").unwrap();
        fs::write(pictures.join("thumbs").join("small.png"), b"small").unwrap();

        let state = state_for(&dir, PictureRoot::new(pictures));
        (dir, state)
    }

    fn state_for(dir: &TempDir, root: PictureRoot) -> Arc<AppState> {
        let mut config = Config::load_from(&dir.path().join("absent").to_string_lossy()).unwrap();
        config.logging.access_log = false;
        Arc::new(AppState::new(config, root))
    }

    async fn send(state: &Arc<AppState>, req: Request<()>) -> Response<Full<Bytes>> {
        let peer: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        handle_request(req, Arc::clone(state), peer).await.unwrap()
    }

    async fn get(state: &Arc<AppState>, uri: &str) -> Response<Full<Bytes>> {
        send(state, Request::get(uri).body(()).unwrap()).await
    }

    async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_list_pictures() {
        let (_dir, state) = test_state();

        let response = get(&state, "/pictures").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(
            body_json(response).await,
            serde_json::json!(["cat.jpg", "my cat.png"])
        );
    }

    #[tokio::test]
    async fn test_list_with_trailing_slash() {
        let (_dir, state) = test_state();

        let response = get(&state, "/pictures/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!(["cat.jpg", "my cat.png"])
        );
    }

    #[tokio::test]
    async fn test_list_missing_directory() {
        let dir = TempDir::new().unwrap();
        let state = state_for(&dir, PictureRoot::new(dir.path().join("pictures")));

        let response = get(&state, "/pictures").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("Pictures directory not found"));
    }

    #[tokio::test]
    async fn test_get_picture() {
        let (_dir, state) = test_state();

        let response = get(&state, "/pictures/cat.jpg").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/jpeg");
        assert_eq!(response.headers()["content-length"], "3");
        assert!(response.headers().contains_key("etag"));
        assert!(response.headers().contains_key("last-modified"));
        assert_eq!(response.headers()["server"], "picture-server");
        assert_eq!(body_bytes(response).await, Bytes::from_static(&CAT));
    }

    #[tokio::test]
    async fn test_get_percent_encoded_and_nested_names() {
        let (_dir, state) = test_state();

        let response = get(&state, "/pictures/my%20cat.png").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, Bytes::from_static(b"png"));

        let response = get(&state, "/pictures/thumbs/small.png").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, Bytes::from_static(b"small"));
    }

    #[tokio::test]
    async fn test_get_missing_picture() {
        let (_dir, state) = test_state();

        let response = get(&state, "/pictures/missing.png").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "picture not found: missing.png" })
        );
    }

    #[tokio::test]
    async fn test_traversal_is_forbidden() {
        let (_dir, state) = test_state();

        for uri in [
            "/pictures/../app_secret.txt",
            "/pictures/..%2fapp_secret.txt",
            "/pictures/%2e%2e/app_secret.txt",
            "/pictures/thumbs/../../app_secret.txt",
        ] {
            let response = get(&state, uri).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
            let body = body_bytes(response).await;
            assert!(!body.windows(SECRET.len()).any(|w| w == SECRET), "{uri}");
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert!(json["error"].as_str().unwrap().contains("forbidden"), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_invalid_utf8_name_is_not_found() {
        let (_dir, state) = test_state();

        let response = get(&state, "/pictures/%FF.jpg").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_head_has_headers_but_no_body() {
        let (_dir, state) = test_state();

        let req = Request::head("/pictures/cat.jpg").body(()).unwrap();
        let response = send(&state, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-length"], "3");
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_head_on_listing_has_no_body() {
        let (_dir, state) = test_state();

        let listing = get(&state, "/pictures").await;
        let get_length = listing.headers()["content-length"].clone();

        let req = Request::head("/pictures").body(()).unwrap();
        let response = send(&state, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(response.headers()["content-length"], get_length);
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_etag_revalidation() {
        let (_dir, state) = test_state();

        let response = get(&state, "/pictures/cat.jpg").await;
        let etag = response.headers()["etag"].clone();

        let req = Request::get("/pictures/cat.jpg")
            .header("If-None-Match", etag)
            .body(())
            .unwrap();
        let response = send(&state, req).await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_if_modified_since_revalidation() {
        let (_dir, state) = test_state();

        let response = get(&state, "/pictures/cat.jpg").await;
        let last_modified = response.headers()["last-modified"].clone();

        let req = Request::get("/pictures/cat.jpg")
            .header("If-Modified-Since", last_modified)
            .body(())
            .unwrap();
        assert_eq!(send(&state, req).await.status(), StatusCode::NOT_MODIFIED);

        let req = Request::get("/pictures/cat.jpg")
            .header("If-Modified-Since", "Sun, 06 Nov 1994 08:49:37 GMT")
            .body(())
            .unwrap();
        assert_eq!(send(&state, req).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_range_requests() {
        let (_dir, state) = test_state();

        let req = Request::get("/pictures/cat.jpg")
            .header("Range", "bytes=1-")
            .body(())
            .unwrap();
        let response = send(&state, req).await;
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()["content-range"], "bytes 1-2/3");
        assert_eq!(body_bytes(response).await, Bytes::from_static(&CAT[1..]));

        let req = Request::get("/pictures/cat.jpg")
            .header("Range", "bytes=10-")
            .body(())
            .unwrap();
        let response = send(&state, req).await;
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()["content-range"], "bytes */3");
    }

    #[tokio::test]
    async fn test_method_handling() {
        let (_dir, state) = test_state();

        let req = Request::delete("/pictures/cat.jpg").body(()).unwrap();
        let response = send(&state, req).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["allow"], "GET, HEAD, OPTIONS");

        let req = Request::options("/pictures").body(()).unwrap();
        let response = send(&state, req).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(!response
            .headers()
            .contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn test_cors_headers_when_enabled() {
        let (dir, _) = test_state();
        let mut config = Config::load_from(&dir.path().join("absent").to_string_lossy()).unwrap();
        config.http.enable_cors = true;
        config.logging.access_log = false;
        let state = Arc::new(AppState::new(
            config,
            PictureRoot::new(dir.path().join("pictures")),
        ));

        let response = get(&state, "/pictures").await;
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (_dir, state) = test_state();

        let response = get(&state, "/").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Not Found" })
        );
    }
}
