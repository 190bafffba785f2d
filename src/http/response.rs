//! HTTP response building module
//!
//! Builders for the responses the picture endpoints produce. Builder failures are logged
//! and degrade to an empty response instead of panicking.

use super::range::ByteRange;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Validators and headers attached to a served file
pub struct FileMeta<'a> {
    pub content_type: &'a str,
    pub etag: &'a str,
    pub last_modified: Option<&'a str>,
    pub cache_max_age: u32,
}

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return build_raw(
                StatusCode::INTERNAL_SERVER_ERROR,
                "application/json",
                Bytes::from_static(br#"{"error":"Internal server error"}"#),
            );
        }
    };

    build_raw(status, "application/json", Bytes::from(json))
}

/// Build `{"error": message}` JSON response
pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &serde_json::json!({ "error": message }))
}

/// Build 404 Not Found response for unknown routes
pub fn build_404_response() -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, "Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "application/json")
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::from_static(
            br#"{"error":"Method Not Allowed"}"#,
        )))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", "GET, HEAD, OPTIONS");

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Methods", "GET, HEAD, OPTIONS")
            .header(
                "Access-Control-Allow-Headers",
                "Range, If-None-Match, If-Modified-Since",
            )
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, last_modified: Option<&str>) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header("ETag", etag);
    if let Some(last_modified) = last_modified {
        builder = builder.header("Last-Modified", last_modified);
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("304", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: usize) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header("Content-Type", "application/json")
        .header("Content-Range", format!("bytes */{file_size}"))
        .body(Full::new(Bytes::from_static(
            br#"{"error":"Range Not Satisfiable"}"#,
        )))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 200 response carrying a whole file
pub fn build_file_response(data: Bytes, meta: &FileMeta<'_>, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    file_headers(StatusCode::OK, meta)
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 206 Partial Content response for one byte range of a file
pub fn build_partial_response(
    data: &Bytes,
    range: ByteRange,
    meta: &FileMeta<'_>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let body = if is_head {
        Bytes::new()
    } else {
        data.slice(range.start..=range.end)
    };

    file_headers(StatusCode::PARTIAL_CONTENT, meta)
        .header("Content-Length", range.content_length())
        .header("Content-Range", range.content_range(data.len()))
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("206", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

fn file_headers(status: StatusCode, meta: &FileMeta<'_>) -> hyper::http::response::Builder {
    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", meta.content_type)
        .header("Accept-Ranges", "bytes")
        .header("ETag", meta.etag)
        .header(
            "Cache-Control",
            format!("public, max-age={}", meta.cache_max_age),
        );
    if let Some(last_modified) = meta.last_modified {
        builder = builder.header("Last-Modified", last_modified);
    }
    builder
}

fn build_raw(status: StatusCode, content_type: &str, body: Bytes) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .header("Content-Length", body.len())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    fn meta() -> FileMeta<'static> {
        FileMeta {
            content_type: "image/jpeg",
            etag: "\"abc\"",
            last_modified: Some("Sun, 06 Nov 1994 08:49:37 GMT"),
            cache_max_age: 60,
        }
    }

    #[tokio::test]
    async fn test_error_response_shape() {
        let response = error_response(StatusCode::FORBIDDEN, "nope");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.headers()["Content-Type"], "application/json");

        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "nope" }));
    }

    #[tokio::test]
    async fn test_file_response_headers() {
        let response = build_file_response(Bytes::from_static(b"abcdef"), &meta(), false);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["Content-Length"], "6");
        assert_eq!(response.headers()["Cache-Control"], "public, max-age=60");
        assert_eq!(
            response.headers()["Last-Modified"],
            "Sun, 06 Nov 1994 08:49:37 GMT"
        );
        assert_eq!(body_bytes(response).await, Bytes::from_static(b"abcdef"));
    }

    #[tokio::test]
    async fn test_head_keeps_length_but_drops_body() {
        let response = build_file_response(Bytes::from_static(b"abcdef"), &meta(), true);
        assert_eq!(response.headers()["Content-Length"], "6");
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_partial_response() {
        let data = Bytes::from_static(b"abcdef");
        let response = build_partial_response(&data, ByteRange { start: 1, end: 3 }, &meta(), false);
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()["Content-Range"], "bytes 1-3/6");
        assert_eq!(response.headers()["Content-Length"], "3");
        assert_eq!(body_bytes(response).await, Bytes::from_static(b"bcd"));
    }
}
