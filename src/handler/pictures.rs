//! Picture endpoints
//!
//! `GET /pictures` lists the picture root, `GET /pictures/{name}` serves one file with
//! conditional request and byte range support.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::response::{self, FileMeta};
use crate::http::{self, cache, RangeParseResult};
use crate::logger;
use crate::pictures::PictureError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use percent_encoding::percent_decode_str;

/// List the regular files in the picture root as a JSON array of names
pub async fn list_pictures(state: &AppState) -> Response<Full<Bytes>> {
    match state.root.list_entries().await {
        Ok(names) => http::json_response(StatusCode::OK, &names),
        Err(e) => error_to_response(&e),
    }
}

/// Serve a single picture; `raw_name` is the still percent-encoded path tail
pub async fn get_picture(
    ctx: &RequestContext<'_>,
    state: &AppState,
    raw_name: &str,
) -> Response<Full<Bytes>> {
    let Ok(name) = percent_decode_str(raw_name).decode_utf8() else {
        return http::error_response(StatusCode::NOT_FOUND, "picture not found");
    };

    let picture = match state.root.open(&name).await {
        Ok(p) => p,
        Err(e) => return error_to_response(&e),
    };

    tracing::debug!(path = %picture.path.display(), bytes = picture.content.len(), "Serving picture");

    let etag = cache::generate_etag(&picture.content);
    let last_modified = picture.modified.map(cache::format_http_date);

    // If-Modified-Since only counts when no If-None-Match was sent
    let not_modified = if ctx.if_none_match.is_some() {
        cache::check_etag_match(ctx.if_none_match.as_deref(), &etag)
    } else {
        picture
            .modified
            .is_some_and(|m| cache::not_modified_since(ctx.if_modified_since.as_deref(), m))
    };
    if not_modified {
        return http::build_304_response(&etag, last_modified.as_deref());
    }

    let data = Bytes::from(picture.content);
    let meta = FileMeta {
        content_type: picture.content_type,
        etag: &etag,
        last_modified: last_modified.as_deref(),
        cache_max_age: state.config.http.cache_max_age,
    };

    match http::parse_range_header(ctx.range_header.as_deref(), data.len()) {
        RangeParseResult::Valid(range) => {
            response::build_partial_response(&data, range, &meta, ctx.is_head)
        }
        RangeParseResult::NotSatisfiable => http::build_416_response(data.len()),
        RangeParseResult::None => response::build_file_response(data, &meta, ctx.is_head),
    }
}

/// Map a library error to its HTTP response, logging what the client does not see
fn error_to_response(err: &PictureError) -> Response<Full<Bytes>> {
    let status = match err {
        PictureError::DirectoryNotFound { .. } => {
            logger::log_error(&err.to_string());
            StatusCode::INTERNAL_SERVER_ERROR
        }
        PictureError::NotFound { .. } => StatusCode::NOT_FOUND,
        PictureError::Forbidden { name } => {
            logger::log_traversal_blocked(name);
            StatusCode::FORBIDDEN
        }
        PictureError::Io { .. } => {
            logger::log_error(&err.to_string());
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    http::error_response(status, &err.public_message())
}
