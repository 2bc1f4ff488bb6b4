//! Outbound response assembly.
//!
//! Pure composition of status, sanitized headers and the final body; no
//! transformation happens here. Buffered bodies get their `Content-Length`
//! from the server, streamed ones go out chunked.

use axum::{
    body::Body,
    http::{HeaderMap, StatusCode},
    response::Response,
};

/// Package the pipeline result into the response sent to the caller.
pub fn assemble(status: StatusCode, headers: HeaderMap, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
