//! Response envelopes
//!
//! Success: `{message, data}`. Error: `{code, message, error}`.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::error;

use crate::types::LaurelError;

pub type FullBody = Full<Bytes>;

#[derive(Debug, Serialize)]
pub struct SuccessEnvelope<'a, T: Serialize> {
    pub message: &'a str,
    pub data: T,
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<FullBody> {
    let json = serde_json::to_vec(body).unwrap_or_else(|e| {
        error!("Failed to serialize response body: {}", e);
        b"{}".to_vec()
    });

    let mut response = Response::new(Full::new(Bytes::from(json)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

pub fn success_response<T: Serialize>(
    status: StatusCode,
    message: &str,
    data: T,
) -> Response<FullBody> {
    json_response(status, &SuccessEnvelope { message, data })
}

/// Error envelope. The internal detail of `err` never reaches the body.
pub fn error_response(err: &LaurelError) -> Response<FullBody> {
    json_response(err.status_code(), &err.to_envelope())
}

pub fn not_found_response(path: &str) -> Response<FullBody> {
    json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({
            "code": 404,
            "message": "Not Found",
            "error": format!("no route for {}", path),
        }),
    )
}
