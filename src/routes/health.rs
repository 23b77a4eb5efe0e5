//! Liveness probe
//!
//! `GET /health` answers 200 while the process is serving. It does not touch
//! either store.

use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::routes::response::{json_response, FullBody};
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    /// `production` or `development`
    pub mode: &'static str,
    /// Which content store backs this process
    pub content_store: &'static str,
}

pub fn health_check(state: &AppState) -> Response<FullBody> {
    let body = HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        content_store: state.content_backend,
    };
    json_response(StatusCode::OK, &body)
}
