//! HTTP server
//!
//! Accept loop plus the request pipeline every achievement call goes through:
//!
//! 1. bearer token extraction
//! 2. revocation check
//! 3. signature and expiry verification
//! 4. role parse (an unknown role is refused here)
//! 5. route permission gate, from the directory's current grants
//! 6. the lifecycle operation, bounded by the request timeout
//!
//! The permission gate only answers whether the caller's role may ever use the
//! endpoint. Whether the caller may act on a given achievement is decided
//! later by the lifecycle manager.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::{BodyExt, Limited};
use hyper::body::Incoming;
use hyper::header::AUTHORIZATION;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{HeaderMap, Method, Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::auth::permissions::endpoint_description;
use crate::auth::{
    extract_token_from_header, is_endpoint_allowed, Actor, Claims, DenyReason, JwtValidator,
    RevocationList, Role,
};
use crate::config::Args;
use crate::directory::Directory;
use crate::routes::{
    error_response, execute, handle_logout, health_check, match_route, not_found_response,
    success_response, FullBody, Reply, Route, LOGOUT_PATH,
};
use crate::services::AchievementService;
use crate::types::{LaurelError, Result};

/// Largest request body accepted
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub service: AchievementService,
    pub jwt: JwtValidator,
    pub revocations: Arc<RevocationList>,
    pub directory: Arc<dyn Directory>,
    pub started_at: Instant,
    /// Name of the content store backend, reported by `/health`
    pub content_backend: &'static str,
}

impl AppState {
    pub fn new(
        args: Args,
        service: AchievementService,
        jwt: JwtValidator,
        directory: Arc<dyn Directory>,
        content_backend: &'static str,
    ) -> Self {
        Self {
            args,
            service,
            jwt,
            revocations: Arc::new(RevocationList::new()),
            directory,
            started_at: Instant::now(),
            content_backend,
        }
    }
}

/// Run the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Laurel listening on {}", state.args.listen);

    if state.args.dev_mode {
        warn!("Development mode enabled - dev JWT secret may be in use");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<FullBody>, Infallible> {
    let (parts, body) = req.into_parts();
    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());
    debug!("{} {} from {}", parts.method, target, addr);

    let body = match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("Unreadable request body from {}: {}", addr, e);
            let err = LaurelError::Validation("request body unreadable or too large".into());
            return Ok(error_response(&err));
        }
    };

    Ok(dispatch(&state, &parts.method, &target, &parts.headers, body).await)
}

/// Route one request. `target` is the path with its optional query string.
/// Separated from the connection handling so the whole pipeline can be
/// driven without a socket.
pub async fn dispatch(
    state: &AppState,
    method: &Method,
    target: &str,
    headers: &HeaderMap,
    body: Bytes,
) -> Response<FullBody> {
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };

    match (method, path) {
        (&Method::GET, "/health") => health_check(state),

        (&Method::POST, LOGOUT_PATH) => match authenticate(state, headers) {
            Ok((token, claims)) => handle_logout(&state.revocations, &token, &claims),
            Err(e) => error_response(&e),
        },

        _ => match match_route(method, path).map(|route| route.with_query(query)) {
            Some(route) => match serve_achievement(state, headers, &route, body).await {
                Ok(reply) => success_response(reply.status, reply.message, reply.data),
                Err(e) => {
                    if e.status_code().is_server_error() {
                        error!("{} {} failed: {}", method, path, e);
                    } else {
                        debug!("{} {} refused: {}", method, path, e);
                    }
                    error_response(&e)
                }
            },
            None => not_found_response(path),
        },
    }
}

async fn serve_achievement(
    state: &AppState,
    headers: &HeaderMap,
    route: &Route,
    body: Bytes,
) -> Result<Reply> {
    let (_, claims) = authenticate(state, headers)?;
    let actor = actor_from_claims(&claims)?;

    let timeout = state.args.request_timeout();
    let work = async {
        let granted = state
            .directory
            .current_role_permissions(&actor.user_id)
            .await?;
        if !is_endpoint_allowed(route.endpoint, &granted) {
            warn!(
                "Route gate refused {} for {} ({})",
                endpoint_description(route.endpoint),
                actor.user_id,
                actor.role
            );
            return Err(LaurelError::Forbidden(DenyReason::AccessDenied));
        }

        execute(&state.service, &actor, route, body).await
    };

    // Dropping the future on timeout abandons any in-flight store call
    match tokio::time::timeout(timeout, work).await {
        Ok(result) => result,
        Err(_) => Err(LaurelError::Timeout(format!(
            "{} exceeded {:?}",
            endpoint_description(route.endpoint),
            timeout
        ))),
    }
}

/// Verify the bearer token. Returns the raw token with its claims.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<(String, Claims)> {
    let auth_header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let token = extract_token_from_header(auth_header)
        .ok_or_else(|| LaurelError::Unauthorized("no token provided".into()))?;

    if state.revocations.is_revoked(token) {
        return Err(LaurelError::Unauthorized("token revoked".into()));
    }

    let result = state.jwt.verify_token(token);
    match result.claims {
        Some(claims) if result.valid => Ok((token.to_string(), claims)),
        _ => Err(LaurelError::Unauthorized(
            result.error.unwrap_or_else(|| "invalid token".into()),
        )),
    }
}

fn actor_from_claims(claims: &Claims) -> Result<Actor> {
    match claims.role.parse::<Role>() {
        Ok(role) => Ok(Actor::new(claims.user_id.clone(), role)),
        Err(e) => {
            warn!("Refusing user {}: {}", claims.user_id, e);
            Err(LaurelError::Forbidden(DenyReason::UnknownRole))
        }
    }
}
