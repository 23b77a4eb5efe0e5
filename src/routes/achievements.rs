//! Achievement endpoints
//!
//! ## Endpoints
//!
//! - `POST /api/v1/achievements` - Create a draft
//! - `GET /api/v1/achievements[?status=...]` - List achievements visible to the caller
//! - `GET /api/v1/achievements/{id}` - Get one achievement
//! - `PUT /api/v1/achievements/{id}` - Edit a draft
//! - `DELETE /api/v1/achievements/{id}` - Soft delete a draft
//! - `POST /api/v1/achievements/{id}/attachments` - Record attachment metadata
//! - `POST /api/v1/achievements/{id}/submit` - Submit for verification
//! - `POST /api/v1/achievements/{id}/verify` - Verify a submission
//! - `POST /api/v1/achievements/{id}/reject` - Reject with a note
//! - `GET /api/v1/achievements/{id}/history` - Workflow timeline
//!
//! Authentication and the route permission gate run in `server::http`
//! before a request reaches [`execute`].

use bytes::Bytes;
use hyper::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::{Actor, Endpoint};
use crate::services::AchievementService;
use crate::types::{
    AchievementPatch, AchievementStatus, LaurelError, NewAchievement, NewAttachment, Result,
};

pub const ACHIEVEMENTS_PREFIX: &str = "/api/v1/achievements";

/// A matched achievement route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub endpoint: Endpoint,
    pub achievement_id: Option<String>,
    /// Raw query string, without the leading `?`
    pub query: Option<String>,
}

impl Route {
    fn collection(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            achievement_id: None,
            query: None,
        }
    }

    fn item(endpoint: Endpoint, id: &str) -> Self {
        Self {
            endpoint,
            achievement_id: Some(id.to_string()),
            query: None,
        }
    }

    pub fn with_query(mut self, query: Option<&str>) -> Self {
        self.query = query.filter(|q| !q.is_empty()).map(str::to_string);
        self
    }

    fn id(&self) -> Result<&str> {
        self.achievement_id
            .as_deref()
            .ok_or_else(|| LaurelError::Validation("achievement id is required".into()))
    }
}

/// Match a path under [`ACHIEVEMENTS_PREFIX`]
pub fn match_route(method: &Method, path: &str) -> Option<Route> {
    let subpath = path.strip_prefix(ACHIEVEMENTS_PREFIX)?;
    if !subpath.is_empty() && !subpath.starts_with('/') {
        return None;
    }

    let segments: Vec<&str> = subpath.split('/').filter(|s| !s.is_empty()).collect();

    let route = match (method, segments.as_slice()) {
        (&Method::POST, []) => Route::collection(Endpoint::Create),
        (&Method::GET, []) => Route::collection(Endpoint::List),

        (&Method::GET, [id]) => Route::item(Endpoint::Get, id),
        (&Method::PUT, [id]) => Route::item(Endpoint::Update, id),
        (&Method::DELETE, [id]) => Route::item(Endpoint::Delete, id),

        (&Method::POST, [id, "attachments"]) => Route::item(Endpoint::Attach, id),
        (&Method::POST, [id, "submit"]) => Route::item(Endpoint::Submit, id),
        (&Method::POST, [id, "verify"]) => Route::item(Endpoint::Verify, id),
        (&Method::POST, [id, "reject"]) => Route::item(Endpoint::Reject, id),
        (&Method::GET, [id, "history"]) => Route::item(Endpoint::History, id),

        _ => return None,
    };

    Some(route)
}

/// Successful outcome, wrapped in the success envelope by the caller
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub message: &'static str,
    pub data: Value,
}

impl Reply {
    fn ok<T: Serialize>(message: &'static str, data: T) -> Result<Self> {
        Self::with_status(StatusCode::OK, message, data)
    }

    fn with_status<T: Serialize>(status: StatusCode, message: &'static str, data: T) -> Result<Self> {
        let data = serde_json::to_value(data)
            .map_err(|e| LaurelError::Internal(format!("response encoding failed: {}", e)))?;
        Ok(Self {
            status,
            message,
            data,
        })
    }
}

/// Query parameters of the list endpoint
#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    #[serde(default)]
    status: Option<AchievementStatus>,
}

impl ListQuery {
    fn parse(query: Option<&str>) -> Result<Self> {
        serde_urlencoded::from_str(query.unwrap_or(""))
            .map_err(|e| LaurelError::Validation(format!("invalid query parameters: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
struct RejectRequest {
    #[serde(default)]
    rejection_note: String,
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    Ok(serde_json::from_slice(body)?)
}

/// Run the lifecycle operation behind `route`
pub async fn execute(
    service: &AchievementService,
    actor: &Actor,
    route: &Route,
    body: Bytes,
) -> Result<Reply> {
    match route.endpoint {
        Endpoint::Create => {
            let payload: NewAchievement = parse_body(&body)?;
            let view = service.create(actor, payload).await?;
            Reply::with_status(StatusCode::CREATED, "Achievement created", view)
        }
        Endpoint::List => {
            let filter = ListQuery::parse(route.query.as_deref())?;
            let views = service.list(actor, filter.status).await?;
            Reply::ok("Achievements retrieved", views)
        }
        Endpoint::Get => {
            let view = service.get(actor, route.id()?).await?;
            Reply::ok("Achievement retrieved", view)
        }
        Endpoint::Update => {
            let patch: AchievementPatch = parse_body(&body)?;
            let view = service.update(actor, route.id()?, patch).await?;
            Reply::ok("Achievement updated", view)
        }
        Endpoint::Delete => {
            let id = route.id()?;
            service.delete(actor, id).await?;
            Reply::ok("Achievement deleted", serde_json::json!({ "id": id }))
        }
        Endpoint::Attach => {
            let attachment: NewAttachment = parse_body(&body)?;
            let view = service.add_attachment(actor, route.id()?, attachment).await?;
            Reply::ok("Attachment added", view)
        }
        Endpoint::Submit => {
            let view = service.submit(actor, route.id()?).await?;
            Reply::ok("Achievement submitted for verification", view)
        }
        Endpoint::Verify => {
            let view = service.verify(actor, route.id()?).await?;
            Reply::ok("Achievement verified", view)
        }
        Endpoint::Reject => {
            let request: RejectRequest = parse_body(&body)?;
            let view = service
                .reject(actor, route.id()?, &request.rejection_note)
                .await?;
            Reply::ok("Achievement rejected", view)
        }
        Endpoint::History => {
            let history = service.history(actor, route.id()?).await?;
            Reply::ok("Achievement history retrieved", history)
        }
    }
}
