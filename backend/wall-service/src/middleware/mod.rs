/// Request extractors for wall-service
///
/// The viewer is resolved upstream by the session layer and forwarded in
/// the `x-user-id` header. These extractors are the only place that header
/// is read.
use actix_web::{FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use uuid::Uuid;

use crate::error::ServiceError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Viewer identity, absent for anonymous requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer(pub Option<Uuid>);

/// Viewer identity for endpoints that require a signed-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredViewer(pub Uuid);

fn viewer_from_headers(req: &HttpRequest) -> Result<Option<Uuid>, ServiceError> {
    let Some(value) = req.headers().get(USER_ID_HEADER) else {
        return Ok(None);
    };

    let raw = value
        .to_str()
        .map_err(|_| ServiceError::Unauthorized("malformed user id header".into()))?
        .trim();
    if raw.is_empty() {
        return Ok(None);
    }

    Uuid::parse_str(raw)
        .map(Some)
        .map_err(|_| ServiceError::Unauthorized("malformed user id header".into()))
}

impl FromRequest for Viewer {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(viewer_from_headers(req).map(Viewer))
    }
}

impl FromRequest for RequiredViewer {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(viewer_from_headers(req).and_then(|viewer| {
            viewer
                .map(RequiredViewer)
                .ok_or_else(|| ServiceError::Unauthorized("sign in required".into()))
        }))
    }
}
