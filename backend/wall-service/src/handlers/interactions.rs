/// Like and bookmark toggle handlers
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::ServiceResult;
use crate::handlers::AppState;
use crate::middleware::RequiredViewer;

/// POST /api/v1/posts/{post_id}/like
pub async fn toggle_like(
    state: web::Data<AppState>,
    viewer: RequiredViewer,
    path: web::Path<Uuid>,
) -> ServiceResult<HttpResponse> {
    let result = state
        .interactions
        .toggle_like(path.into_inner(), viewer.0)
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

/// POST /api/v1/posts/{post_id}/bookmark
pub async fn toggle_bookmark(
    state: web::Data<AppState>,
    viewer: RequiredViewer,
    path: web::Path<Uuid>,
) -> ServiceResult<HttpResponse> {
    let result = state
        .interactions
        .toggle_bookmark(path.into_inner(), viewer.0)
        .await?;
    Ok(HttpResponse::Ok().json(result))
}
