/// Profile handlers for the signed-in viewer
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::ServiceResult;
use crate::handlers::{AppState, FilePayload};
use crate::middleware::RequiredViewer;
use crate::services::ProfileForm;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: String,
    pub bio: Option<String>,
    /// New avatar; omit to keep the current one
    pub avatar: Option<FilePayload>,
}

/// GET /api/v1/profile
pub async fn get_profile(
    state: web::Data<AppState>,
    viewer: RequiredViewer,
) -> ServiceResult<HttpResponse> {
    let profile = state.profiles.get_profile(viewer.0).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// PUT /api/v1/profile
pub async fn update_profile(
    state: web::Data<AppState>,
    viewer: RequiredViewer,
    req: web::Json<UpdateProfileRequest>,
) -> ServiceResult<HttpResponse> {
    let req = req.into_inner();
    let avatar = req.avatar.map(FilePayload::into_upload).transpose()?;
    let form = ProfileForm {
        username: req.username,
        bio: req.bio,
    };

    let profile = state
        .profiles
        .update_profile(viewer.0, form, avatar)
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}
