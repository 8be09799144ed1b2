/// Post creation handler
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::ServiceResult;
use crate::handlers::{AppState, FilePayload};
use crate::middleware::RequiredViewer;
use crate::services::PostDraft;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub caption: Option<String>,
    pub file: Option<FilePayload>,
}

/// POST /api/v1/posts
pub async fn create_post(
    state: web::Data<AppState>,
    viewer: RequiredViewer,
    req: web::Json<CreatePostRequest>,
) -> ServiceResult<HttpResponse> {
    let req = req.into_inner();
    let draft = PostDraft {
        caption: req.caption,
        file: req.file.map(FilePayload::into_upload).transpose()?,
    };

    let post = state.posts.create_post(viewer.0, draft).await?;
    Ok(HttpResponse::Created().json(post))
}
