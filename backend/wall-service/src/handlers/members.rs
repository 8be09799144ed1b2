use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::ServiceResult;
use crate::handlers::AppState;

/// GET /api/v1/members
pub async fn list_members(state: web::Data<AppState>) -> ServiceResult<HttpResponse> {
    let members = state.members.list_members().await?;
    Ok(HttpResponse::Ok().json(json!({
        "count": members.len(),
        "members": members,
    })))
}
