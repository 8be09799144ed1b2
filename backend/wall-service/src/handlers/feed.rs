/// Feed handler
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{AnnotatedPost, FeedFilter, FeedRequest, SortMode};
use crate::error::ServiceResult;
use crate::handlers::AppState;
use crate::middleware::Viewer;

#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    /// all | liked | bookmarked | user
    #[serde(default)]
    pub filter: Option<String>,
    /// recent | oldest | likes
    #[serde(default)]
    pub sort: Option<String>,
    /// Required with `filter=user`
    pub author_id: Option<Uuid>,
}

impl FeedQuery {
    pub fn to_request(&self, viewer: Option<Uuid>) -> ServiceResult<FeedRequest> {
        let filter = FeedFilter::from_parts(self.filter.as_deref().unwrap_or(""), self.author_id)?;
        let sort = self.sort.as_deref().unwrap_or("").parse::<SortMode>()?;
        Ok(FeedRequest::new(filter, sort, viewer))
    }
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub filter: &'static str,
    pub sort: &'static str,
    pub count: usize,
    pub posts: Vec<AnnotatedPost>,
}

/// GET /api/v1/feed
pub async fn get_feed(
    state: web::Data<AppState>,
    viewer: Viewer,
    query: web::Query<FeedQuery>,
) -> ServiceResult<HttpResponse> {
    let request = query.to_request(viewer.0)?;
    let posts = state.feed.load_feed(&request).await?;

    Ok(HttpResponse::Ok().json(FeedResponse {
        filter: request.filter.label(),
        sort: request.sort.label(),
        count: posts.len(),
        posts,
    }))
}
