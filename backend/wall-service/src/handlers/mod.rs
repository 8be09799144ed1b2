/// HTTP handlers for wall-service
use std::sync::Arc;

use actix_web::{web, HttpResponse};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::error::{ServiceError, ServiceResult};
use crate::repository::WallStore;
use crate::services::{
    FeedAggregator, FeedCache, InteractionService, MemberDirectory, PostComposer, ProfileService,
};
use crate::storage::{FileUpload, MediaStorage};

pub mod feed;
pub mod interactions;
pub mod members;
pub mod posts;
pub mod profile;

/// Largest decoded file accepted in a post or avatar upload
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
// base64 inflates by 4/3, plus room for the rest of the body
const JSON_LIMIT_BYTES: usize = MAX_UPLOAD_BYTES / 3 * 4 + 64 * 1024;

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn WallStore>,
    pub feed: FeedAggregator,
    pub interactions: InteractionService,
    pub members: MemberDirectory,
    pub posts: PostComposer,
    pub profiles: ProfileService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn WallStore>,
        storage: Arc<dyn MediaStorage>,
        cache: Option<Arc<FeedCache>>,
    ) -> Self {
        let mut feed = FeedAggregator::new(store.clone());
        let mut interactions = InteractionService::new(store.clone());
        let mut posts = PostComposer::new(store.clone(), storage.clone());
        let mut profiles = ProfileService::new(store.clone(), storage);
        if let Some(cache) = cache {
            feed = feed.with_cache(cache.clone());
            interactions = interactions.with_cache(cache.clone());
            posts = posts.with_cache(cache.clone());
            profiles = profiles.with_cache(cache);
        }

        Self {
            members: MemberDirectory::new(store.clone()),
            profiles,
            store,
            feed,
            interactions,
            posts,
        }
    }
}

/// Base64 file body used by post and avatar uploads
#[derive(Debug, Clone, Deserialize)]
pub struct FilePayload {
    pub file_name: String,
    pub content_type: Option<String>,
    /// Standard base64 of the file bytes
    pub data: String,
}

impl FilePayload {
    pub fn into_upload(self) -> ServiceResult<FileUpload> {
        let content_type = match self.content_type.as_deref().map(str::trim) {
            None | Some("") => mime::APPLICATION_OCTET_STREAM,
            Some(raw) => raw
                .parse::<mime::Mime>()
                .map_err(|_| ServiceError::InvalidInput(format!("invalid content type '{}'", raw)))?,
        };

        let bytes = STANDARD
            .decode(self.data.trim())
            .map_err(|e| ServiceError::InvalidInput(format!("file data is not valid base64: {}", e)))?;
        if bytes.is_empty() {
            return Err(ServiceError::InvalidInput("file is empty".into()));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ServiceError::InvalidInput(format!(
                "file exceeds {} bytes",
                MAX_UPLOAD_BYTES
            )));
        }

        let file_name = self.file_name.trim().to_string();
        if file_name.is_empty() {
            return Err(ServiceError::InvalidInput("file_name is required".into()));
        }

        Ok(FileUpload {
            file_name,
            content_type: content_type.essence_str().to_string(),
            bytes,
        })
    }
}

/// Liveness probe
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok", "service": crate::SERVICE_NAME }))
}

/// Readiness probe: the store must answer
pub async fn ready(state: web::Data<AppState>) -> HttpResponse {
    match state.store.health_check().await {
        Ok(()) => HttpResponse::Ok().json(json!({ "status": "ready" })),
        Err(e) => {
            warn!("Readiness check failed: {:#}", e);
            HttpResponse::ServiceUnavailable().json(json!({ "status": "unavailable" }))
        }
    }
}

/// Mount `/health`, `/ready`, `/metrics` and the `/api/v1` routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().limit(JSON_LIMIT_BYTES))
        .route("/health", web::get().to(health))
        .route("/ready", web::get().to(ready))
        .route("/metrics", web::get().to(crate::metrics::serve_metrics))
        .service(
            web::scope("/api/v1")
                .route("/feed", web::get().to(feed::get_feed))
                .route("/posts", web::post().to(posts::create_post))
                .route("/posts/{post_id}/like", web::post().to(interactions::toggle_like))
                .route(
                    "/posts/{post_id}/bookmark",
                    web::post().to(interactions::toggle_bookmark),
                )
                .route("/members", web::get().to(members::list_members))
                .route("/profile", web::get().to(profile::get_profile))
                .route("/profile", web::put().to(profile::update_profile)),
        );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(data: &str, content_type: Option<&str>) -> FilePayload {
        FilePayload {
            file_name: "snippet.py".to_string(),
            content_type: content_type.map(str::to_string),
            data: data.to_string(),
        }
    }

    #[test]
    fn test_payload_decodes_base64() {
        let upload = payload(&STANDARD.encode(b"print('hi')"), Some("text/x-python"))
            .into_upload()
            .unwrap();
        assert_eq!(upload.bytes, b"print('hi')");
        assert_eq!(upload.content_type, "text/x-python");
        assert_eq!(upload.file_name, "snippet.py");
    }

    #[test]
    fn test_payload_defaults_content_type() {
        let upload = payload(&STANDARD.encode(b"x"), None).into_upload().unwrap();
        assert_eq!(upload.content_type, "application/octet-stream");
    }

    #[test]
    fn test_payload_rejects_bad_input() {
        assert!(payload("!!!", None).into_upload().is_err());
        assert!(payload("", None).into_upload().is_err());
        assert!(payload(&STANDARD.encode(b"x"), Some("not a mime"))
            .into_upload()
            .is_err());
    }
}
