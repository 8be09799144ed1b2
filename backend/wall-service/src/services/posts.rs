use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{NewPost, Post, PostKind};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::WallStore;
use crate::services::FeedCache;
use crate::storage::{object_key, FileUpload, MediaStorage};

pub const EMPTY_POST_MESSAGE: &str = "Please add a file or caption";

/// User input for a new post
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub caption: Option<String>,
    pub file: Option<FileUpload>,
}

/// Post kind implied by the attached file
pub fn classify(file: Option<&FileUpload>) -> PostKind {
    match file {
        None => PostKind::Text,
        Some(f) if f.is_image() => PostKind::Photo,
        Some(_) => PostKind::Code,
    }
}

/// Creates posts, uploading any attached file to the media bucket first
#[derive(Clone)]
pub struct PostComposer {
    store: Arc<dyn WallStore>,
    storage: Arc<dyn MediaStorage>,
    cache: Option<Arc<FeedCache>>,
}

impl PostComposer {
    pub fn new(store: Arc<dyn WallStore>, storage: Arc<dyn MediaStorage>) -> Self {
        Self {
            store,
            storage,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<FeedCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn create_post(&self, author: Uuid, draft: PostDraft) -> ServiceResult<Post> {
        let caption = draft.caption.filter(|c| !c.trim().is_empty());
        if draft.file.is_none() && caption.is_none() {
            return Err(ServiceError::InvalidInput(EMPTY_POST_MESSAGE.to_string()));
        }

        let kind = classify(draft.file.as_ref());

        let (file_url, uploaded_key) = match (draft.file, kind.storage_folder()) {
            (Some(file), Some(folder)) => {
                let key = object_key(folder, author, &file, Utc::now());
                let url = self
                    .storage
                    .upload(&key, file.bytes, &file.content_type)
                    .await?;
                (Some(url), Some(key))
            }
            _ => (None, None),
        };

        let new_post = NewPost {
            user_id: author,
            kind,
            file_url,
            caption,
        };

        match self.store.insert_post(&new_post).await {
            Ok(post) => {
                if let Some(cache) = &self.cache {
                    cache.invalidate_all();
                }
                info!(post_id = %post.id, user_id = %author, kind = ?post.kind, "Post created");
                Ok(post)
            }
            Err(e) => {
                error!(user_id = %author, "Post insert failed: {:#}", e);
                if let Some(key) = uploaded_key {
                    if let Err(remove_err) = self.storage.remove(&key).await {
                        warn!(key = %key, "Failed to remove orphaned upload: {}", remove_err);
                    }
                }
                Err(ServiceError::Store(e))
            }
        }
    }
}
