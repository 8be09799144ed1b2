use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{ProfileUpdate, ProfileUpdateOutcome, UserProfile};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::WallStore;
use crate::services::FeedCache;
use crate::storage::{object_key, FileUpload, MediaStorage};

const AVATAR_FOLDER: &str = "avatars";

/// Editable profile fields
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(length(min = 1, max = 50, message = "username must be 1-50 characters"))]
    pub username: String,
    #[validate(length(max = 500, message = "bio must be at most 500 characters"))]
    pub bio: Option<String>,
}

impl ProfileForm {
    /// Trim both fields; a blank bio becomes absent
    fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            bio: self
                .bio
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty()),
        }
    }
}

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn WallStore>,
    storage: Arc<dyn MediaStorage>,
    cache: Option<Arc<FeedCache>>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn WallStore>, storage: Arc<dyn MediaStorage>) -> Self {
        Self {
            store,
            storage,
            cache: None,
        }
    }

    /// Cached feeds embed author names and avatars, so updates clear them
    pub fn with_cache(mut self, cache: Arc<FeedCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn get_profile(&self, user_id: Uuid) -> ServiceResult<UserProfile> {
        self.store
            .find_profile(user_id)
            .await
            .map_err(ServiceError::Store)?
            .ok_or_else(|| ServiceError::NotFound(format!("profile {}", user_id)))
    }

    /// Update username and bio, optionally replacing the avatar.
    ///
    /// Without a new avatar the current avatar URL is kept.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        form: ProfileForm,
        avatar: Option<FileUpload>,
    ) -> ServiceResult<UserProfile> {
        let form = form.normalized();
        form.validate()?;
        if avatar.as_ref().is_some_and(|f| !f.is_image()) {
            return Err(ServiceError::InvalidInput("avatar must be an image".into()));
        }

        let current = self.get_profile(user_id).await?;

        let (avatar_url, uploaded_key) = match avatar {
            Some(file) => {
                let key = object_key(AVATAR_FOLDER, user_id, &file, Utc::now());
                let url = self
                    .storage
                    .upload(&key, file.bytes, &file.content_type)
                    .await?;
                (Some(url), Some(key))
            }
            None => (current.avatar_url.clone(), None),
        };

        let update = ProfileUpdate {
            username: form.username,
            bio: form.bio,
            avatar_url,
        };

        let outcome = self.store.update_profile(user_id, &update).await;

        let result = match outcome {
            Ok(ProfileUpdateOutcome::Updated(profile)) => {
                if let Some(cache) = &self.cache {
                    cache.invalidate_all();
                }
                info!(%user_id, "Profile updated");
                return Ok(profile);
            }
            Ok(ProfileUpdateOutcome::NotFound) => {
                Err(ServiceError::NotFound(format!("profile {}", user_id)))
            }
            Ok(ProfileUpdateOutcome::UsernameTaken) => Err(ServiceError::Conflict(format!(
                "username '{}' is already taken",
                update.username
            ))),
            Err(e) => {
                error!(%user_id, "Profile update failed: {:#}", e);
                Err(ServiceError::Store(e))
            }
        };

        if let Some(key) = uploaded_key {
            if let Err(e) = self.storage.remove(&key).await {
                warn!(key = %key, "Failed to remove orphaned avatar: {}", e);
            }
        }

        result
    }
}
