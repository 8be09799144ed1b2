//! Shared test fixtures: an in-memory `WallStore` and `MediaStorage`.
//!
//! The store counts calls per operation, can be told to fail an operation,
//! and can hold `list_posts(PostScope::All)` until released so tests can
//! interleave concurrent loads deterministically.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use s3_utils::{StorageError, StorageResult};
use tokio::sync::Notify;
use uuid::Uuid;

use wall_service::domain::{
    AuthorStats, AuthorSummary, CreatedAtOrder, InteractionKind, NewPost, Post, PostKind,
    ProfileUpdate, ProfileUpdateOutcome, ToggleOutcome, UserProfile,
};
use wall_service::repository::{InteractionFilter, PostScope, WallStore};
use wall_service::storage::MediaStorage;

pub const LIST_POSTS: &str = "list_posts";
pub const INTERACTION_POST_IDS: &str = "interaction_post_ids";
pub const AUTHOR_SUMMARIES: &str = "author_summaries";
pub const TOGGLE_INTERACTION: &str = "toggle_interaction";
pub const INSERT_POST: &str = "insert_post";
pub const LIST_MEMBERS: &str = "list_members";
pub const AUTHOR_STATS: &str = "author_stats";
pub const FIND_PROFILE: &str = "find_profile";
pub const UPDATE_PROFILE: &str = "update_profile";

/// Fixed origin so `created_at` ordering is explicit in tests
pub fn at_minute(minute: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::minutes(minute)
}

#[derive(Default)]
struct Tables {
    users: Vec<UserProfile>,
    posts: Vec<Post>,
    likes: Vec<(Uuid, Uuid)>,
    bookmarks: Vec<(Uuid, Uuid)>,
}

impl Tables {
    fn interactions(&mut self, kind: InteractionKind) -> &mut Vec<(Uuid, Uuid)> {
        match kind {
            InteractionKind::Like => &mut self.likes,
            InteractionKind::Bookmark => &mut self.bookmarks,
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
    all_posts_gate: Mutex<Option<Arc<Notify>>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    // ---- seeding ----

    pub fn add_user(&self, username: &str) -> Uuid {
        let mut tables = self.tables.lock().unwrap();
        let id = Uuid::new_v4();
        let minute = tables.users.len() as i64;
        tables.users.push(UserProfile {
            id,
            username: username.to_string(),
            bio: None,
            avatar_url: Some(format!("https://cdn.test/avatars/{}.png", username)),
            email: None,
            linkedin_url: None,
            created_at: at_minute(minute),
        });
        id
    }

    pub fn remove_user(&self, id: Uuid) {
        self.tables.lock().unwrap().users.retain(|u| u.id != id);
    }

    pub fn add_post(&self, author: Uuid, minute: i64) -> Uuid {
        let id = Uuid::new_v4();
        self.tables.lock().unwrap().posts.push(Post {
            id,
            user_id: author,
            kind: PostKind::Text,
            file_url: None,
            caption: Some(format!("posted at minute {}", minute)),
            created_at: at_minute(minute),
        });
        id
    }

    pub fn like(&self, user: Uuid, post: Uuid) {
        self.tables.lock().unwrap().likes.push((user, post));
    }

    pub fn bookmark(&self, user: Uuid, post: Uuid) {
        self.tables.lock().unwrap().bookmarks.push((user, post));
    }

    pub fn interaction_count(&self, kind: InteractionKind) -> usize {
        self.tables.lock().unwrap().interactions(kind).len()
    }

    pub fn profile(&self, id: Uuid) -> Option<UserProfile> {
        self.tables
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.tables.lock().unwrap().posts.clone()
    }

    // ---- instrumentation ----

    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn fail_on(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    /// Make the next `list_posts(PostScope::All)` wait until the returned
    /// handle is notified
    pub fn hold_all_posts(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.all_posts_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    fn enter(&self, op: &'static str) -> Result<()> {
        *self.calls.lock().unwrap().entry(op).or_insert(0) += 1;
        if self.failing.lock().unwrap().contains(op) {
            return Err(anyhow!("injected failure in {}", op));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl WallStore for MemoryStore {
    async fn list_posts(&self, scope: &PostScope, order: CreatedAtOrder) -> Result<Vec<Post>> {
        self.enter(LIST_POSTS)?;

        if matches!(scope, PostScope::All) {
            let gate = self.all_posts_gate.lock().unwrap().take();
            if let Some(gate) = gate {
                gate.notified().await;
            }
        }

        let mut posts: Vec<Post> = self
            .tables
            .lock()
            .unwrap()
            .posts
            .iter()
            .filter(|p| match scope {
                PostScope::All => true,
                PostScope::Author(author) => p.user_id == *author,
                PostScope::Ids(ids) => ids.contains(&p.id),
            })
            .cloned()
            .collect();

        posts.sort_by(|a, b| match order {
            CreatedAtOrder::Ascending => a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)),
            CreatedAtOrder::Descending => b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)),
        });
        Ok(posts)
    }

    async fn interaction_post_ids(
        &self,
        kind: InteractionKind,
        filter: &InteractionFilter,
    ) -> Result<Vec<Uuid>> {
        self.enter(INTERACTION_POST_IDS)?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .interactions(kind)
            .iter()
            .filter(|(user, post)| filter.matches(*user, *post))
            .map(|(_, post)| *post)
            .collect())
    }

    async fn author_summaries(&self, author_ids: &[Uuid]) -> Result<Vec<AuthorSummary>> {
        self.enter(AUTHOR_SUMMARIES)?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .users
            .iter()
            .filter(|u| author_ids.contains(&u.id))
            .map(|u| AuthorSummary {
                id: u.id,
                username: u.username.clone(),
                avatar_url: u.avatar_url.clone(),
            })
            .collect())
    }

    async fn toggle_interaction(
        &self,
        kind: InteractionKind,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<ToggleOutcome> {
        self.enter(TOGGLE_INTERACTION)?;
        let mut tables = self.tables.lock().unwrap();
        if !tables.posts.iter().any(|p| p.id == post_id) {
            return Ok(ToggleOutcome::MissingPost);
        }
        if !tables.users.iter().any(|u| u.id == user_id) {
            return Ok(ToggleOutcome::MissingUser);
        }

        let rows = tables.interactions(kind);
        let before = rows.len();
        rows.retain(|row| *row != (user_id, post_id));
        if rows.len() < before {
            Ok(ToggleOutcome::Toggled(false))
        } else {
            rows.push((user_id, post_id));
            Ok(ToggleOutcome::Toggled(true))
        }
    }

    async fn insert_post(&self, post: &NewPost) -> Result<Post> {
        self.enter(INSERT_POST)?;
        let post = Post {
            id: Uuid::new_v4(),
            user_id: post.user_id,
            kind: post.kind,
            file_url: post.file_url.clone(),
            caption: post.caption.clone(),
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().posts.push(post.clone());
        Ok(post)
    }

    async fn list_members(&self) -> Result<Vec<UserProfile>> {
        self.enter(LIST_MEMBERS)?;
        let mut users = self.tables.lock().unwrap().users.clone();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn author_stats(&self, author_ids: &[Uuid]) -> Result<Vec<AuthorStats>> {
        self.enter(AUTHOR_STATS)?;
        let tables = self.tables.lock().unwrap();
        let mut stats: HashMap<Uuid, AuthorStats> = HashMap::new();

        for post in tables.posts.iter().filter(|p| author_ids.contains(&p.user_id)) {
            let entry = stats.entry(post.user_id).or_insert(AuthorStats {
                user_id: post.user_id,
                ..AuthorStats::default()
            });
            entry.posts_count += 1;
            entry.likes_received +=
                tables.likes.iter().filter(|(_, p)| *p == post.id).count() as i64;
            entry.bookmarks_received +=
                tables.bookmarks.iter().filter(|(_, p)| *p == post.id).count() as i64;
        }

        Ok(stats.into_values().collect())
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        self.enter(FIND_PROFILE)?;
        Ok(self.profile(user_id))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<ProfileUpdateOutcome> {
        self.enter(UPDATE_PROFILE)?;
        let mut tables = self.tables.lock().unwrap();

        if tables
            .users
            .iter()
            .any(|u| u.id != user_id && u.username == update.username)
        {
            return Ok(ProfileUpdateOutcome::UsernameTaken);
        }

        match tables.users.iter_mut().find(|u| u.id == user_id) {
            Some(user) => {
                user.username = update.username.clone();
                user.bio = update.bio.clone();
                user.avatar_url = update.avatar_url.clone();
                Ok(ProfileUpdateOutcome::Updated(user.clone()))
            }
            None => Ok(ProfileUpdateOutcome::NotFound),
        }
    }
}

/// Upload recorded by `MemoryStorage`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<Vec<StoredObject>>,
    removed: Mutex<Vec<String>>,
    unavailable: Mutex<bool>,
}

impl MemoryStorage {
    pub const BASE_URL: &'static str = "https://cdn.test";

    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().unwrap().clone()
    }

    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }
}

#[async_trait::async_trait]
impl MediaStorage for MemoryStorage {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        if *self.unavailable.lock().unwrap() {
            return Err(StorageError::Upload {
                key: key.to_string(),
                message: "bucket offline".to_string(),
            });
        }
        self.objects.lock().unwrap().push(StoredObject {
            key: key.to_string(),
            content_type: content_type.to_string(),
            size: bytes.len(),
        });
        Ok(format!("{}/{}", Self::BASE_URL, key))
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.removed.lock().unwrap().push(key.to_string());
        Ok(())
    }
}
