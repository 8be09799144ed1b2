use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a post carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "post_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Photo,
    Code,
    Text,
}

impl PostKind {
    /// Bucket folder for uploaded files of this kind
    pub fn storage_folder(&self) -> Option<&'static str> {
        match self {
            PostKind::Photo => Some("photos"),
            PostKind::Code => Some("code"),
            PostKind::Text => None,
        }
    }
}

/// Post entity. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: PostKind,
    pub file_url: Option<String>,
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row to insert for a new post
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub user_id: Uuid,
    pub kind: PostKind,
    pub file_url: Option<String>,
    pub caption: Option<String>,
}

/// The two interaction tables share one shape: (user, post, created_at)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Like,
    Bookmark,
}

impl InteractionKind {
    pub fn table(&self) -> &'static str {
        match self {
            InteractionKind::Like => "likes",
            InteractionKind::Bookmark => "bookmarks",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Like => "like",
            InteractionKind::Bookmark => "bookmark",
        }
    }
}

/// Result of a toggle: whether the viewer's interaction now exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionState {
    pub post_id: Uuid,
    pub kind: InteractionKind,
    pub active: bool,
}

/// Author projection attached to every feed post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
}

impl AuthorSummary {
    pub const UNKNOWN_USERNAME: &'static str = "Unknown";

    /// Placeholder for a post whose author row is gone
    pub fn unknown(id: Uuid) -> Self {
        Self {
            id,
            username: Self::UNKNOWN_USERNAME.to_string(),
            avatar_url: None,
        }
    }
}

/// Post merged with its author, counts and the viewer's flags for one render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedPost {
    #[serde(flatten)]
    pub post: Post,
    pub author: AuthorSummary,
    pub like_count: u64,
    pub bookmark_count: u64,
    pub viewer_liked: bool,
    pub viewer_bookmarked: bool,
}

/// Public user projection (never carries the password hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    pub linkedin_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Engagement received by one author, summed over their posts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthorStats {
    #[serde(skip)]
    pub user_id: Uuid,
    pub posts_count: i64,
    pub likes_received: i64,
    pub bookmarks_received: i64,
}

/// Member directory entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(flatten)]
    pub stats: AuthorStats,
}

/// Column values written by a profile update
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub username: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// Outcome of a profile update at the store
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileUpdateOutcome {
    Updated(UserProfile),
    NotFound,
    UsernameTaken,
}

/// Outcome of a like/bookmark toggle at the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Whether the interaction exists after the toggle
    Toggled(bool),
    /// The post id matched no post
    MissingPost,
    /// The acting user id matched no user
    MissingUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_author_placeholder() {
        let id = Uuid::new_v4();
        let author = AuthorSummary::unknown(id);
        assert_eq!(author.id, id);
        assert_eq!(author.username, "Unknown");
        assert_eq!(author.avatar_url, None);
    }

    #[test]
    fn test_storage_folders() {
        assert_eq!(PostKind::Photo.storage_folder(), Some("photos"));
        assert_eq!(PostKind::Code.storage_folder(), Some("code"));
        assert_eq!(PostKind::Text.storage_folder(), None);
    }

    #[test]
    fn test_annotated_post_serializes_flat() {
        let post = Post {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            kind: PostKind::Text,
            file_url: None,
            caption: Some("hello".to_string()),
            created_at: Utc::now(),
        };
        let annotated = AnnotatedPost {
            author: AuthorSummary::unknown(post.user_id),
            post,
            like_count: 3,
            bookmark_count: 1,
            viewer_liked: true,
            viewer_bookmarked: false,
        };

        let json = serde_json::to_value(&annotated).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["caption"], "hello");
        assert_eq!(json["like_count"], 3);
        assert_eq!(json["author"]["username"], "Unknown");
    }
}
