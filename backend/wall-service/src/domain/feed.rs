//! Feed request vocabulary: which posts, in which order, for whom.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::InteractionKind;

/// Which posts make up the candidate set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", content = "author_id", rename_all = "snake_case")]
pub enum FeedFilter {
    All,
    LikedByViewer,
    BookmarkedByViewer,
    ByAuthor(Uuid),
}

impl FeedFilter {
    /// Build a filter from the query-string mode (`all`, `liked`,
    /// `bookmarked`, `user`) and an optional author id.
    pub fn from_parts(mode: &str, author_id: Option<Uuid>) -> Result<Self, FeedParamError> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(FeedFilter::All),
            "liked" => Ok(FeedFilter::LikedByViewer),
            "bookmarked" => Ok(FeedFilter::BookmarkedByViewer),
            "user" | "author" => author_id
                .map(FeedFilter::ByAuthor)
                .ok_or(FeedParamError::MissingAuthor),
            other => Err(FeedParamError::UnknownFilter(other.to_string())),
        }
    }

    /// Interaction table whose viewer rows bound the candidate set
    pub fn interaction_kind(&self) -> Option<InteractionKind> {
        match self {
            FeedFilter::LikedByViewer => Some(InteractionKind::Like),
            FeedFilter::BookmarkedByViewer => Some(InteractionKind::Bookmark),
            FeedFilter::All | FeedFilter::ByAuthor(_) => None,
        }
    }

    /// Short label used for metrics and logs
    pub fn label(&self) -> &'static str {
        match self {
            FeedFilter::All => "all",
            FeedFilter::LikedByViewer => "liked",
            FeedFilter::BookmarkedByViewer => "bookmarked",
            FeedFilter::ByAuthor(_) => "user",
        }
    }
}

impl Default for FeedFilter {
    fn default() -> Self {
        FeedFilter::All
    }
}

/// Ordering the store can apply at fetch time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreatedAtOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    MostRecent,
    Oldest,
    MostLiked,
}

impl SortMode {
    /// Order requested from the store.
    ///
    /// `MostLiked` depends on counts computed after the fetch; its base
    /// order is newest first so ties come out newest first after the
    /// stable sort.
    pub fn fetch_order(&self) -> CreatedAtOrder {
        match self {
            SortMode::Oldest => CreatedAtOrder::Ascending,
            SortMode::MostRecent | SortMode::MostLiked => CreatedAtOrder::Descending,
        }
    }

    pub fn sorts_by_likes(&self) -> bool {
        matches!(self, SortMode::MostLiked)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortMode::MostRecent => "recent",
            SortMode::Oldest => "oldest",
            SortMode::MostLiked => "likes",
        }
    }
}

impl FromStr for SortMode {
    type Err = FeedParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "recent" => Ok(SortMode::MostRecent),
            "oldest" => Ok(SortMode::Oldest),
            "likes" | "liked" => Ok(SortMode::MostLiked),
            other => Err(FeedParamError::UnknownSort(other.to_string())),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One feed load: filter, sort and the (optional) viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FeedRequest {
    pub filter: FeedFilter,
    pub sort: SortMode,
    pub viewer: Option<Uuid>,
}

impl FeedRequest {
    pub fn new(filter: FeedFilter, sort: SortMode, viewer: Option<Uuid>) -> Self {
        Self {
            filter,
            sort,
            viewer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedParamError {
    #[error("unknown filter '{0}' (expected all, liked, bookmarked or user)")]
    UnknownFilter(String),
    #[error("unknown sort '{0}' (expected recent, oldest or likes)")]
    UnknownSort(String),
    #[error("author_id is required for filter=user")]
    MissingAuthor,
}
