pub mod feed;
pub mod models;

pub use feed::{CreatedAtOrder, FeedFilter, FeedParamError, FeedRequest, SortMode};
pub use models::{
    AnnotatedPost, AuthorStats, AuthorSummary, InteractionKind, InteractionState, Member, NewPost,
    Post, PostKind, ProfileUpdate, ProfileUpdateOutcome, ToggleOutcome, UserProfile,
};
