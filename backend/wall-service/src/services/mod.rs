pub mod feed_aggregator;
pub mod feed_cache;
pub mod feed_session;
pub mod interactions;
pub mod members;
pub mod posts;
pub mod profiles;

pub use feed_aggregator::{annotate, EngagementSnapshot, FeedAggregator};
pub use feed_cache::FeedCache;
pub use feed_session::{FeedSession, LoadOutcome, LoadSequencer, LoadTicket};
pub use interactions::InteractionService;
pub use members::MemberDirectory;
pub use posts::{classify, PostComposer, PostDraft, EMPTY_POST_MESSAGE};
pub use profiles::{ProfileForm, ProfileService};
