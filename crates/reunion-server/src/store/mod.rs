//! Persistence behind a single async trait.
//!
//! Every table is append-only from the server's point of view: rows are
//! inserted once and never updated. The in-memory backend is the default;
//! the PostgreSQL backend is compiled in with the `postgres` feature.

use async_trait::async_trait;

use reunion_core::community::{Comment, NewComment, NewPost, NewReaction, Post, Reaction};
use reunion_core::leaderboard::GuessAttempt;
use reunion_core::survey::{NewSurvey, Survey};

mod memory;
#[cfg(feature = "postgres")]
mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PgStore;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("query failed: {0}")]
    Query(String),
    #[error("{0}")]
    NotFound(String),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Append one scored game round.
    async fn save_attempt(
        &self,
        distance_km: f64,
        attempt_number: u32,
    ) -> Result<GuessAttempt, StoreError>;

    /// All stored rounds that parse cleanly, in no particular order.
    async fn load_history(&self) -> Result<Vec<GuessAttempt>, StoreError>;

    async fn insert_survey(&self, survey: NewSurvey) -> Result<Survey, StoreError>;
    async fn list_surveys(&self) -> Result<Vec<Survey>, StoreError>;

    async fn insert_post(&self, post: NewPost) -> Result<Post, StoreError>;
    /// The `limit` most recent posts.
    async fn list_posts(&self, limit: usize) -> Result<Vec<Post>, StoreError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, StoreError>;

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError>;
    async fn find_comment(&self, id: i64) -> Result<Option<Comment>, StoreError>;
    async fn list_comments(&self, post_ids: &[i64]) -> Result<Vec<Comment>, StoreError>;

    async fn insert_reaction(&self, reaction: NewReaction) -> Result<Reaction, StoreError>;
    async fn list_reactions(&self, post_ids: &[i64]) -> Result<Vec<Reaction>, StoreError>;

    /// Cheap connectivity check.
    async fn ping(&self) -> Result<(), StoreError>;
}
