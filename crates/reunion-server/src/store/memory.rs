use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use reunion_core::community::{Comment, NewComment, NewPost, NewReaction, Post, Reaction};
use reunion_core::leaderboard::GuessAttempt;
use reunion_core::survey::{NewSurvey, Survey};

use super::{Store, StoreError};

#[derive(Default)]
struct Tables {
    next_id: i64,
    attempts: Vec<GuessAttempt>,
    surveys: Vec<Survey>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    reactions: Vec<Reaction>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local store. Each insert happens under a single write lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn save_attempt(
        &self,
        distance_km: f64,
        attempt_number: u32,
    ) -> Result<GuessAttempt, StoreError> {
        let mut tables = self.tables.write().await;
        let attempt = GuessAttempt {
            id: tables.allocate_id(),
            distance_km,
            attempt_number,
            created_at: Utc::now(),
        };
        tables.attempts.push(attempt.clone());
        Ok(attempt)
    }

    async fn load_history(&self) -> Result<Vec<GuessAttempt>, StoreError> {
        Ok(self.tables.read().await.attempts.clone())
    }

    async fn insert_survey(&self, response: NewSurvey) -> Result<Survey, StoreError> {
        let mut tables = self.tables.write().await;
        let survey = Survey {
            id: tables.allocate_id(),
            response,
            created_at: Utc::now(),
        };
        tables.surveys.push(survey.clone());
        Ok(survey)
    }

    async fn list_surveys(&self) -> Result<Vec<Survey>, StoreError> {
        Ok(self.tables.read().await.surveys.clone())
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post, StoreError> {
        let mut tables = self.tables.write().await;
        let post = Post {
            id: tables.allocate_id(),
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            created_at: Utc::now(),
            is_moderated: false,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn list_posts(&self, limit: usize) -> Result<Vec<Post>, StoreError> {
        let tables = self.tables.read().await;
        let skip = tables.posts.len().saturating_sub(limit);
        Ok(tables.posts[skip..].to_vec())
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(StoreError::NotFound(format!("Post {} not found", comment.post_id)));
        }
        let comment = Comment {
            id: tables.allocate_id(),
            post_id: comment.post_id,
            content: comment.content,
            author_id: comment.author_id,
            created_at: Utc::now(),
            parent_id: comment.parent_id,
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_comment(&self, id: i64) -> Result<Option<Comment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments(&self, post_ids: &[i64]) -> Result<Vec<Comment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| post_ids.contains(&c.post_id))
            .cloned()
            .collect())
    }

    async fn insert_reaction(&self, reaction: NewReaction) -> Result<Reaction, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == reaction.post_id) {
            return Err(StoreError::NotFound(format!("Post {} not found", reaction.post_id)));
        }
        let reaction = Reaction {
            id: tables.allocate_id(),
            post_id: reaction.post_id,
            emoji: reaction.emoji,
            author_id: reaction.author_id,
        };
        tables.reactions.push(reaction.clone());
        Ok(reaction)
    }

    async fn list_reactions(&self, post_ids: &[i64]) -> Result<Vec<Reaction>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .reactions
            .iter()
            .filter(|r| post_ids.contains(&r.post_id))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
