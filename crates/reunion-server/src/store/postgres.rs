//! PostgreSQL backend.
//!
//! Migrations are not run; the schema must already exist:
//!
//! ```sql
//! CREATE TABLE surveys (
//!     id                   SERIAL PRIMARY KEY,
//!     email                TEXT NOT NULL,
//!     budget               INTEGER NOT NULL,
//!     location             TEXT NOT NULL,
//!     transportation       TEXT NOT NULL,
//!     event_types          TEXT[] NOT NULL,
//!     venues               TEXT[] NOT NULL,
//!     academic_status      TEXT NOT NULL,
//!     availability         JSONB NOT NULL,
//!     dietary_restrictions TEXT,
//!     alcohol_preference   TEXT NOT NULL,
//!     couch_surfing        BOOLEAN NOT NULL DEFAULT FALSE,
//!     created_at           TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//!
//! CREATE TABLE posts (
//!     id           SERIAL PRIMARY KEY,
//!     title        TEXT NOT NULL,
//!     content      TEXT NOT NULL,
//!     author_id    TEXT NOT NULL,
//!     created_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
//!     is_moderated BOOLEAN DEFAULT FALSE
//! );
//!
//! CREATE TABLE comments (
//!     id         SERIAL PRIMARY KEY,
//!     post_id    INTEGER NOT NULL REFERENCES posts(id),
//!     content    TEXT NOT NULL,
//!     author_id  TEXT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
//!     parent_id  INTEGER REFERENCES comments(id)
//! );
//!
//! CREATE TABLE reactions (
//!     id        SERIAL PRIMARY KEY,
//!     post_id   INTEGER NOT NULL REFERENCES posts(id),
//!     emoji     TEXT NOT NULL,
//!     author_id TEXT NOT NULL
//! );
//!
//! CREATE TABLE game_scores (
//!     id             SERIAL PRIMARY KEY,
//!     distance_km    DOUBLE PRECISION,
//!     attempt_number INTEGER,
//!     created_at     TIMESTAMPTZ DEFAULT now()
//! );
//! ```
//!
//! Game score columns are nullable and may hold any numeric or text type, so
//! they are selected as text, read as [`RawAttempt`] and validated once
//! through `parse_history`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;

use reunion_core::community::{Comment, NewComment, NewPost, NewReaction, Post, Reaction};
use reunion_core::leaderboard::{GuessAttempt, RawAttempt, RawNumber, parse_history};
use reunion_core::survey::{NewSurvey, Survey, TimeSlot};

use super::{Store, StoreError};
use crate::config::DatabaseConfig;

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound("Resource not found".to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(e.to_string())
            },
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                StoreError::NotFound("Referenced post not found".to_string())
            },
            _ => StoreError::Query(e.to_string()),
        }
    }
}

/// Score columns selected with `::text` casts.
const SCORE_COLUMNS: &str = "id, distance_km::text AS distance_km, \
     attempt_number::text AS attempt_number, created_at";

#[derive(sqlx::FromRow)]
struct ScoreRow {
    id: i32,
    distance_km: Option<String>,
    attempt_number: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl From<ScoreRow> for RawAttempt {
    fn from(row: ScoreRow) -> Self {
        Self {
            id: Some(i64::from(row.id)),
            distance_km: row.distance_km.map(RawNumber::Text),
            attempt_number: row.attempt_number.map(RawNumber::Text),
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SurveyRow {
    id: i32,
    email: String,
    budget: i32,
    location: String,
    transportation: String,
    event_types: Vec<String>,
    venues: Vec<String>,
    academic_status: String,
    availability: Json<Vec<TimeSlot>>,
    dietary_restrictions: Option<String>,
    alcohol_preference: String,
    couch_surfing: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<SurveyRow> for Survey {
    type Error = StoreError;

    fn try_from(row: SurveyRow) -> Result<Self, Self::Error> {
        let budget = u32::try_from(row.budget)
            .map_err(|_| StoreError::Query(format!("survey {} has negative budget", row.id)))?;
        Ok(Survey {
            id: i64::from(row.id),
            response: NewSurvey {
                email: row.email,
                budget,
                location: row.location,
                transportation: row.transportation,
                event_types: row.event_types,
                venues: row.venues,
                academic_status: row.academic_status,
                availability: row.availability.0,
                dietary_restrictions: row.dietary_restrictions,
                alcohol_preference: row.alcohol_preference,
                couch_surfing: row.couch_surfing,
            },
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i32,
    title: String,
    content: String,
    author_id: String,
    created_at: DateTime<Utc>,
    is_moderated: Option<bool>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: i64::from(row.id),
            title: row.title,
            content: row.content,
            author_id: row.author_id,
            created_at: row.created_at,
            is_moderated: row.is_moderated.unwrap_or(false),
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i32,
    post_id: i32,
    content: String,
    author_id: String,
    created_at: DateTime<Utc>,
    parent_id: Option<i32>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: i64::from(row.id),
            post_id: i64::from(row.post_id),
            content: row.content,
            author_id: row.author_id,
            created_at: row.created_at,
            parent_id: row.parent_id.map(i64::from),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReactionRow {
    id: i32,
    post_id: i32,
    emoji: String,
    author_id: String,
}

impl From<ReactionRow> for Reaction {
    fn from(row: ReactionRow) -> Self {
        Reaction {
            id: i64::from(row.id),
            post_id: i64::from(row.post_id),
            emoji: row.emoji,
            author_id: row.author_id,
        }
    }
}

const SURVEY_COLUMNS: &str = "id, email, budget, location, transportation, event_types, venues, \
     academic_status, availability, dietary_restrictions, alcohol_preference, couch_surfing, \
     created_at";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn save_attempt(
        &self,
        distance_km: f64,
        attempt_number: u32,
    ) -> Result<GuessAttempt, StoreError> {
        let attempt = i32::try_from(attempt_number)
            .map_err(|_| StoreError::Query(format!("attempt {attempt_number} out of range")))?;
        let sql = format!(
            "INSERT INTO game_scores (distance_km, attempt_number) VALUES ($1, $2) \
             RETURNING {SCORE_COLUMNS}"
        );
        let row: ScoreRow = sqlx::query_as(&sql)
            .bind(distance_km)
            .bind(attempt)
            .fetch_one(&self.pool)
            .await?;

        GuessAttempt::try_from(RawAttempt::from(row)).map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn load_history(&self) -> Result<Vec<GuessAttempt>, StoreError> {
        let sql = format!("SELECT {SCORE_COLUMNS} FROM game_scores ORDER BY created_at DESC");
        let rows: Vec<ScoreRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(parse_history(rows.into_iter().map(RawAttempt::from)))
    }

    async fn insert_survey(&self, survey: NewSurvey) -> Result<Survey, StoreError> {
        let budget = i32::try_from(survey.budget)
            .map_err(|_| StoreError::Query(format!("budget {} out of range", survey.budget)))?;
        let sql = format!(
            "INSERT INTO surveys (email, budget, location, transportation, event_types, venues, \
             academic_status, availability, dietary_restrictions, alcohol_preference, couch_surfing) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {SURVEY_COLUMNS}"
        );
        let row: SurveyRow = sqlx::query_as(&sql)
            .bind(survey.email)
            .bind(budget)
            .bind(survey.location)
            .bind(survey.transportation)
            .bind(survey.event_types)
            .bind(survey.venues)
            .bind(survey.academic_status)
            .bind(Json(survey.availability))
            .bind(survey.dietary_restrictions)
            .bind(survey.alcohol_preference)
            .bind(survey.couch_surfing)
            .fetch_one(&self.pool)
            .await?;
        Survey::try_from(row)
    }

    async fn list_surveys(&self) -> Result<Vec<Survey>, StoreError> {
        let sql = format!("SELECT {SURVEY_COLUMNS} FROM surveys ORDER BY created_at");
        let rows: Vec<SurveyRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(Survey::try_from).collect()
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post, StoreError> {
        let row: PostRow = sqlx::query_as(
            "INSERT INTO posts (title, content, author_id) VALUES ($1, $2, $3) \
             RETURNING id, title, content, author_id, created_at, is_moderated",
        )
        .bind(post.title)
        .bind(post.content)
        .bind(post.author_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn list_posts(&self, limit: usize) -> Result<Vec<Post>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<PostRow> = sqlx::query_as(
            "SELECT id, title, content, author_id, created_at, is_moderated FROM posts \
             ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, StoreError> {
        let row: Option<PostRow> = sqlx::query_as(
            "SELECT id, title, content, author_id, created_at, is_moderated FROM posts \
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Post::from))
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError> {
        let row: CommentRow = sqlx::query_as(
            "INSERT INTO comments (post_id, content, author_id, parent_id) \
             SELECT $1, $2, $3, $4 WHERE EXISTS (SELECT 1 FROM posts WHERE id = $1) \
             RETURNING id, post_id, content, author_id, created_at, parent_id",
        )
        .bind(comment.post_id)
        .bind(comment.content)
        .bind(comment.author_id)
        .bind(comment.parent_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Post {} not found", comment.post_id)))?;
        Ok(row.into())
    }

    async fn find_comment(&self, id: i64) -> Result<Option<Comment>, StoreError> {
        let row: Option<CommentRow> = sqlx::query_as(
            "SELECT id, post_id, content, author_id, created_at, parent_id FROM comments \
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Comment::from))
    }

    async fn list_comments(&self, post_ids: &[i64]) -> Result<Vec<Comment>, StoreError> {
        let rows: Vec<CommentRow> = sqlx::query_as(
            "SELECT id, post_id, content, author_id, created_at, parent_id FROM comments \
             WHERE post_id = ANY($1)",
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn insert_reaction(&self, reaction: NewReaction) -> Result<Reaction, StoreError> {
        let row: ReactionRow = sqlx::query_as(
            "INSERT INTO reactions (post_id, emoji, author_id) \
             SELECT $1, $2, $3 WHERE EXISTS (SELECT 1 FROM posts WHERE id = $1) \
             RETURNING id, post_id, emoji, author_id",
        )
        .bind(reaction.post_id)
        .bind(reaction.emoji)
        .bind(reaction.author_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Post {} not found", reaction.post_id)))?;
        Ok(row.into())
    }

    async fn list_reactions(&self, post_ids: &[i64]) -> Result<Vec<Reaction>, StoreError> {
        let rows: Vec<ReactionRow> = sqlx::query_as(
            "SELECT id, post_id, emoji, author_id FROM reactions WHERE post_id = ANY($1)",
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Reaction::from).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}
