use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;

use reunion_core::community::{
    Comment, NewComment, NewPost, NewReaction, Post, PostThread, Reaction, build_threads,
};

use crate::error::AppError;
use crate::state::AppState;

const MAX_TITLE_CHARS: usize = 200;
const MAX_CONTENT_CHARS: usize = 4000;

/// Reject oversized text fields.
fn check_length(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::BadRequest(format!("{field} exceeds {max} chars")));
    }
    Ok(())
}

/// GET /api/posts: posts with their comments and reaction counts.
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<PostThread>>, AppError> {
    let posts = state
        .store
        .list_posts(state.config.limits.max_posts_listed)
        .await?;
    let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
    let comments = state.store.list_comments(&ids).await?;
    let reactions = state.store.list_reactions(&ids).await?;
    Ok(Json(build_threads(posts, comments, reactions)))
}

/// POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    Json(body): Json<NewPost>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    body.check()?;
    check_length("title", &body.title, MAX_TITLE_CHARS)?;
    check_length("content", &body.content, MAX_CONTENT_CHARS)?;

    let post = state.store.insert_post(body).await?;
    tracing::info!(id = post.id, author = %post.author_id, "Post created");
    Ok((StatusCode::CREATED, Json(post)))
}

/// POST /api/comments: 404 when the post does not exist.
pub async fn create_comment(
    State(state): State<AppState>,
    Json(body): Json<NewComment>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    check_length("content", &body.content, MAX_CONTENT_CHARS)?;
    if state.store.get_post(body.post_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Post {} not found", body.post_id)));
    }
    let parent = match body.parent_id {
        Some(id) => state.store.find_comment(id).await?,
        None => None,
    };
    body.check(parent.as_ref())?;

    let comment = state.store.insert_comment(body).await?;
    tracing::debug!(id = comment.id, post = comment.post_id, "Comment created");
    Ok((StatusCode::CREATED, Json(comment)))
}

/// POST /api/reactions: one of the offered emojis on an existing post.
pub async fn create_reaction(
    State(state): State<AppState>,
    Json(body): Json<NewReaction>,
) -> Result<(StatusCode, Json<Reaction>), AppError> {
    body.check()?;

    let reaction = state.store.insert_reaction(body).await?;
    tracing::debug!(id = reaction.id, post = reaction.post_id, "Reaction added");
    Ok((StatusCode::CREATED, Json(reaction)))
}
