use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reactions offered under each post.
pub const EMOJI_REACTIONS: &[&str] = &["👍", "❤️", "🎉", "🎪", "🎭"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub is_moderated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub post_id: i64,
    pub content: String,
    pub author_id: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub content: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReaction {
    pub post_id: i64,
    pub emoji: String,
    pub author_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub id: i64,
    pub post_id: i64,
    pub emoji: String,
    pub author_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommunityError {
    #[error("{0} must not be empty")]
    EmptyContent(&'static str),
    #[error("parent comment {parent_id} does not belong to post {post_id}")]
    UnknownParent { parent_id: i64, post_id: i64 },
    #[error("unsupported reaction {0:?}")]
    UnsupportedEmoji(String),
}

impl NewPost {
    pub fn check(&self) -> Result<(), CommunityError> {
        if self.title.trim().is_empty() {
            return Err(CommunityError::EmptyContent("title"));
        }
        if self.content.trim().is_empty() {
            return Err(CommunityError::EmptyContent("content"));
        }
        Ok(())
    }
}

impl NewComment {
    /// Checks the body and, when replying, that the parent sits on the same post.
    pub fn check(&self, parent: Option<&Comment>) -> Result<(), CommunityError> {
        if self.content.trim().is_empty() {
            return Err(CommunityError::EmptyContent("content"));
        }
        if let Some(parent_id) = self.parent_id {
            match parent {
                Some(p) if p.id == parent_id && p.post_id == self.post_id => {},
                _ => {
                    return Err(CommunityError::UnknownParent {
                        parent_id,
                        post_id: self.post_id,
                    });
                },
            }
        }
        Ok(())
    }
}

impl NewReaction {
    /// Only the emojis in [`EMOJI_REACTIONS`] are accepted.
    pub fn check(&self) -> Result<(), CommunityError> {
        if self.emoji.trim().is_empty() {
            return Err(CommunityError::EmptyContent("emoji"));
        }
        if !EMOJI_REACTIONS.contains(&self.emoji.as_str()) {
            return Err(CommunityError::UnsupportedEmoji(self.emoji.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactionCount {
    pub emoji: String,
    pub count: usize,
}

/// A post with its comments and reaction tallies, as rendered on the board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostThread {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<Comment>,
    pub reactions: Vec<ReactionCount>,
}

/// Attach comments and reaction counts to their posts. Posts and comments are
/// oldest first; reactions by count, then emoji.
pub fn build_threads(
    mut posts: Vec<Post>,
    comments: Vec<Comment>,
    reactions: Vec<Reaction>,
) -> Vec<PostThread> {
    posts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let mut comments_by_post: HashMap<i64, Vec<Comment>> = HashMap::new();
    for comment in comments {
        comments_by_post
            .entry(comment.post_id)
            .or_default()
            .push(comment);
    }

    let mut reactions_by_post: HashMap<i64, HashMap<String, usize>> = HashMap::new();
    for reaction in reactions {
        *reactions_by_post
            .entry(reaction.post_id)
            .or_default()
            .entry(reaction.emoji)
            .or_default() += 1;
    }

    posts
        .into_iter()
        .map(|post| {
            let mut comments = comments_by_post.remove(&post.id).unwrap_or_default();
            comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

            let mut reactions: Vec<ReactionCount> = reactions_by_post
                .remove(&post.id)
                .unwrap_or_default()
                .into_iter()
                .map(|(emoji, count)| ReactionCount { emoji, count })
                .collect();
            reactions.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.emoji.cmp(&b.emoji)));

            PostThread {
                post,
                comments,
                reactions,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn post(id: i64, secs: i64) -> Post {
        Post {
            id,
            title: format!("Post {id}"),
            content: "hello".to_string(),
            author_id: "anon_abcde".to_string(),
            created_at: at(secs),
            is_moderated: false,
        }
    }

    fn comment(id: i64, post_id: i64, secs: i64) -> Comment {
        Comment {
            id,
            post_id,
            content: format!("comment {id}"),
            author_id: "anon_fghij".to_string(),
            created_at: at(secs),
            parent_id: None,
        }
    }

    fn reaction(id: i64, post_id: i64, emoji: &str) -> Reaction {
        Reaction {
            id,
            post_id,
            emoji: emoji.to_string(),
            author_id: "anon_klmno".to_string(),
        }
    }

    #[test]
    fn threads_group_comments_and_reactions() {
        let threads = build_threads(
            vec![post(2, 10), post(1, 0)],
            vec![comment(1, 1, 5), comment(2, 2, 11), comment(3, 1, 3)],
            vec![
                reaction(1, 1, "🎉"),
                reaction(2, 1, "👍"),
                reaction(3, 1, "🎉"),
                reaction(4, 2, "❤️"),
            ],
        );

        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].post.id, 1);
        let ids: Vec<i64> = threads[0].comments.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(
            threads[0].reactions[0],
            ReactionCount {
                emoji: "🎉".to_string(),
                count: 2
            }
        );
        assert_eq!(threads[1].comments.len(), 1);
        assert_eq!(threads[1].reactions.len(), 1);
    }

    #[test]
    fn post_without_activity_has_empty_lists() {
        let threads = build_threads(vec![post(1, 0)], vec![], vec![]);
        assert!(threads[0].comments.is_empty());
        assert!(threads[0].reactions.is_empty());
    }

    #[test]
    fn reply_must_target_same_post() {
        let parent = comment(5, 1, 0);
        let reply = NewComment {
            post_id: 2,
            content: "me too".to_string(),
            author_id: "anon".to_string(),
            parent_id: Some(5),
        };
        assert_eq!(
            reply.check(Some(&parent)),
            Err(CommunityError::UnknownParent {
                parent_id: 5,
                post_id: 2
            })
        );
        assert!(reply.check(None).is_err());

        let ok = NewComment {
            post_id: 1,
            ..reply
        };
        assert!(ok.check(Some(&parent)).is_ok());
    }

    #[test]
    fn blank_content_rejected() {
        let p = NewPost {
            title: "  ".to_string(),
            content: "x".to_string(),
            author_id: "a".to_string(),
        };
        assert_eq!(p.check(), Err(CommunityError::EmptyContent("title")));

        let r = NewReaction {
            post_id: 1,
            emoji: String::new(),
            author_id: "a".to_string(),
        };
        assert!(r.check().is_err());
    }

    #[test]
    fn reactions_limited_to_offered_emojis() {
        for emoji in EMOJI_REACTIONS {
            let r = NewReaction {
                post_id: 1,
                emoji: emoji.to_string(),
                author_id: "a".to_string(),
            };
            assert!(r.check().is_ok(), "{emoji}");
        }

        let r = NewReaction {
            post_id: 1,
            emoji: "🍕".to_string(),
            author_id: "a".to_string(),
        };
        assert_eq!(
            r.check(),
            Err(CommunityError::UnsupportedEmoji("🍕".to_string()))
        );
    }

    #[test]
    fn thread_serializes_flat() {
        let threads = build_threads(vec![post(1, 0)], vec![], vec![reaction(1, 1, "👍")]);
        let json = serde_json::to_value(&threads[0]).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["isModerated"], false);
        assert_eq!(json["reactions"][0]["count"], 1);
    }
}
