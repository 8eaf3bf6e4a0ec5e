//! Post domain entity and its public view.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::reaction::CounterDelta;
use crate::errors::{AppError, AppResult};

/// Post domain entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub creator_id: String,
    pub content: String,
    pub likes: u32,
    pub dislikes: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a fresh post with zeroed counters
    pub fn new(id: String, creator_id: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            creator_id,
            content,
            likes: 0,
            dislikes: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_created_by(&self, user_id: &str) -> bool {
        self.creator_id == user_id
    }

    /// Replace the content and refresh `updated_at`
    pub fn set_content(&mut self, content: String) {
        self.content = content;
        self.updated_at = Utc::now();
    }

    /// Apply a counter adjustment.
    ///
    /// Both counters are checked before either is written, so on error the
    /// post is left untouched.
    pub fn apply_delta(&mut self, delta: CounterDelta) -> AppResult<()> {
        let likes = self.likes.checked_add_signed(delta.likes);
        let dislikes = self.dislikes.checked_add_signed(delta.dislikes);

        match (likes, dislikes) {
            (Some(likes), Some(dislikes)) => {
                self.likes = likes;
                self.dislikes = dislikes;
                Ok(())
            }
            _ => Err(AppError::internal(format!(
                "reaction counters of post {} out of range (likes={}, dislikes={}, delta={:?})",
                self.id, self.likes, self.dislikes, delta
            ))),
        }
    }
}

/// A post joined with its creator's display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostWithCreator {
    pub post: Post,
    pub creator_name: String,
}

/// Creator reference embedded in a post view
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatorView {
    pub id: String,
    pub name: String,
}

/// Public view of a post
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    #[schema(example = "Bom dia, labook!")]
    pub content: String,
    pub likes: u32,
    pub dislikes: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub creator: CreatorView,
}

impl From<PostWithCreator> for PostView {
    fn from(row: PostWithCreator) -> Self {
        let PostWithCreator { post, creator_name } = row;
        Self {
            id: post.id,
            content: post.content,
            likes: post.likes,
            dislikes: post.dislikes,
            created_at: post.created_at,
            updated_at: post.updated_at,
            creator: CreatorView {
                id: post.creator_id,
                name: creator_name,
            },
        }
    }
}
