//! Post repository: posts joined with their creators, and the per-user
//! reaction rows that back the like/dislike counters.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use super::entities::{
    like_dislike::{self, Entity as LikeDislikeEntity},
    post::{self, Entity as PostEntity},
    user::{self, Entity as UserEntity},
};
use crate::domain::{Polarity, Post, PostWithCreator, ReactionState};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Post repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find a post by ID
    async fn find_post_by_id(&self, id: &str) -> AppResult<Option<Post>>;

    /// List every post with its creator's name
    async fn find_posts_with_creator_name(&self) -> AppResult<Vec<PostWithCreator>>;

    /// Find a post by ID with its creator's name
    async fn find_post_with_creator_name_by_id(
        &self,
        id: &str,
    ) -> AppResult<Option<PostWithCreator>>;

    /// Persist a new post
    async fn create_post(&self, post: &Post) -> AppResult<()>;

    /// Overwrite a stored post (content, counters and timestamps)
    async fn edit_post(&self, post: &Post) -> AppResult<()>;

    /// Delete a post together with its reactions
    async fn remove_post(&self, id: &str) -> AppResult<()>;

    /// Reaction currently held by `user_id` on `post_id`
    async fn find_reaction(&self, user_id: &str, post_id: &str) -> AppResult<ReactionState>;

    /// Record a first reaction
    async fn insert_reaction(
        &self,
        user_id: &str,
        post_id: &str,
        polarity: Polarity,
    ) -> AppResult<()>;

    /// Flip an existing reaction to `polarity`
    async fn update_reaction(
        &self,
        user_id: &str,
        post_id: &str,
        polarity: Polarity,
    ) -> AppResult<()>;

    /// Drop an existing reaction
    async fn remove_reaction(&self, user_id: &str, post_id: &str) -> AppResult<()>;
}

/// Concrete implementation of PostRepository
pub struct PostStore {
    db: DatabaseConnection,
}

impl PostStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn with_creator((post, creator): (post::Model, Option<user::Model>)) -> AppResult<PostWithCreator> {
    Ok(PostWithCreator {
        post: Post::try_from(post)?,
        creator_name: creator.map(|u| u.name).unwrap_or_default(),
    })
}

#[async_trait]
impl PostRepository for PostStore {
    async fn find_post_by_id(&self, id: &str) -> AppResult<Option<Post>> {
        let result = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result.map(Post::try_from).transpose()
    }

    async fn find_posts_with_creator_name(&self) -> AppResult<Vec<PostWithCreator>> {
        let rows = PostEntity::find()
            .find_also_related(UserEntity)
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        rows.into_iter().map(with_creator).collect()
    }

    async fn find_post_with_creator_name_by_id(
        &self,
        id: &str,
    ) -> AppResult<Option<PostWithCreator>> {
        let row = PostEntity::find_by_id(id)
            .find_also_related(UserEntity)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        row.map(with_creator).transpose()
    }

    async fn create_post(&self, post: &Post) -> AppResult<()> {
        post::ActiveModel::try_from(post)?
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    async fn edit_post(&self, post: &Post) -> AppResult<()> {
        let mut active = post::ActiveModel::try_from(post)?;
        // Creation time and authorship never change after insert
        active.created_at = sea_orm::ActiveValue::NotSet;
        active.creator_id = sea_orm::ActiveValue::NotSet;

        active.update(&self.db).await.map_err(AppError::from)?;
        Ok(())
    }

    async fn remove_post(&self, id: &str) -> AppResult<()> {
        let txn = self.db.begin().await.map_err(AppError::from)?;

        let outcome = async {
            LikeDislikeEntity::delete_many()
                .filter(like_dislike::Column::PostId.eq(id))
                .exec(&txn)
                .await?;
            PostEntity::delete_by_id(id).exec(&txn).await
        }
        .await;

        match outcome {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                if result.rows_affected == 0 {
                    tracing::warn!(post_id = %id, "Post already removed");
                }
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(AppError::from(e))
            }
        }
    }

    async fn find_reaction(&self, user_id: &str, post_id: &str) -> AppResult<ReactionState> {
        let row = LikeDislikeEntity::find_by_id((user_id.to_string(), post_id.to_string()))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        match row {
            None => Ok(ReactionState::NoReaction),
            Some(model) => Polarity::parse(&model.polarity)
                .map(|p| ReactionState::from(Some(p)))
                .ok_or_else(|| {
                    AppError::internal(format!(
                        "unknown reaction polarity {:?} for user {} on post {}",
                        model.polarity, user_id, post_id
                    ))
                }),
        }
    }

    async fn insert_reaction(
        &self,
        user_id: &str,
        post_id: &str,
        polarity: Polarity,
    ) -> AppResult<()> {
        let active_model = like_dislike::ActiveModel {
            user_id: Set(user_id.to_string()),
            post_id: Set(post_id.to_string()),
            polarity: Set(polarity.as_str().to_string()),
        };

        active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(())
    }

    async fn update_reaction(
        &self,
        user_id: &str,
        post_id: &str,
        polarity: Polarity,
    ) -> AppResult<()> {
        LikeDislikeEntity::update_many()
            .col_expr(like_dislike::Column::Polarity, Expr::value(polarity.as_str()))
            .filter(like_dislike::Column::UserId.eq(user_id))
            .filter(like_dislike::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    async fn remove_reaction(&self, user_id: &str, post_id: &str) -> AppResult<()> {
        LikeDislikeEntity::delete_many()
            .filter(like_dislike::Column::UserId.eq(user_id))
            .filter(like_dislike::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}
