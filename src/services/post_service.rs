//! Post service - post CRUD and like/dislike reconciliation.
//!
//! Every operation starts by resolving the caller from their token. Writes
//! that touch a stored post (edit, delete, react) run inside that post's
//! lock scope so counter updates are never lost to a concurrent writer.

use async_trait::async_trait;
use std::sync::Arc;

use super::{IdGenerator, TokenManager};
use crate::config::LOCK_PREFIX_POST_REACTION;
use crate::domain::{reconcile, Polarity, Post, PostView, ReactionWrite, TokenPayload};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{LockGuard, LockRegistry, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const POST_NOT_FOUND: &str = "Post id not found";
const DELETED_POST_NOT_FOUND: &str = "Post id doesn't exist";

/// Post service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PostService: Send + Sync {
    /// All posts with their creators
    async fn list_posts(&self, token: &str) -> AppResult<Vec<PostView>>;

    /// Publish a post owned by the caller
    async fn create_post(&self, token: &str, content: String) -> AppResult<()>;

    /// Replace the content of a post the caller created
    async fn edit_post(&self, token: &str, post_id: &str, content: String) -> AppResult<()>;

    /// Remove a post. Allowed for its creator and for admins.
    async fn delete_post(&self, token: &str, post_id: &str) -> AppResult<()>;

    /// Like (`like = true`) or dislike a post, toggling an identical
    /// earlier reaction off.
    async fn react(&self, token: &str, post_id: &str, like: bool) -> AppResult<()>;
}

/// Concrete implementation of PostService using Unit of Work.
pub struct PostManager<U: UnitOfWork> {
    uow: Arc<U>,
    ids: Arc<dyn IdGenerator>,
    tokens: Arc<dyn TokenManager>,
    locks: LockRegistry,
}

impl<U: UnitOfWork> PostManager<U> {
    pub fn new(
        uow: Arc<U>,
        ids: Arc<dyn IdGenerator>,
        tokens: Arc<dyn TokenManager>,
        locks: LockRegistry,
    ) -> Self {
        Self {
            uow,
            ids,
            tokens,
            locks,
        }
    }

    fn authenticate(&self, token: &str) -> AppResult<TokenPayload> {
        self.tokens
            .get_payload(token)
            .ok_or_else(|| AppError::unauthorized("Invalid token"))
    }

    async fn lock_post(&self, post_id: &str) -> LockGuard {
        self.locks
            .acquire_lock(&format!("{}{}", LOCK_PREFIX_POST_REACTION, post_id))
            .await
    }

    async fn load_post(&self, post_id: &str, missing: &str) -> AppResult<Post> {
        self.uow
            .posts()
            .find_post_by_id(post_id)
            .await?
            .ok_or_not_found(missing)
    }
}

#[async_trait]
impl<U: UnitOfWork> PostService for PostManager<U> {
    async fn list_posts(&self, token: &str) -> AppResult<Vec<PostView>> {
        self.authenticate(token)?;

        let rows = self.uow.posts().find_posts_with_creator_name().await?;
        Ok(rows.into_iter().map(PostView::from).collect())
    }

    async fn create_post(&self, token: &str, content: String) -> AppResult<()> {
        let caller = self.authenticate(token)?;

        let post = Post::new(self.ids.generate(), caller.id, content);
        self.uow.posts().create_post(&post).await?;

        tracing::debug!(post_id = %post.id, creator_id = %post.creator_id, "Post created");
        Ok(())
    }

    async fn edit_post(&self, token: &str, post_id: &str, content: String) -> AppResult<()> {
        let caller = self.authenticate(token)?;
        let _guard = self.lock_post(post_id).await;

        let mut post = self.load_post(post_id, POST_NOT_FOUND).await?;
        if !post.is_created_by(&caller.id) {
            return Err(AppError::unauthorized(
                "Only the creator of the post can edit it",
            ));
        }

        post.set_content(content);
        self.uow.posts().edit_post(&post).await?;

        tracing::debug!(post_id = %post.id, "Post edited");
        Ok(())
    }

    async fn delete_post(&self, token: &str, post_id: &str) -> AppResult<()> {
        let caller = self.authenticate(token)?;
        let _guard = self.lock_post(post_id).await;

        let post = self.load_post(post_id, DELETED_POST_NOT_FOUND).await?;
        if !post.is_created_by(&caller.id) && !caller.is_admin() {
            return Err(AppError::forbidden(
                "Only the creator of the post can delete it",
            ));
        }

        self.uow.posts().remove_post(&post.id).await?;

        tracing::info!(post_id = %post.id, removed_by = %caller.id, "Post deleted");
        Ok(())
    }

    async fn react(&self, token: &str, post_id: &str, like: bool) -> AppResult<()> {
        let caller = self.authenticate(token)?;
        let _guard = self.lock_post(post_id).await;
        let posts = self.uow.posts();

        let mut post = posts
            .find_post_with_creator_name_by_id(post_id)
            .await?
            .ok_or_not_found(POST_NOT_FOUND)?
            .post;

        let state = posts.find_reaction(&caller.id, &post.id).await?;

        if post.is_created_by(&caller.id) {
            return Err(AppError::forbidden(
                "The post creator can not give likes or dislikes",
            ));
        }

        let change = reconcile(state, Polarity::from_like(like));
        post.apply_delta(change.delta)?;

        match change.write {
            ReactionWrite::Insert(polarity) => {
                posts.insert_reaction(&caller.id, &post.id, polarity).await?
            }
            ReactionWrite::Update(polarity) => {
                posts.update_reaction(&caller.id, &post.id, polarity).await?
            }
            ReactionWrite::Remove => posts.remove_reaction(&caller.id, &post.id).await?,
        }

        posts.edit_post(&post).await?;

        tracing::debug!(
            post_id = %post.id,
            user_id = %caller.id,
            from = ?state,
            to = ?change.next_state(),
            likes = post.likes,
            dislikes = post.dislikes,
            "Reaction reconciled"
        );
        Ok(())
    }
}
