//! Post service tests against an in-memory persistence gateway.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use labook::config::Config;
use labook::domain::{
    Polarity, Post, PostWithCreator, ReactionState, TokenPayload, User, UserRole,
};
use labook::errors::{AppError, AppResult};
use labook::infra::{LockRegistry, PostRepository, UnitOfWork, UserRepository};
use labook::services::{IdGenerator, JwtTokenManager, PostManager, PostService, TokenManager};

const SECRET: &str = "test-secret-key-for-testing-only-32chars";

// =============================================================================
// In-memory gateway
// =============================================================================

#[derive(Default)]
struct MemoryStore {
    names: Mutex<HashMap<String, String>>,
    posts: Mutex<HashMap<String, Post>>,
    reactions: Mutex<HashMap<(String, String), Polarity>>,
    fail_reaction_writes: AtomicBool,
}

impl MemoryStore {
    fn add_user(&self, id: &str, name: &str) {
        self.names
            .lock()
            .unwrap()
            .insert(id.to_string(), name.to_string());
    }

    fn add_post(&self, id: &str, creator_id: &str) {
        let post = Post::new(id.to_string(), creator_id.to_string(), "hello".to_string());
        self.posts.lock().unwrap().insert(id.to_string(), post);
    }

    fn post(&self, id: &str) -> Post {
        self.posts.lock().unwrap().get(id).cloned().unwrap()
    }

    fn counters(&self, id: &str) -> (u32, u32) {
        let post = self.post(id);
        (post.likes, post.dislikes)
    }

    fn reaction(&self, user_id: &str, post_id: &str) -> Option<Polarity> {
        self.reactions
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), post_id.to_string()))
            .copied()
    }

    fn reactions_on(&self, post_id: &str) -> Vec<Polarity> {
        self.reactions
            .lock()
            .unwrap()
            .iter()
            .filter(|((_, p), _)| p == post_id)
            .map(|(_, polarity)| *polarity)
            .collect()
    }

    fn check_reaction_write(&self) -> AppResult<()> {
        if self.fail_reaction_writes.load(Ordering::SeqCst) {
            Err(AppError::internal("reaction write failed"))
        } else {
            Ok(())
        }
    }

    fn with_creator(&self, post: Post) -> PostWithCreator {
        let creator_name = self
            .names
            .lock()
            .unwrap()
            .get(&post.creator_id)
            .cloned()
            .unwrap_or_default();
        PostWithCreator { post, creator_name }
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn find_post_by_id(&self, id: &str) -> AppResult<Option<Post>> {
        Ok(self.posts.lock().unwrap().get(id).cloned())
    }

    async fn find_posts_with_creator_name(&self) -> AppResult<Vec<PostWithCreator>> {
        let posts: Vec<Post> = self.posts.lock().unwrap().values().cloned().collect();
        Ok(posts.into_iter().map(|p| self.with_creator(p)).collect())
    }

    async fn find_post_with_creator_name_by_id(
        &self,
        id: &str,
    ) -> AppResult<Option<PostWithCreator>> {
        let post = self.posts.lock().unwrap().get(id).cloned();
        Ok(post.map(|p| self.with_creator(p)))
    }

    async fn create_post(&self, post: &Post) -> AppResult<()> {
        self.posts
            .lock()
            .unwrap()
            .insert(post.id.clone(), post.clone());
        Ok(())
    }

    async fn edit_post(&self, post: &Post) -> AppResult<()> {
        // Yield between read and write so unserialized writers would interleave
        tokio::task::yield_now().await;
        let mut posts = self.posts.lock().unwrap();
        let stored = posts
            .get_mut(&post.id)
            .ok_or_else(|| AppError::internal("edit of missing post"))?;
        stored.content = post.content.clone();
        stored.likes = post.likes;
        stored.dislikes = post.dislikes;
        stored.updated_at = post.updated_at;
        Ok(())
    }

    async fn remove_post(&self, id: &str) -> AppResult<()> {
        self.reactions
            .lock()
            .unwrap()
            .retain(|(_, post_id), _| post_id != id);
        self.posts.lock().unwrap().remove(id);
        Ok(())
    }

    async fn find_reaction(&self, user_id: &str, post_id: &str) -> AppResult<ReactionState> {
        tokio::task::yield_now().await;
        Ok(ReactionState::from(self.reaction(user_id, post_id)))
    }

    async fn insert_reaction(
        &self,
        user_id: &str,
        post_id: &str,
        polarity: Polarity,
    ) -> AppResult<()> {
        self.check_reaction_write()?;
        let key = (user_id.to_string(), post_id.to_string());
        let mut reactions = self.reactions.lock().unwrap();
        if reactions.contains_key(&key) {
            return Err(AppError::internal("duplicate reaction row"));
        }
        reactions.insert(key, polarity);
        Ok(())
    }

    async fn update_reaction(
        &self,
        user_id: &str,
        post_id: &str,
        polarity: Polarity,
    ) -> AppResult<()> {
        self.check_reaction_write()?;
        self.reactions
            .lock()
            .unwrap()
            .insert((user_id.to_string(), post_id.to_string()), polarity);
        Ok(())
    }

    async fn remove_reaction(&self, user_id: &str, post_id: &str) -> AppResult<()> {
        self.check_reaction_write()?;
        self.reactions
            .lock()
            .unwrap()
            .remove(&(user_id.to_string(), post_id.to_string()));
        Ok(())
    }
}

struct NoUsers;

#[async_trait]
impl UserRepository for NoUsers {
    async fn find_by_email(&self, _email: &str) -> AppResult<Option<User>> {
        Ok(None)
    }

    async fn create(&self, _user: &User) -> AppResult<()> {
        Ok(())
    }

    async fn list(&self, _query: Option<String>) -> AppResult<Vec<User>> {
        Ok(vec![])
    }
}

struct TestUnitOfWork {
    store: Arc<MemoryStore>,
}

impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        Arc::new(NoUsers)
    }

    fn posts(&self) -> Arc<dyn PostRepository> {
        self.store.clone()
    }
}

#[derive(Default)]
struct SequentialIds(AtomicUsize);

impl IdGenerator for SequentialIds {
    fn generate(&self) -> String {
        format!("p-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

// =============================================================================
// Fixture
// =============================================================================

struct Fixture {
    store: Arc<MemoryStore>,
    tokens: Arc<JwtTokenManager>,
    service: Arc<PostManager<TestUnitOfWork>>,
}

impl Fixture {
    /// Users `alice` (creator of post `p1`), `bob` and `carol`, plus admin `root`.
    fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        store.add_user("alice", "Alice");
        store.add_user("bob", "Bob");
        store.add_user("carol", "Carol");
        store.add_user("root", "Root");
        store.add_post("p1", "alice");

        let tokens = Arc::new(JwtTokenManager::new(&Config::with_secret(
            "postgres://localhost/test",
            SECRET,
        )));
        let service = Arc::new(PostManager::new(
            Arc::new(TestUnitOfWork {
                store: store.clone(),
            }),
            Arc::new(SequentialIds::default()),
            tokens.clone(),
            LockRegistry::new(),
        ));

        Self {
            store,
            tokens,
            service,
        }
    }

    fn token(&self, id: &str) -> String {
        let role = if id == "root" {
            UserRole::Admin
        } else {
            UserRole::Normal
        };
        self.tokens
            .create_token(&TokenPayload {
                id: id.to_string(),
                name: id.to_string(),
                role,
            })
            .unwrap()
    }

    async fn react(&self, user: &str, like: bool) -> AppResult<()> {
        self.service.react(&self.token(user), "p1", like).await
    }
}

// =============================================================================
// Reactions
// =============================================================================

#[tokio::test]
async fn test_like_then_dislike_then_dislike() {
    let fx = Fixture::new();

    fx.react("bob", true).await.unwrap();
    assert_eq!(fx.store.counters("p1"), (1, 0));
    assert_eq!(fx.store.reaction("bob", "p1"), Some(Polarity::Like));

    fx.react("bob", false).await.unwrap();
    assert_eq!(fx.store.counters("p1"), (0, 1));
    assert_eq!(fx.store.reaction("bob", "p1"), Some(Polarity::Dislike));

    fx.react("bob", false).await.unwrap();
    assert_eq!(fx.store.counters("p1"), (0, 0));
    assert_eq!(fx.store.reaction("bob", "p1"), None);
}

#[tokio::test]
async fn test_repeated_like_toggles_back_to_start() {
    let fx = Fixture::new();

    fx.react("bob", true).await.unwrap();
    fx.react("bob", true).await.unwrap();

    assert_eq!(fx.store.counters("p1"), (0, 0));
    assert!(fx.store.reactions_on("p1").is_empty());
}

#[tokio::test]
async fn test_dislike_flips_to_like() {
    let fx = Fixture::new();

    fx.react("bob", false).await.unwrap();
    fx.react("bob", true).await.unwrap();

    assert_eq!(fx.store.counters("p1"), (1, 0));
    assert_eq!(fx.store.reaction("bob", "p1"), Some(Polarity::Like));
}

#[tokio::test]
async fn test_counters_track_reactions_of_many_users() {
    let fx = Fixture::new();

    fx.react("bob", true).await.unwrap();
    fx.react("carol", false).await.unwrap();
    fx.react("root", true).await.unwrap();
    fx.react("carol", true).await.unwrap();

    let reactions = fx.store.reactions_on("p1");
    let likes = reactions.iter().filter(|p| **p == Polarity::Like).count() as u32;
    let dislikes = reactions.iter().filter(|p| **p == Polarity::Dislike).count() as u32;

    assert_eq!(fx.store.counters("p1"), (3, 0));
    assert_eq!(fx.store.counters("p1"), (likes, dislikes));
}

#[tokio::test]
async fn test_creator_can_not_react() {
    let fx = Fixture::new();

    let result = fx.react("alice", true).await;

    assert!(matches!(
        result,
        Err(AppError::Forbidden(ref m)) if m == "The post creator can not give likes or dislikes"
    ));
    assert_eq!(fx.store.counters("p1"), (0, 0));
    assert!(fx.store.reactions_on("p1").is_empty());
}

#[tokio::test]
async fn test_creator_with_existing_reaction_can_not_react() {
    let fx = Fixture::new();
    fx.store
        .reactions
        .lock()
        .unwrap()
        .insert(("alice".to_string(), "p1".to_string()), Polarity::Like);
    fx.store.posts.lock().unwrap().get_mut("p1").unwrap().likes = 1;

    for like in [true, false] {
        let result = fx.react("alice", like).await;
        assert!(
            matches!(result, Err(AppError::Forbidden(_))),
            "like = {}",
            like
        );
    }

    assert_eq!(fx.store.counters("p1"), (1, 0));
    assert_eq!(fx.store.reaction("alice", "p1"), Some(Polarity::Like));
    assert_eq!(fx.store.reactions_on("p1").len(), 1);
}

#[tokio::test]
async fn test_react_with_bad_token_is_unauthorized() {
    let fx = Fixture::new();

    let result = fx.service.react("garbage", "p1", true).await;
    assert!(matches!(result, Err(AppError::Unauthorized(ref m)) if m == "Invalid token"));
}

#[tokio::test]
async fn test_react_on_missing_post_is_not_found() {
    let fx = Fixture::new();

    let result = fx.service.react(&fx.token("bob"), "nope", true).await;
    assert!(matches!(result, Err(AppError::NotFound(ref m)) if m == "Post id not found"));
}

#[tokio::test]
async fn test_failed_reaction_write_leaves_counters_unchanged() {
    let fx = Fixture::new();
    fx.react("bob", true).await.unwrap();

    fx.store.fail_reaction_writes.store(true, Ordering::SeqCst);
    let result = fx.react("bob", false).await;

    assert!(result.is_err());
    assert_eq!(fx.store.counters("p1"), (1, 0));
    assert_eq!(fx.store.reaction("bob", "p1"), Some(Polarity::Like));
}

#[tokio::test]
async fn test_reaction_does_not_touch_updated_at() {
    let fx = Fixture::new();
    let before = fx.store.post("p1").updated_at;

    fx.react("bob", true).await.unwrap();

    assert_eq!(fx.store.post("p1").updated_at, before);
}

#[tokio::test]
async fn test_concurrent_reactions_keep_counters_consistent() {
    let fx = Fixture::new();
    let users: Vec<String> = (0..20).map(|i| format!("user-{}", i)).collect();

    let mut handles = Vec::new();
    for (i, user) in users.iter().enumerate() {
        let service = fx.service.clone();
        let token = fx.token(user);
        handles.push(tokio::spawn(async move {
            service.react(&token, "p1", i % 2 == 0).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(fx.store.counters("p1"), (10, 10));
    assert_eq!(fx.store.reactions_on("p1").len(), 20);
}

#[tokio::test]
async fn test_concurrent_duplicate_requests_from_one_user() {
    let fx = Fixture::new();
    let token = fx.token("bob");

    let mut handles = Vec::new();
    for _ in 0..4 {
        let service = fx.service.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            service.react(&token, "p1", true).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // An even number of identical toggles lands back on no reaction
    assert_eq!(fx.store.counters("p1"), (0, 0));
    assert_eq!(fx.store.reaction("bob", "p1"), None);
}

// =============================================================================
// Post CRUD
// =============================================================================

#[tokio::test]
async fn test_create_post_starts_with_zero_counters() {
    let fx = Fixture::new();

    fx.service
        .create_post(&fx.token("bob"), "novo post".to_string())
        .await
        .unwrap();

    let post = fx.store.post("p-1");
    assert_eq!(post.creator_id, "bob");
    assert_eq!(post.content, "novo post");
    assert_eq!((post.likes, post.dislikes), (0, 0));
    assert_eq!(post.created_at, post.updated_at);
}

#[tokio::test]
async fn test_create_post_with_bad_token_is_unauthorized() {
    let fx = Fixture::new();

    let result = fx.service.create_post("", "x".to_string()).await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn test_list_posts_includes_creator() {
    let fx = Fixture::new();

    let posts = fx.service.list_posts(&fx.token("bob")).await.unwrap();

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].creator.id, "alice");
    assert_eq!(posts[0].creator.name, "Alice");
}

#[tokio::test]
async fn test_list_posts_with_bad_token_is_unauthorized() {
    let fx = Fixture::new();

    let result = fx.service.list_posts("Bearer nope").await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn test_edit_refreshes_updated_at_only() {
    let fx = Fixture::new();
    {
        let mut posts = fx.store.posts.lock().unwrap();
        let post = posts.get_mut("p1").unwrap();
        post.created_at = Utc::now() - Duration::hours(1);
        post.updated_at = post.created_at;
    }
    let before = fx.store.post("p1");

    fx.service
        .edit_post(&fx.token("alice"), "p1", "editado".to_string())
        .await
        .unwrap();

    let after = fx.store.post("p1");
    assert_eq!(after.content, "editado");
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);
}

#[tokio::test]
async fn test_edit_by_other_user_is_unauthorized() {
    let fx = Fixture::new();

    let result = fx
        .service
        .edit_post(&fx.token("bob"), "p1", "hijack".to_string())
        .await;

    assert!(matches!(
        result,
        Err(AppError::Unauthorized(ref m)) if m == "Only the creator of the post can edit it"
    ));
    assert_eq!(fx.store.post("p1").content, "hello");
}

#[tokio::test]
async fn test_edit_missing_post_is_not_found() {
    let fx = Fixture::new();

    let result = fx
        .service
        .edit_post(&fx.token("alice"), "nope", "x".to_string())
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_edit_keeps_counters() {
    let fx = Fixture::new();
    fx.react("bob", true).await.unwrap();

    fx.service
        .edit_post(&fx.token("alice"), "p1", "editado".to_string())
        .await
        .unwrap();

    assert_eq!(fx.store.counters("p1"), (1, 0));
}

#[tokio::test]
async fn test_delete_by_other_user_is_forbidden() {
    let fx = Fixture::new();

    let result = fx.service.delete_post(&fx.token("bob"), "p1").await;

    assert!(matches!(
        result,
        Err(AppError::Forbidden(ref m)) if m == "Only the creator of the post can delete it"
    ));
    assert!(fx.store.posts.lock().unwrap().contains_key("p1"));
}

#[tokio::test]
async fn test_creator_deletes_post_and_its_reactions() {
    let fx = Fixture::new();
    fx.react("bob", true).await.unwrap();
    fx.react("carol", false).await.unwrap();

    fx.service.delete_post(&fx.token("alice"), "p1").await.unwrap();

    assert!(!fx.store.posts.lock().unwrap().contains_key("p1"));
    assert!(fx.store.reactions_on("p1").is_empty());
}

#[tokio::test]
async fn test_admin_can_delete_any_post() {
    let fx = Fixture::new();

    fx.service.delete_post(&fx.token("root"), "p1").await.unwrap();

    assert!(!fx.store.posts.lock().unwrap().contains_key("p1"));
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let fx = Fixture::new();

    let result = fx.service.delete_post(&fx.token("alice"), "nope").await;
    assert!(matches!(result, Err(AppError::NotFound(ref m)) if m == "Post id doesn't exist"));
}
