//! Domain layer - Core business entities and logic
//!
//! Plain value types for users, posts and reactions, plus the pure
//! like/dislike transition table. Nothing here touches the database.

pub mod post;
pub mod reaction;
pub mod user;

pub use post::{CreatorView, Post, PostView, PostWithCreator};
pub use reaction::{reconcile, CounterDelta, Polarity, ReactionChange, ReactionState, ReactionWrite};
pub use user::{TokenPayload, User, UserRole, UserView};
