//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod like_dislike;
pub mod post;
pub mod user;
