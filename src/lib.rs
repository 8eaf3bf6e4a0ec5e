//! Labook - a small social posting API.
//!
//! Users sign up and log in to obtain a token, publish short posts, and like
//! or dislike each other's posts. Reactions are reconciled so that each user
//! holds at most one reaction per post and the counters on the post always
//! agree with the stored reactions.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Users, posts and the reaction transition table
//! - **services**: Use cases (accounts, posts, reactions) and their collaborators
//! - **infra**: Database, repositories and keyed locks
//! - **api**: HTTP handlers, extractors and routes
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Post, User, UserRole};
pub use errors::{AppError, AppResult};
