//! Infrastructure layer - External systems integration
//!
//! - Database connection and migrations
//! - Repositories (the persistence gateway)
//! - Unit of Work for repository access
//! - Keyed locks for serializing reactions

pub mod db;
pub mod locks;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use locks::{LockGuard, LockRegistry};
pub use repositories::{PostRepository, PostStore, UserRepository, UserStore};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockPostRepository, MockUserRepository};
