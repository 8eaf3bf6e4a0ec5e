//! Application services layer - Use cases and business logic.

pub mod container;
pub mod hash_manager;
pub mod id_generator;
pub mod post_service;
pub mod token_manager;
pub mod user_service;

pub use container::{ServiceContainer, Services};
pub use hash_manager::{Argon2HashManager, HashManager};
pub use id_generator::{IdGenerator, UuidGenerator};
pub use post_service::{PostManager, PostService};
pub use token_manager::{Claims, JwtTokenManager, TokenManager};
pub use user_service::{TokenResponse, UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use hash_manager::MockHashManager;
#[cfg(any(test, feature = "test-utils"))]
pub use id_generator::MockIdGenerator;
#[cfg(any(test, feature = "test-utils"))]
pub use post_service::MockPostService;
#[cfg(any(test, feature = "test-utils"))]
pub use token_manager::MockTokenManager;
#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;
