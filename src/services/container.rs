//! Service container - the composition root.
//!
//! Builds the persistence gateway and the token, credential and identifier
//! collaborators once, and injects them into the domain services.

use std::sync::Arc;

use super::{
    Argon2HashManager, JwtTokenManager, PostManager, PostService, UserManager, UserService,
    UuidGenerator,
};
use crate::config::Config;
use crate::infra::{LockRegistry, Persistence};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;

    /// Get post service
    fn posts(&self) -> Arc<dyn PostService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    user_service: Arc<dyn UserService>,
    post_service: Arc<dyn PostService>,
}

impl Services {
    /// Create a container from already-built services
    pub fn new(user_service: Arc<dyn UserService>, post_service: Arc<dyn PostService>) -> Self {
        Self {
            user_service,
            post_service,
        }
    }

    /// Wire every service against a database connection
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: &Config) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let ids = Arc::new(UuidGenerator);
        let tokens = Arc::new(JwtTokenManager::new(config));

        let user_service = Arc::new(UserManager::new(
            uow.clone(),
            ids.clone(),
            Arc::new(Argon2HashManager::new()),
            tokens.clone(),
        ));
        let post_service = Arc::new(PostManager::new(uow, ids, tokens, LockRegistry::new()));

        Self::new(user_service, post_service)
    }
}

impl ServiceContainer for Services {
    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn posts(&self) -> Arc<dyn PostService> {
        self.post_service.clone()
    }
}
