//! Application state shared by every handler.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Database;
use crate::services::{PostService, ServiceContainer, Services, UserService};

/// Application state containing all services.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    pub post_service: Arc<dyn PostService>,
    /// Database handle, used by the health check
    pub database: Arc<Database>,
}

impl AppState {
    /// Wire the services through the composition root.
    pub fn from_config(database: Arc<Database>, config: &Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config);
        Self::from_container(&container, database)
    }

    /// Build state from any service container.
    pub fn from_container(container: &dyn ServiceContainer, database: Arc<Database>) -> Self {
        Self {
            user_service: container.users(),
            post_service: container.posts(),
            database,
        }
    }

    /// Create state with manually injected services.
    pub fn new(
        user_service: Arc<dyn UserService>,
        post_service: Arc<dyn PostService>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            user_service,
            post_service,
            database,
        }
    }
}
