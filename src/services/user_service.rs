//! User service - signup, login and the user directory.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::{HashManager, IdGenerator, TokenManager};
use crate::domain::{User, UserView};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Token issued on signup and login
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
}

/// User service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Register a new account and return its token
    async fn signup(&self, name: String, email: String, password: String)
        -> AppResult<TokenResponse>;

    /// Exchange credentials for a token
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// List users, optionally filtered by a case-insensitive name fragment
    async fn list_users(&self, query: Option<String>) -> AppResult<Vec<UserView>>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
    ids: Arc<dyn IdGenerator>,
    hasher: Arc<dyn HashManager>,
    tokens: Arc<dyn TokenManager>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(
        uow: Arc<U>,
        ids: Arc<dyn IdGenerator>,
        hasher: Arc<dyn HashManager>,
        tokens: Arc<dyn TokenManager>,
    ) -> Self {
        Self {
            uow,
            ids,
            hasher,
            tokens,
        }
    }

    fn issue_token(&self, user: &User) -> AppResult<TokenResponse> {
        let token = self.tokens.create_token(&user.token_payload())?;
        Ok(TokenResponse { token })
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn signup(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> AppResult<TokenResponse> {
        let users = self.uow.users();

        if users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("email already exists"));
        }

        let password_hash = self.hasher.hash(&password)?;
        let user = User::new(self.ids.generate(), name, email, password_hash);
        users.create(&user).await?;

        tracing::info!(user_id = %user.id, "User signed up");
        self.issue_token(&user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user = self
            .uow
            .users()
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::not_found("Email not found"))?;

        if !self.hasher.compare(&password, &user.password_hash) {
            tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AppError::bad_request("Incorrect email or password"));
        }

        tracing::debug!(user_id = %user.id, "User logged in");
        self.issue_token(&user)
    }

    async fn list_users(&self, query: Option<String>) -> AppResult<Vec<UserView>> {
        let users = self.uow.users().list(query).await?;
        Ok(users.into_iter().map(UserView::from).collect())
    }
}
