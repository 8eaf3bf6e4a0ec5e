//! User handlers: signup, login and the user directory.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::{MIN_NAME_LENGTH, MIN_PASSWORD_LENGTH};
use crate::domain::UserView;
use crate::errors::AppResult;
use crate::services::TokenResponse;

/// Signup request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(length(min = MIN_NAME_LENGTH, message = "name must have at least 2 characters"))]
    #[schema(example = "Beltrano")]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "beltrano@email.com")]
    pub email: String,
    #[validate(length(min = MIN_PASSWORD_LENGTH, message = "password must have at least 6 characters"))]
    #[schema(example = "beltrano00", min_length = 6)]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "beltrano@email.com")]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    #[schema(example = "beltrano00")]
    pub password: String,
}

/// Name filter for the user directory
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Case-insensitive fragment of the user name
    pub q: Option<String>,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/signup", post(signup))
        .route("/login", post(login))
}

/// Create an account
#[utoipa::path(
    post,
    path = "/users/signup",
    tag = "Users",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    let token = state
        .user_service
        .signup(payload.name, payload.email, payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(token)))
}

/// Login and get a token
#[utoipa::path(
    post,
    path = "/users/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error or wrong password"),
        (status = 404, description = "Email not found")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .user_service
        .login(payload.email, payload.password)
        .await?;

    Ok(Json(token))
}

/// List users
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Matching users", body = Vec<UserView>)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<Json<Vec<UserView>>> {
    let users = state.user_service.list_users(query.q).await?;
    Ok(Json(users))
}
