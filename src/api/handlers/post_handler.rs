//! Post handlers. Every route expects the caller's token in `Authorization`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::{AuthToken, ValidatedJson};
use crate::api::AppState;
use crate::config::MAX_POST_CONTENT_LENGTH;
use crate::domain::PostView;
use crate::errors::AppResult;

/// New post body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    #[validate(length(
        min = 1,
        max = MAX_POST_CONTENT_LENGTH,
        message = "content must have between 1 and 480 characters"
    ))]
    #[schema(example = "Bom dia, labook!")]
    pub content: String,
}

/// Edited post body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EditPostRequest {
    #[validate(length(
        min = 1,
        max = MAX_POST_CONTENT_LENGTH,
        message = "content must have between 1 and 480 characters"
    ))]
    #[schema(example = "Boa noite, labook!")]
    pub content: String,
}

/// Reaction body: `true` likes, `false` dislikes
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LikeRequest {
    pub like: bool,
}

/// Create post routes
pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/:id", put(edit_post).delete(delete_post))
        .route("/:id/like", put(react))
}

/// List every post
#[utoipa::path(
    get,
    path = "/posts",
    tag = "Posts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All posts", body = Vec<PostView>),
        (status = 401, description = "Invalid token")
    )
)]
pub async fn list_posts(
    State(state): State<AppState>,
    token: AuthToken,
) -> AppResult<Json<Vec<PostView>>> {
    let posts = state.post_service.list_posts(token.as_str()).await?;
    Ok(Json(posts))
}

/// Publish a post
#[utoipa::path(
    post,
    path = "/posts",
    tag = "Posts",
    security(("bearer_auth" = [])),
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid token")
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    token: AuthToken,
    ValidatedJson(payload): ValidatedJson<CreatePostRequest>,
) -> AppResult<StatusCode> {
    state
        .post_service
        .create_post(token.as_str(), payload.content)
        .await?;

    Ok(StatusCode::CREATED)
}

/// Edit a post's content
#[utoipa::path(
    put,
    path = "/posts/{id}",
    tag = "Posts",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Post ID")),
    request_body = EditPostRequest,
    responses(
        (status = 200, description = "Post edited"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid token or not the creator"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn edit_post(
    State(state): State<AppState>,
    token: AuthToken,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<EditPostRequest>,
) -> AppResult<StatusCode> {
    state
        .post_service
        .edit_post(token.as_str(), &id, payload.content)
        .await?;

    Ok(StatusCode::OK)
}

/// Delete a post
#[utoipa::path(
    delete,
    path = "/posts/{id}",
    tag = "Posts",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 401, description = "Invalid token"),
        (status = 403, description = "Neither the creator nor an admin"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn delete_post(
    State(state): State<AppState>,
    token: AuthToken,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.post_service.delete_post(token.as_str(), &id).await?;
    Ok(StatusCode::OK)
}

/// Like or dislike a post
#[utoipa::path(
    put,
    path = "/posts/{id}/like",
    tag = "Posts",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Post ID")),
    request_body = LikeRequest,
    responses(
        (status = 200, description = "Reaction applied"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid token"),
        (status = 403, description = "Creators can not react to their own posts"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn react(
    State(state): State<AppState>,
    token: AuthToken,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<LikeRequest>,
) -> AppResult<StatusCode> {
    state
        .post_service
        .react(token.as_str(), &id, payload.like)
        .await?;

    Ok(StatusCode::OK)
}
