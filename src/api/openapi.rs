//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{post_handler, user_handler};
use crate::domain::{CreatorView, PostView, UserRole, UserView};
use crate::services::TokenResponse;

/// OpenAPI documentation for Labook
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Labook",
        version = "0.1.0",
        description = "Social posting API: accounts, posts, likes and dislikes"
    ),
    servers(
        (url = "http://localhost:3003", description = "Local development server")
    ),
    paths(
        user_handler::signup,
        user_handler::login,
        user_handler::list_users,
        post_handler::list_posts,
        post_handler::create_post,
        post_handler::edit_post,
        post_handler::delete_post,
        post_handler::react,
    ),
    components(
        schemas(
            UserRole,
            UserView,
            PostView,
            CreatorView,
            TokenResponse,
            user_handler::SignupRequest,
            user_handler::LoginRequest,
            post_handler::CreatePostRequest,
            post_handler::EditPostRequest,
            post_handler::LikeRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Signup, login and the user directory"),
        (name = "Posts", description = "Posts and reactions")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for the token header
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by /users/signup or /users/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/users/signup",
            "/users/login",
            "/users",
            "/posts",
            "/posts/{id}",
            "/posts/{id}/like",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {}",
                expected
            );
        }
    }
}
