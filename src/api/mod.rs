//! API layer - HTTP handlers and extractors
//!
//! - Request handlers and their routes
//! - Custom extractors (validated JSON, raw auth token)
//! - OpenAPI document

pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
