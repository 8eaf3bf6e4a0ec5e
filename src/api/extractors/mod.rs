//! Custom request extractors.

mod auth_token;
mod validated_json;

pub use auth_token::AuthToken;
pub use validated_json::ValidatedJson;
