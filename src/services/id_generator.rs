//! Identifier generation.

use uuid::Uuid;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Produces unique identifiers for new users and posts.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random UUID v4 identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let ids = UuidGenerator;
        assert_ne!(ids.generate(), ids.generate());
    }
}
