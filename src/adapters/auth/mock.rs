//! Mock token validator for testing.
//!
//! # Example
//!
//! ```ignore
//! use live_classes::adapters::auth::MockTokenValidator;
//! use live_classes::domain::foundation::UserRole;
//!
//! let validator = MockTokenValidator::new()
//!     .with_test_user("student-token", "u-1", UserRole::Student)
//!     .with_test_user("admin-token", "admin-1", UserRole::Admin);
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId, UserRole};
use crate::ports::TokenValidator;

/// Mock token validator for testing.
///
/// Stores a map of tokens to users. Tokens not in the map return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockTokenValidator {
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    /// Optional error to return for all validations (for error testing)
    force_error: RwLock<Option<AuthError>>,
}

impl MockTokenValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that maps to a user.
    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.add_token(token, user);
        self
    }

    /// Adds a valid token for a user with the given id and role.
    ///
    /// Blank ids are ignored.
    pub fn with_test_user(
        self,
        token: impl Into<String>,
        user_id: impl Into<String>,
        role: UserRole,
    ) -> Self {
        let user_id = user_id.into();
        match UserId::new(user_id.clone()) {
            Ok(id) => {
                let user = AuthenticatedUser::new(id, format!("{}@test.example.com", user_id), role);
                self.with_user(token, user)
            }
            Err(_) => self,
        }
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self
            .force_error
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(error);
        self
    }

    /// Registers a new valid token at runtime.
    pub fn add_token(&self, token: impl Into<String>, user: AuthenticatedUser) {
        self.tokens
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(token.into(), user);
    }

    /// Removes a token, making it invalid.
    pub fn remove_token(&self, token: &str) {
        self.tokens
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(token);
    }
}

#[async_trait]
impl TokenValidator for MockTokenValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = self
            .force_error
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
        {
            return Err(error);
        }

        self.tokens
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registered_token_returns_user() {
        let validator = MockTokenValidator::new().with_test_user("t-1", "u-1", UserRole::Admin);

        let user = validator.validate("t-1").await.unwrap();
        assert_eq!(user.id.as_str(), "u-1");
        assert_eq!(user.email, "u-1@test.example.com");
        assert!(user.is_staff());
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let validator = MockTokenValidator::new();
        assert!(matches!(
            validator.validate("nope").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn removed_token_is_invalid() {
        let validator = MockTokenValidator::new().with_test_user("t-1", "u-1", UserRole::Student);
        validator.remove_token("t-1");
        assert!(validator.validate("t-1").await.is_err());
    }

    #[tokio::test]
    async fn forced_error_wins() {
        let validator = MockTokenValidator::new()
            .with_test_user("t-1", "u-1", UserRole::Student)
            .with_error(AuthError::service_unavailable("down"));

        assert!(matches!(
            validator.validate("t-1").await,
            Err(AuthError::ServiceUnavailable(_))
        ));
    }
}
