//! Maps feature errors onto GraphQL errors with a stable `code` extension.
//!
//! Storage and other unexpected failures are logged and reported with an
//! opaque message.

use async_graphql::{Error, ErrorExtensions};
use todo_feature::TodoFeatureError;
use user_feature::UserFeatureError;

fn coded(code: &'static str, message: String) -> Error {
    Error::new(message).extend_with(|_, ext| ext.set("code", code))
}

/// Conversion of a feature error into a coded GraphQL error.
pub(crate) trait IntoGraphqlError {
    fn into_graphql(&self) -> Error;
}

fn internal(err: &dyn std::error::Error) -> Error {
    tracing::error!(error = %err, "Request failed");
    coded("INTERNAL", "Internal server error".to_string())
}

impl IntoGraphqlError for UserFeatureError {
    fn into_graphql(&self) -> Error {
        match self {
            UserFeatureError::InvalidInput(_) => coded("INVALID_INPUT", self.to_string()),
            UserFeatureError::NotFound(_) => coded("NOT_FOUND", self.to_string()),
            UserFeatureError::WeakPassword { .. } => coded("WEAK_PASSWORD", self.to_string()),
            UserFeatureError::DuplicateEmail(_) => {
                coded("DUPLICATE_EMAIL", "Email already exists".to_string())
            }
            UserFeatureError::InvalidPassword => {
                coded("INVALID_CREDENTIALS", self.to_string())
            }
            UserFeatureError::UserInactive => coded("USER_INACTIVE", self.to_string()),
            UserFeatureError::Domain(_) | UserFeatureError::Hashing(_) => internal(self),
        }
    }
}

impl IntoGraphqlError for TodoFeatureError {
    fn into_graphql(&self) -> Error {
        match self {
            TodoFeatureError::InvalidInput(_) => coded("INVALID_INPUT", self.to_string()),
            TodoFeatureError::NotFound(_) => coded("NOT_FOUND", self.to_string()),
            TodoFeatureError::InvalidUserId(_) => coded("INVALID_USER_ID", self.to_string()),
            TodoFeatureError::Domain(_) => internal(self),
        }
    }
}
