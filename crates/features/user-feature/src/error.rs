use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserFeatureError {
    #[error("Domain error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("Email already exists: {0}")]
    DuplicateEmail(String),

    /// Wrong password or unknown email; the two are never told apart
    #[error("Invalid email or password")]
    InvalidPassword,

    #[error("User is inactive")]
    UserInactive,

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}
