use thiserror::Error;

#[derive(Error, Debug)]
pub enum TodoFeatureError {
    #[error("Domain error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("Todo not found: {0}")]
    NotFound(String),

    #[error("Invalid user id: {0}")]
    InvalidUserId(String),
}
