pub mod error;
pub mod password;
pub mod service;

pub use error::UserFeatureError;
pub use password::MIN_PASSWORD_LEN;
pub use service::{CreateUserInput, UserService, UserServiceConfig};
