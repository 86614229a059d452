//! bcrypt digests, computed off the async executor.

use crate::error::UserFeatureError;

/// Minimum password length in bytes
pub const MIN_PASSWORD_LEN: usize = 8;

pub async fn hash_password(password: &str, cost: u32) -> Result<String, UserFeatureError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| UserFeatureError::Hashing(e.to_string()))?
        .map_err(|e| UserFeatureError::Hashing(e.to_string()))
}

/// `Ok(false)` on mismatch; a digest bcrypt cannot parse is an error
pub async fn verify_password(password: &str, digest: &str) -> Result<bool, UserFeatureError> {
    let password = password.to_owned();
    let digest = digest.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &digest))
        .await
        .map_err(|e| UserFeatureError::Hashing(e.to_string()))?
        .map_err(|e| UserFeatureError::Hashing(e.to_string()))
}
