use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use domain::{DomainError, EMAIL_ACTIVE_KEY, NewUser, Pagination, User, UserRepository, deadline};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::UserFeatureError;
use crate::password::{MIN_PASSWORD_LEN, hash_password, verify_password};

/// Input for registering a new user
pub struct CreateUserInput {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Tunables for [`UserService`]
#[derive(Debug, Clone)]
pub struct UserServiceConfig {
    /// bcrypt work factor
    pub hash_cost: u32,
    /// Deadline for each repository call; `None` waits indefinitely
    pub call_timeout: Option<Duration>,
}

impl Default for UserServiceConfig {
    fn default() -> Self {
        Self {
            hash_cost: bcrypt::DEFAULT_COST,
            call_timeout: Some(Duration::from_secs(5)),
        }
    }
}

/// Service for user-related operations.
///
/// Every [`User`] it returns is built from the stored record with the
/// credential digest dropped.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    config: UserServiceConfig,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, config: UserServiceConfig) -> Self {
        Self { repo, config }
    }

    async fn call<T, F>(&self, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        deadline::within(self.config.call_timeout, fut).await
    }

    /// Register a new user with a hashed password
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: CreateUserInput) -> Result<User, UserFeatureError> {
        if input.email.is_empty() || input.name.is_empty() || input.password.is_empty() {
            return Err(UserFeatureError::InvalidInput(
                "email, name and password are required",
            ));
        }
        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(UserFeatureError::WeakPassword {
                min: MIN_PASSWORD_LEN,
            });
        }

        let password_hash = hash_password(&input.password, self.config.hash_cost).await?;

        let created = self
            .call(self.repo.create(NewUser {
                email: input.email.clone(),
                name: input.name,
                password_hash,
            }))
            .await;

        let record = match created {
            Ok(record) => record,
            Err(DomainError::UniqueViolation(key)) if key == EMAIL_ACTIVE_KEY => {
                return Err(UserFeatureError::DuplicateEmail(input.email));
            }
            Err(e) => return Err(e.into()),
        };

        info!(user_id = %record.id, "User registered");
        Ok(record.into())
    }

    /// Get an active user by ID
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<User, UserFeatureError> {
        let uuid = parse_id(id)?;

        self.call(self.repo.find_by_id(uuid))
            .await?
            .map(Into::into)
            .ok_or_else(|| UserFeatureError::NotFound(id.to_string()))
    }

    /// Get an active user by email
    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<User, UserFeatureError> {
        if email.is_empty() {
            return Err(UserFeatureError::InvalidInput("email is required"));
        }

        self.call(self.repo.find_by_email(email))
            .await?
            .filter(|record| record.is_active)
            .map(Into::into)
            .ok_or_else(|| UserFeatureError::NotFound(email.to_string()))
    }

    /// List active users; out-of-range paging values are clamped
    #[instrument(skip(self))]
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, UserFeatureError> {
        let page = Pagination::clamped(limit, offset);
        debug!(limit = page.limit, offset = page.offset, "Listing users");

        let records = self.call(self.repo.list(page)).await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Rename a user; the name is the only mutable profile field
    #[instrument(skip(self))]
    pub async fn update(&self, id: &str, name: &str) -> Result<(), UserFeatureError> {
        if id.is_empty() || name.is_empty() {
            return Err(UserFeatureError::InvalidInput("user id and name are required"));
        }
        let uuid = parse_id(id)?;

        match self.call(self.repo.update_name(uuid, name)).await? {
            0 => Err(UserFeatureError::NotFound(id.to_string())),
            _ => {
                info!("User renamed");
                Ok(())
            }
        }
    }

    /// Soft-delete a user
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), UserFeatureError> {
        let uuid = parse_id(id)?;

        match self.call(self.repo.deactivate(uuid)).await? {
            0 => Err(UserFeatureError::NotFound(id.to_string())),
            _ => {
                info!("User deactivated");
                Ok(())
            }
        }
    }

    /// Check an email and password pair.
    ///
    /// Unknown emails, failed lookups and wrong passwords all produce
    /// [`UserFeatureError::InvalidPassword`]. Only a soft-deleted account
    /// is reported distinctly.
    #[instrument(skip(self, password))]
    pub async fn verify_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, UserFeatureError> {
        if email.is_empty() || password.is_empty() {
            return Err(UserFeatureError::InvalidInput("email and password are required"));
        }

        let record = match self.call(self.repo.find_by_email(email)).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!("Login attempt for unknown email");
                return Err(UserFeatureError::InvalidPassword);
            }
            Err(e) => {
                warn!(error = %e, "User lookup failed during login");
                return Err(UserFeatureError::InvalidPassword);
            }
        };

        if !record.is_active {
            warn!(user_id = %record.id, "Login attempt for inactive user");
            return Err(UserFeatureError::UserInactive);
        }

        match verify_password(password, &record.password_hash).await {
            Ok(true) => {
                debug!(user_id = %record.id, "Password verified");
                Ok(record.into())
            }
            Ok(false) => {
                warn!(user_id = %record.id, "Wrong password");
                Err(UserFeatureError::InvalidPassword)
            }
            Err(e) => {
                warn!(user_id = %record.id, error = %e, "Stored digest could not be checked");
                Err(UserFeatureError::InvalidPassword)
            }
        }
    }
}

/// Empty ids are invalid input; ids that are not UUIDs cannot match a user
fn parse_id(id: &str) -> Result<Uuid, UserFeatureError> {
    if id.is_empty() {
        return Err(UserFeatureError::InvalidInput("user id is required"));
    }
    Uuid::parse_str(id).map_err(|_| UserFeatureError::NotFound(id.to_string()))
}
