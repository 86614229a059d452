use async_trait::async_trait;
use sea_query::{Expr, Iden, Order, PostgresQueryBuilder, Query};
use sea_query_binder::SqlxBinder;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{DomainError, Pagination};

/// Schema definition for the users table
#[derive(Iden, Clone, Copy)]
pub enum Users {
    Table,
    Id,
    Email,
    Name,
    PasswordHash,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

/// Partial unique index that keeps active emails unique
pub const EMAIL_ACTIVE_KEY: &str = "users_email_active_key";

const USER_COLUMNS: [Users; 7] = [
    Users::Id,
    Users::Email,
    Users::Name,
    Users::PasswordHash,
    Users::IsActive,
    Users::CreatedAt,
    Users::UpdatedAt,
];

/// User row as stored, credential digest included.
///
/// Only repositories hand these out; services convert to [`User`] before
/// anything leaves them.
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// User entity, without the credential digest
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            id: record.id,
            email: record.email,
            name: record.name,
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Fields needed to insert a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

/// Persistence port for users.
///
/// Counts returned by mutations are affected rows; `0` means nothing matched.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert an active user. A second active user with the same email is
    /// rejected with [`DomainError::UniqueViolation`].
    async fn create(&self, user: NewUser) -> Result<UserRecord, DomainError>;

    /// Find an active user by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, DomainError>;

    /// Find a user by email regardless of state, preferring the active row
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError>;

    /// List active users, newest first
    async fn list(&self, page: Pagination) -> Result<Vec<UserRecord>, DomainError>;

    /// Rename an active user
    async fn update_name(&self, id: Uuid, name: &str) -> Result<u64, DomainError>;

    /// Soft-delete an active user
    async fn deactivate(&self, id: Uuid) -> Result<u64, DomainError>;
}

/// Postgres-backed [`UserRepository`]
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn set_where_active(
        &self,
        id: Uuid,
        values: Vec<(Users, sea_query::SimpleExpr)>,
    ) -> Result<u64, DomainError> {
        let (sql, values) = Query::update()
            .table(Users::Table)
            .values(values)
            .value(Users::UpdatedAt, OffsetDateTime::now_utc())
            .and_where(Expr::col(Users::Id).eq(id))
            .and_where(Expr::col(Users::IsActive).eq(true))
            .build_sqlx(PostgresQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<UserRecord, DomainError> {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();

        let (sql, values) = Query::insert()
            .into_table(Users::Table)
            .columns(USER_COLUMNS)
            .values_panic([
                id.into(),
                user.email.into(),
                user.name.into(),
                user.password_hash.into(),
                true.into(),
                now.into(),
                now.into(),
            ])
            .returning_all()
            .build_sqlx(PostgresQueryBuilder);

        let row = sqlx::query_as_with::<_, UserRecord, _>(&sql, values)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, DomainError> {
        let (sql, values) = Query::select()
            .columns(USER_COLUMNS)
            .from(Users::Table)
            .and_where(Expr::col(Users::Id).eq(id))
            .and_where(Expr::col(Users::IsActive).eq(true))
            .build_sqlx(PostgresQueryBuilder);

        let row = sqlx::query_as_with::<_, UserRecord, _>(&sql, values)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError> {
        let (sql, values) = Query::select()
            .columns(USER_COLUMNS)
            .from(Users::Table)
            .and_where(Expr::col(Users::Email).eq(email))
            .order_by(Users::IsActive, Order::Desc)
            .order_by(Users::UpdatedAt, Order::Desc)
            .limit(1)
            .build_sqlx(PostgresQueryBuilder);

        let row = sqlx::query_as_with::<_, UserRecord, _>(&sql, values)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn list(&self, page: Pagination) -> Result<Vec<UserRecord>, DomainError> {
        let (sql, values) = Query::select()
            .columns(USER_COLUMNS)
            .from(Users::Table)
            .and_where(Expr::col(Users::IsActive).eq(true))
            .order_by(Users::CreatedAt, Order::Desc)
            .order_by(Users::Id, Order::Asc)
            .limit(page.limit)
            .offset(page.offset)
            .build_sqlx(PostgresQueryBuilder);

        let rows = sqlx::query_as_with::<_, UserRecord, _>(&sql, values)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<u64, DomainError> {
        self.set_where_active(id, vec![(Users::Name, name.into())])
            .await
    }

    async fn deactivate(&self, id: Uuid) -> Result<u64, DomainError> {
        self.set_where_active(id, vec![(Users::IsActive, false.into())])
            .await
    }
}
