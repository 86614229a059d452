use async_trait::async_trait;
use sea_query::{Expr, Iden, Order, PostgresQueryBuilder, Query, SelectStatement};
use sea_query_binder::SqlxBinder;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{DomainError, Pagination};

/// Schema definition for the todos table
#[derive(Iden, Clone, Copy)]
pub enum Todos {
    Table,
    Id,
    UserId,
    Title,
    Description,
    Completed,
    DueDate,
    CreatedAt,
    UpdatedAt,
}

const TODO_COLUMNS: [Todos; 8] = [
    Todos::Id,
    Todos::UserId,
    Todos::Title,
    Todos::Description,
    Todos::Completed,
    Todos::DueDate,
    Todos::CreatedAt,
    Todos::UpdatedAt,
];

/// Raw todo row as stored.
///
/// `completed` is optional here so a malformed row can be detected instead
/// of failing the whole fetch.
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct TodoRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub due_date: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Todo entity
#[derive(Debug, Clone, PartialEq)]
pub struct Todo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub due_date: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Todo {
    /// Open, with a due date strictly before `now`
    pub fn is_overdue_at(&self, now: OffsetDateTime) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }
}

impl TryFrom<TodoRecord> for Todo {
    type Error = DomainError;

    fn try_from(row: TodoRecord) -> Result<Self, Self::Error> {
        let completed = row.completed.ok_or_else(|| {
            DomainError::Validation(format!("todo {} has no completion state", row.id))
        })?;

        Ok(Todo {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            completed,
            due_date: row.due_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Fields needed to insert a todo
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<OffsetDateTime>,
}

/// Full overwrite of a todo's mutable content
#[derive(Debug, Clone, PartialEq)]
pub struct TodoChanges {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// Persistence port for todos.
///
/// Counts returned by mutations are affected rows; `0` means nothing matched.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Insert an open todo. An unknown owner is rejected with
    /// [`DomainError::ForeignKeyViolation`] by stores that can tell.
    async fn create(&self, todo: NewTodo) -> Result<TodoRecord, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TodoRecord>, DomainError>;

    /// Find a todo only if it belongs to `user_id`
    async fn find_by_id_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TodoRecord>, DomainError>;

    /// List a user's todos newest first, optionally filtered on completion
    async fn list_by_user(
        &self,
        user_id: Uuid,
        completed: Option<bool>,
        page: Pagination,
    ) -> Result<Vec<TodoRecord>, DomainError>;

    /// Every incomplete todo of a user, unpaginated
    async fn list_open_by_user(&self, user_id: Uuid) -> Result<Vec<TodoRecord>, DomainError>;

    async fn update(&self, id: Uuid, changes: &TodoChanges) -> Result<u64, DomainError>;

    async fn set_due_date(
        &self,
        id: Uuid,
        due_date: Option<OffsetDateTime>,
    ) -> Result<u64, DomainError>;

    async fn delete(&self, id: Uuid) -> Result<u64, DomainError>;
}

/// Postgres-backed [`TodoRepository`]
#[derive(Clone)]
pub struct PgTodoRepository {
    pool: PgPool,
}

impl PgTodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn select() -> SelectStatement {
        Query::select()
            .columns(TODO_COLUMNS)
            .from(Todos::Table)
            .to_owned()
    }

    async fn fetch_all(&self, query: &SelectStatement) -> Result<Vec<TodoRecord>, DomainError> {
        let (sql, values) = query.build_sqlx(PostgresQueryBuilder);

        let rows = sqlx::query_as_with::<_, TodoRecord, _>(&sql, values)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn fetch_optional(
        &self,
        query: &SelectStatement,
    ) -> Result<Option<TodoRecord>, DomainError> {
        let (sql, values) = query.build_sqlx(PostgresQueryBuilder);

        let row = sqlx::query_as_with::<_, TodoRecord, _>(&sql, values)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }
}

#[async_trait]
impl TodoRepository for PgTodoRepository {
    async fn create(&self, todo: NewTodo) -> Result<TodoRecord, DomainError> {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();

        let (sql, values) = Query::insert()
            .into_table(Todos::Table)
            .columns(TODO_COLUMNS)
            .values_panic([
                id.into(),
                todo.user_id.into(),
                todo.title.into(),
                todo.description.into(),
                false.into(),
                todo.due_date.into(),
                now.into(),
                now.into(),
            ])
            .returning_all()
            .build_sqlx(PostgresQueryBuilder);

        let row = sqlx::query_as_with::<_, TodoRecord, _>(&sql, values)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TodoRecord>, DomainError> {
        let query = Self::select()
            .and_where(Expr::col(Todos::Id).eq(id))
            .to_owned();

        self.fetch_optional(&query).await
    }

    async fn find_by_id_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TodoRecord>, DomainError> {
        let query = Self::select()
            .and_where(Expr::col(Todos::Id).eq(id))
            .and_where(Expr::col(Todos::UserId).eq(user_id))
            .to_owned();

        self.fetch_optional(&query).await
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        completed: Option<bool>,
        page: Pagination,
    ) -> Result<Vec<TodoRecord>, DomainError> {
        let mut query = Self::select();
        query.and_where(Expr::col(Todos::UserId).eq(user_id));
        if let Some(completed) = completed {
            query.and_where(Expr::col(Todos::Completed).eq(completed));
        }
        query
            .order_by(Todos::CreatedAt, Order::Desc)
            .order_by(Todos::Id, Order::Asc)
            .limit(page.limit)
            .offset(page.offset);

        self.fetch_all(&query).await
    }

    async fn list_open_by_user(&self, user_id: Uuid) -> Result<Vec<TodoRecord>, DomainError> {
        let query = Self::select()
            .and_where(Expr::col(Todos::UserId).eq(user_id))
            .and_where(Expr::col(Todos::Completed).eq(false))
            .order_by(Todos::DueDate, Order::Asc)
            .to_owned();

        self.fetch_all(&query).await
    }

    async fn update(&self, id: Uuid, changes: &TodoChanges) -> Result<u64, DomainError> {
        let (sql, values) = Query::update()
            .table(Todos::Table)
            .values([
                (Todos::Title, changes.title.clone().into()),
                (Todos::Description, changes.description.clone().into()),
                (Todos::Completed, changes.completed.into()),
                (Todos::UpdatedAt, OffsetDateTime::now_utc().into()),
            ])
            .and_where(Expr::col(Todos::Id).eq(id))
            .build_sqlx(PostgresQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;

        Ok(result.rows_affected())
    }

    async fn set_due_date(
        &self,
        id: Uuid,
        due_date: Option<OffsetDateTime>,
    ) -> Result<u64, DomainError> {
        let (sql, values) = Query::update()
            .table(Todos::Table)
            .values([
                (Todos::DueDate, due_date.into()),
                (Todos::UpdatedAt, OffsetDateTime::now_utc().into()),
            ])
            .and_where(Expr::col(Todos::Id).eq(id))
            .build_sqlx(PostgresQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: Uuid) -> Result<u64, DomainError> {
        let (sql, values) = Query::delete()
            .from_table(Todos::Table)
            .and_where(Expr::col(Todos::Id).eq(id))
            .build_sqlx(PostgresQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;

        Ok(result.rows_affected())
    }
}
