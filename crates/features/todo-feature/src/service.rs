use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use domain::{
    DomainError, NewTodo, Pagination, Todo, TodoChanges, TodoRecord, TodoRepository, deadline,
};
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::TodoFeatureError;

/// Input for creating a new todo
pub struct CreateTodoInput {
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<OffsetDateTime>,
}

/// Input for updating a todo. Every field overwrites the stored value.
pub struct UpdateTodoInput {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// Tunables for [`TodoService`]
#[derive(Debug, Clone)]
pub struct TodoServiceConfig {
    /// Deadline for each repository call; `None` waits indefinitely
    pub call_timeout: Option<Duration>,
}

impl Default for TodoServiceConfig {
    fn default() -> Self {
        Self {
            call_timeout: Some(Duration::from_secs(5)),
        }
    }
}

/// Service for todo-related operations.
///
/// Ownership is not checked implicitly: callers that act on behalf of a user
/// should go through [`TodoService::get_for_user`] first.
#[derive(Clone)]
pub struct TodoService {
    repo: Arc<dyn TodoRepository>,
    config: TodoServiceConfig,
}

impl TodoService {
    pub fn new(repo: Arc<dyn TodoRepository>, config: TodoServiceConfig) -> Self {
        Self { repo, config }
    }

    async fn call<T, F>(&self, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        deadline::within(self.config.call_timeout, fut).await
    }

    /// Create a new, incomplete todo for a user
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn create(&self, input: CreateTodoInput) -> Result<Todo, TodoFeatureError> {
        if input.user_id.is_empty() || input.title.is_empty() {
            return Err(TodoFeatureError::InvalidInput("user id and title are required"));
        }
        let user_id = parse_user_id(&input.user_id)?;

        let created = self
            .call(self.repo.create(NewTodo {
                user_id,
                title: input.title,
                description: input.description,
                due_date: input.due_date,
            }))
            .await;

        let record = match created {
            Ok(record) => record,
            Err(DomainError::ForeignKeyViolation(_)) => {
                return Err(TodoFeatureError::InvalidUserId(input.user_id));
            }
            Err(e) => return Err(e.into()),
        };

        info!(todo_id = %record.id, "Todo created");
        to_todo(record)
    }

    /// Get a todo by ID
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Todo, TodoFeatureError> {
        let uuid = parse_id(id)?;

        match self.call(self.repo.find_by_id(uuid)).await? {
            Some(record) => to_todo(record),
            None => Err(TodoFeatureError::NotFound(id.to_string())),
        }
    }

    /// Get a todo only if it belongs to `user_id`.
    ///
    /// A todo owned by someone else is reported as not found.
    #[instrument(skip(self))]
    pub async fn get_for_user(&self, id: &str, user_id: &str) -> Result<Todo, TodoFeatureError> {
        if id.is_empty() || user_id.is_empty() {
            return Err(TodoFeatureError::InvalidInput("todo id and user id are required"));
        }
        let uuid = parse_id(id)?;
        let owner = parse_user_id(user_id)?;

        match self.call(self.repo.find_by_id_for_user(uuid, owner)).await? {
            Some(record) => to_todo(record),
            None => Err(TodoFeatureError::NotFound(id.to_string())),
        }
    }

    /// List a user's todos; out-of-range paging values are clamped
    pub async fn list_for_user(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Todo>, TodoFeatureError> {
        self.list_for_user_filtered(user_id, None, limit, offset)
            .await
    }

    /// List a user's todos, keeping only those whose completion state
    /// equals `completed` when it is given
    #[instrument(skip(self))]
    pub async fn list_for_user_filtered(
        &self,
        user_id: &str,
        completed: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Todo>, TodoFeatureError> {
        if user_id.is_empty() {
            return Err(TodoFeatureError::InvalidInput("user id is required"));
        }
        let owner = parse_user_id(user_id)?;
        let page = Pagination::clamped(limit, offset);
        debug!(limit = page.limit, offset = page.offset, "Listing todos");

        let records = self
            .call(self.repo.list_by_user(owner, completed, page))
            .await?;

        records.into_iter().map(to_todo).collect()
    }

    /// Overwrite a todo's title, description and completion state
    #[instrument(skip(self, input), fields(completed = input.completed))]
    pub async fn update(&self, id: &str, input: UpdateTodoInput) -> Result<(), TodoFeatureError> {
        if id.is_empty() || input.title.is_empty() {
            return Err(TodoFeatureError::InvalidInput("todo id and title are required"));
        }
        let uuid = parse_id(id)?;

        let changes = TodoChanges {
            title: input.title,
            description: input.description,
            completed: input.completed,
        };

        match self.call(self.repo.update(uuid, &changes)).await? {
            0 => Err(TodoFeatureError::NotFound(id.to_string())),
            _ => {
                info!("Todo updated");
                Ok(())
            }
        }
    }

    /// Set or clear a todo's due date
    #[instrument(skip(self))]
    pub async fn set_due_date(
        &self,
        id: &str,
        due_date: Option<OffsetDateTime>,
    ) -> Result<(), TodoFeatureError> {
        let uuid = parse_id(id)?;

        match self.call(self.repo.set_due_date(uuid, due_date)).await? {
            0 => Err(TodoFeatureError::NotFound(id.to_string())),
            _ => Ok(()),
        }
    }

    /// Delete a todo permanently
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), TodoFeatureError> {
        let uuid = parse_id(id)?;

        match self.call(self.repo.delete(uuid)).await? {
            0 => Err(TodoFeatureError::NotFound(id.to_string())),
            _ => {
                info!("Todo deleted");
                Ok(())
            }
        }
    }

    /// A user's incomplete todos whose due date has already passed
    pub async fn overdue(&self, user_id: &str) -> Result<Vec<Todo>, TodoFeatureError> {
        self.overdue_at(user_id, OffsetDateTime::now_utc()).await
    }

    /// A user's incomplete todos due strictly before `now`.
    ///
    /// Todos without a due date are never overdue.
    #[instrument(skip(self))]
    pub async fn overdue_at(
        &self,
        user_id: &str,
        now: OffsetDateTime,
    ) -> Result<Vec<Todo>, TodoFeatureError> {
        if user_id.is_empty() {
            return Err(TodoFeatureError::InvalidInput("user id is required"));
        }
        let owner = parse_user_id(user_id)?;

        let records = self.call(self.repo.list_open_by_user(owner)).await?;

        let mut overdue = Vec::new();
        for record in records {
            let todo = to_todo(record)?;
            if todo.is_overdue_at(now) {
                overdue.push(todo);
            }
        }
        Ok(overdue)
    }

    /// Flip a todo's completion state and return the new value.
    ///
    /// This reads then writes with no guard between the two calls, so two
    /// concurrent toggles of the same todo can both read the same state and
    /// one flip is lost.
    #[instrument(skip(self))]
    pub async fn toggle_completion(&self, id: &str) -> Result<bool, TodoFeatureError> {
        let uuid = parse_id(id)?;

        let record = self
            .call(self.repo.find_by_id(uuid))
            .await?
            .ok_or_else(|| TodoFeatureError::NotFound(id.to_string()))?;

        let Some(completed) = record.completed else {
            warn!("Stored todo has no completion state");
            return Err(TodoFeatureError::InvalidInput(
                "stored todo has no completion state",
            ));
        };

        let changes = TodoChanges {
            title: record.title,
            description: record.description,
            completed: !completed,
        };

        match self.call(self.repo.update(uuid, &changes)).await? {
            0 => Err(TodoFeatureError::NotFound(id.to_string())),
            _ => {
                info!(completed = changes.completed, "Todo toggled");
                Ok(changes.completed)
            }
        }
    }
}

fn to_todo(record: TodoRecord) -> Result<Todo, TodoFeatureError> {
    Todo::try_from(record).map_err(|e| {
        warn!(error = %e, "Malformed todo record");
        TodoFeatureError::InvalidInput("stored todo is malformed")
    })
}

/// Empty ids are invalid input; ids that are not UUIDs cannot match a todo
fn parse_id(id: &str) -> Result<Uuid, TodoFeatureError> {
    if id.is_empty() {
        return Err(TodoFeatureError::InvalidInput("todo id is required"));
    }
    Uuid::parse_str(id).map_err(|_| TodoFeatureError::NotFound(id.to_string()))
}

fn parse_user_id(user_id: &str) -> Result<Uuid, TodoFeatureError> {
    Uuid::parse_str(user_id).map_err(|_| TodoFeatureError::InvalidUserId(user_id.to_string()))
}
