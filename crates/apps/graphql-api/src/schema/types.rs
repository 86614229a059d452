use async_graphql::{InputObject, SimpleObject};
use time::OffsetDateTime;
use uuid::Uuid;

/// GraphQL representation of a User. There is deliberately no credential field.
#[derive(SimpleObject)]
pub struct UserType {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<domain::User> for UserType {
    fn from(user: domain::User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// GraphQL representation of a Todo
#[derive(SimpleObject)]
pub struct TodoType {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub due_date: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<domain::Todo> for TodoType {
    fn from(todo: domain::Todo) -> Self {
        Self {
            id: todo.id,
            user_id: todo.user_id,
            title: todo.title,
            description: todo.description,
            completed: todo.completed,
            due_date: todo.due_date,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        }
    }
}

/// Input for registering a user
#[derive(InputObject)]
pub struct CreateUserInput {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Input for creating a todo
#[derive(InputObject)]
pub struct CreateTodoInput {
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<OffsetDateTime>,
}

/// Input for updating a todo; all fields are overwritten
#[derive(InputObject)]
pub struct UpdateTodoInput {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}
