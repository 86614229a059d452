use async_graphql::{Context, ID, Object, Result};
use time::OffsetDateTime;
use todo_feature::TodoService;
use user_feature::UserService;

use super::errors::IntoGraphqlError;
use super::types::{CreateTodoInput, CreateUserInput, TodoType, UpdateTodoInput, UserType};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Register a new user
    async fn register_user(&self, ctx: &Context<'_>, input: CreateUserInput) -> Result<UserType> {
        let users = ctx.data::<UserService>()?;
        let user = users
            .register(user_feature::CreateUserInput {
                email: input.email,
                name: input.name,
                password: input.password,
            })
            .await
            .map_err(|e| e.into_graphql())?;
        Ok(user.into())
    }

    /// Check an email and password pair, returning the user on success
    async fn login(&self, ctx: &Context<'_>, email: String, password: String) -> Result<UserType> {
        let users = ctx.data::<UserService>()?;
        let user = users
            .verify_password(&email, &password)
            .await
            .map_err(|e| e.into_graphql())?;
        Ok(user.into())
    }

    /// Rename a user
    async fn update_user(&self, ctx: &Context<'_>, id: ID, name: String) -> Result<bool> {
        let users = ctx.data::<UserService>()?;
        users.update(&id, &name).await.map_err(|e| e.into_graphql())?;
        Ok(true)
    }

    /// Deactivate a user
    async fn delete_user(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let users = ctx.data::<UserService>()?;
        users.delete(&id).await.map_err(|e| e.into_graphql())?;
        Ok(true)
    }

    /// Create a new todo
    async fn create_todo(&self, ctx: &Context<'_>, input: CreateTodoInput) -> Result<TodoType> {
        let todos = ctx.data::<TodoService>()?;
        let todo = todos
            .create(todo_feature::CreateTodoInput {
                user_id: input.user_id,
                title: input.title,
                description: input.description,
                due_date: input.due_date,
            })
            .await
            .map_err(|e| e.into_graphql())?;
        Ok(todo.into())
    }

    /// Overwrite a todo's title, description and completion state
    async fn update_todo(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateTodoInput,
    ) -> Result<bool> {
        let todos = ctx.data::<TodoService>()?;
        todos
            .update(
                &id,
                todo_feature::UpdateTodoInput {
                    title: input.title,
                    description: input.description,
                    completed: input.completed,
                },
            )
            .await
            .map_err(|e| e.into_graphql())?;
        Ok(true)
    }

    /// Flip a todo's completion state, returning the new state
    async fn toggle_todo(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let todos = ctx.data::<TodoService>()?;
        Ok(todos.toggle_completion(&id).await.map_err(|e| e.into_graphql())?)
    }

    /// Set or clear a todo's due date
    async fn set_todo_due_date(
        &self,
        ctx: &Context<'_>,
        id: ID,
        due_date: Option<OffsetDateTime>,
    ) -> Result<bool> {
        let todos = ctx.data::<TodoService>()?;
        todos
            .set_due_date(&id, due_date)
            .await
            .map_err(|e| e.into_graphql())?;
        Ok(true)
    }

    /// Delete a todo
    async fn delete_todo(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let todos = ctx.data::<TodoService>()?;
        todos.delete(&id).await.map_err(|e| e.into_graphql())?;
        Ok(true)
    }
}
