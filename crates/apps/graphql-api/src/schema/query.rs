use async_graphql::{Context, ID, Object, Result};
use todo_feature::{TodoFeatureError, TodoService};
use user_feature::{UserFeatureError, UserService};

use super::errors::IntoGraphqlError;
use super::types::{TodoType, UserType};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Get an active user by ID
    async fn user(&self, ctx: &Context<'_>, id: ID) -> Result<Option<UserType>> {
        let users = ctx.data::<UserService>()?;
        match users.get(&id).await {
            Ok(user) => Ok(Some(user.into())),
            Err(UserFeatureError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into_graphql()),
        }
    }

    /// Get an active user by email
    async fn user_by_email(&self, ctx: &Context<'_>, email: String) -> Result<Option<UserType>> {
        let users = ctx.data::<UserService>()?;
        match users.get_by_email(&email).await {
            Ok(user) => Ok(Some(user.into())),
            Err(UserFeatureError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into_graphql()),
        }
    }

    /// List active users
    async fn users(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = 10)] limit: i64,
        #[graphql(default = 0)] offset: i64,
    ) -> Result<Vec<UserType>> {
        let users = ctx.data::<UserService>()?;
        let page = users.list(limit, offset).await.map_err(|e| e.into_graphql())?;
        Ok(page.into_iter().map(Into::into).collect())
    }

    /// Get a todo by ID
    async fn todo(&self, ctx: &Context<'_>, id: ID) -> Result<Option<TodoType>> {
        let todos = ctx.data::<TodoService>()?;
        match todos.get(&id).await {
            Ok(todo) => Ok(Some(todo.into())),
            Err(TodoFeatureError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into_graphql()),
        }
    }

    /// Get a todo only if it belongs to the given user
    async fn todo_for_user(
        &self,
        ctx: &Context<'_>,
        id: ID,
        user_id: ID,
    ) -> Result<Option<TodoType>> {
        let todos = ctx.data::<TodoService>()?;
        match todos.get_for_user(&id, &user_id).await {
            Ok(todo) => Ok(Some(todo.into())),
            Err(TodoFeatureError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into_graphql()),
        }
    }

    /// List todos for a user, optionally filtered on completion
    async fn todos_for_user(
        &self,
        ctx: &Context<'_>,
        user_id: ID,
        completed: Option<bool>,
        #[graphql(default = 10)] limit: i64,
        #[graphql(default = 0)] offset: i64,
    ) -> Result<Vec<TodoType>> {
        let todos = ctx.data::<TodoService>()?;
        let page = todos
            .list_for_user_filtered(&user_id, completed, limit, offset)
            .await
            .map_err(|e| e.into_graphql())?;
        Ok(page.into_iter().map(Into::into).collect())
    }

    /// Incomplete todos for a user whose due date has passed
    async fn overdue_todos(&self, ctx: &Context<'_>, user_id: ID) -> Result<Vec<TodoType>> {
        let todos = ctx.data::<TodoService>()?;
        let overdue = todos.overdue(&user_id).await.map_err(|e| e.into_graphql())?;
        Ok(overdue.into_iter().map(Into::into).collect())
    }
}
