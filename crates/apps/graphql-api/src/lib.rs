pub mod config;
pub mod schema;

use async_graphql::{EmptySubscription, Schema};
use schema::{MutationRoot, QueryRoot};
use todo_feature::TodoService;
use user_feature::UserService;

pub use config::{AppConfig, ConfigError};

/// The GraphQL schema type
pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the GraphQL schema over the given services
pub fn build_schema(users: UserService, todos: TodoService) -> AppSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(users)
        .data(todos)
        .finish()
}
