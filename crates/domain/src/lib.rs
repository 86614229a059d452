pub mod deadline;
pub mod error;
pub mod pagination;
pub mod todo;
pub mod user;

#[cfg(feature = "memory")]
pub mod memory;

pub use error::DomainError;
pub use pagination::{DEFAULT_LIMIT, MAX_LIMIT, Pagination};
pub use todo::{NewTodo, PgTodoRepository, Todo, TodoChanges, TodoRecord, TodoRepository};
pub use user::{EMAIL_ACTIVE_KEY, NewUser, PgUserRepository, User, UserRecord, UserRepository};
