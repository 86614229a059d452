//! In-memory repository adapters.
//!
//! They follow the same rules as the Postgres adapters (unique active email,
//! newest-first ordering, soft-deleted users hidden) so service behaviour can
//! be exercised without a database.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    DomainError, EMAIL_ACTIVE_KEY, NewTodo, NewUser, Pagination, TodoChanges, TodoRecord,
    TodoRepository, UserRecord, UserRepository,
};

fn lock<T>(rows: &Mutex<Vec<T>>) -> MutexGuard<'_, Vec<T>> {
    // Rows are replaced whole, so a poisoned lock still guards consistent data
    rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Newest first, ties broken by id
fn page_of<T: Clone>(
    mut rows: Vec<T>,
    key: impl Fn(&T) -> (OffsetDateTime, Uuid),
    page: Pagination,
) -> Vec<T> {
    rows.sort_by(|a, b| {
        let (a_at, a_id) = key(a);
        let (b_at, b_id) = key(b);
        b_at.cmp(&a_at).then(a_id.cmp(&b_id))
    });
    rows.into_iter()
        .skip(usize::try_from(page.offset).unwrap_or(usize::MAX))
        .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
        .collect()
}

/// Mutex-guarded [`UserRepository`]
#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<Vec<UserRecord>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored row, soft-deleted ones included
    pub fn records(&self) -> Vec<UserRecord> {
        lock(&self.rows).clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<UserRecord, DomainError> {
        let mut rows = lock(&self.rows);
        if rows.iter().any(|r| r.is_active && r.email == user.email) {
            return Err(DomainError::UniqueViolation(EMAIL_ACTIVE_KEY.to_string()));
        }

        let now = OffsetDateTime::now_utc();
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        rows.push(record.clone());

        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, DomainError> {
        Ok(lock(&self.rows)
            .iter()
            .find(|r| r.id == id && r.is_active)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError> {
        let rows = lock(&self.rows);
        let mut matches: Vec<&UserRecord> = rows.iter().filter(|r| r.email == email).collect();
        matches.sort_by(|a, b| {
            b.is_active
                .cmp(&a.is_active)
                .then(b.updated_at.cmp(&a.updated_at))
        });

        Ok(matches.first().map(|r| (*r).clone()))
    }

    async fn list(&self, page: Pagination) -> Result<Vec<UserRecord>, DomainError> {
        let active: Vec<UserRecord> = lock(&self.rows)
            .iter()
            .filter(|r| r.is_active)
            .cloned()
            .collect();

        Ok(page_of(active, |r| (r.created_at, r.id), page))
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<u64, DomainError> {
        let mut rows = lock(&self.rows);
        match rows.iter_mut().find(|r| r.id == id && r.is_active) {
            Some(row) => {
                row.name = name.to_string();
                row.updated_at = OffsetDateTime::now_utc();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn deactivate(&self, id: Uuid) -> Result<u64, DomainError> {
        let mut rows = lock(&self.rows);
        match rows.iter_mut().find(|r| r.id == id && r.is_active) {
            Some(row) => {
                row.is_active = false;
                row.updated_at = OffsetDateTime::now_utc();
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

/// Mutex-guarded [`TodoRepository`].
///
/// Owners are not checked; there is no users table to reference.
#[derive(Default)]
pub struct InMemoryTodoRepository {
    rows: Mutex<Vec<TodoRecord>>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a row exactly as given, bypassing the insert defaults
    pub fn insert_record(&self, record: TodoRecord) {
        lock(&self.rows).push(record);
    }

    fn modify(&self, id: Uuid, apply: impl FnOnce(&mut TodoRecord)) -> u64 {
        let mut rows = lock(&self.rows);
        match rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                apply(row);
                row.updated_at = OffsetDateTime::now_utc();
                1
            }
            None => 0,
        }
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn create(&self, todo: NewTodo) -> Result<TodoRecord, DomainError> {
        let now = OffsetDateTime::now_utc();
        let record = TodoRecord {
            id: Uuid::new_v4(),
            user_id: todo.user_id,
            title: todo.title,
            description: todo.description,
            completed: Some(false),
            due_date: todo.due_date,
            created_at: now,
            updated_at: now,
        };
        lock(&self.rows).push(record.clone());

        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TodoRecord>, DomainError> {
        Ok(lock(&self.rows).iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_id_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TodoRecord>, DomainError> {
        Ok(lock(&self.rows)
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        completed: Option<bool>,
        page: Pagination,
    ) -> Result<Vec<TodoRecord>, DomainError> {
        let owned: Vec<TodoRecord> = lock(&self.rows)
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter(|r| completed.is_none() || r.completed == completed)
            .cloned()
            .collect();

        Ok(page_of(owned, |r| (r.created_at, r.id), page))
    }

    async fn list_open_by_user(&self, user_id: Uuid) -> Result<Vec<TodoRecord>, DomainError> {
        Ok(lock(&self.rows)
            .iter()
            .filter(|r| r.user_id == user_id && r.completed == Some(false))
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, changes: &TodoChanges) -> Result<u64, DomainError> {
        Ok(self.modify(id, |row| {
            row.title = changes.title.clone();
            row.description = changes.description.clone();
            row.completed = Some(changes.completed);
        }))
    }

    async fn set_due_date(
        &self,
        id: Uuid,
        due_date: Option<OffsetDateTime>,
    ) -> Result<u64, DomainError> {
        Ok(self.modify(id, |row| row.due_date = due_date))
    }

    async fn delete(&self, id: Uuid) -> Result<u64, DomainError> {
        let mut rows = lock(&self.rows);
        let before = rows.len();
        rows.retain(|r| r.id != id);

        Ok((before - rows.len()) as u64)
    }
}
