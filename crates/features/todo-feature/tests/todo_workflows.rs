//! Workflow tests for the Todo feature
//!
//! Multi-step user workflows, concurrent toggles and repository failures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::memory::InMemoryTodoRepository;
use domain::{DomainError, NewTodo, Pagination, TodoChanges, TodoRecord, TodoRepository};
use time::OffsetDateTime;
use todo_feature::{
    CreateTodoInput, TodoFeatureError, TodoService, TodoServiceConfig, UpdateTodoInput,
};
use tokio::sync::Barrier;
use uuid::Uuid;

// =============================================================================
// Full Lifecycle Workflow
// =============================================================================

#[tokio::test]
async fn todo_lifecycle_from_creation_to_deletion() -> Result<(), TodoFeatureError> {
    let service = TodoService::new(
        Arc::new(InMemoryTodoRepository::new()),
        TodoServiceConfig::default(),
    );
    let user_id = Uuid::new_v4();

    // Given a new todo
    let todo = service
        .create(CreateTodoInput {
            user_id: user_id.to_string(),
            title: "Buy milk".to_string(),
            description: Some(String::new()),
            due_date: None,
        })
        .await?;
    assert!(!todo.completed);
    let id = todo.id.to_string();

    // When it is toggled twice
    service.toggle_completion(&id).await?;
    assert!(service.get(&id).await?.completed);
    service.toggle_completion(&id).await?;
    assert!(!service.get(&id).await?.completed);

    // And updated in full
    service
        .update(
            &id,
            UpdateTodoInput {
                title: "Buy milk 2%".to_string(),
                description: Some(String::new()),
                completed: true,
            },
        )
        .await?;
    let updated = service.get(&id).await?;
    assert_eq!(updated.title, "Buy milk 2%");
    assert!(updated.completed);

    // Then deleting it makes it unreachable
    service.delete(&id).await?;
    assert!(matches!(
        service.get(&id).await,
        Err(TodoFeatureError::NotFound(_))
    ));
    Ok(())
}

// =============================================================================
// Concurrent Toggle Race
// =============================================================================

/// Holds every reader at a barrier so two toggles both read before either writes
struct SynchronizedReads {
    inner: InMemoryTodoRepository,
    reads: Barrier,
}

#[async_trait]
impl TodoRepository for SynchronizedReads {
    async fn create(&self, todo: NewTodo) -> Result<TodoRecord, DomainError> {
        self.inner.create(todo).await
    }
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TodoRecord>, DomainError> {
        let found = self.inner.find_by_id(id).await;
        self.reads.wait().await;
        found
    }
    async fn find_by_id_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TodoRecord>, DomainError> {
        self.inner.find_by_id_for_user(id, user_id).await
    }
    async fn list_by_user(
        &self,
        user_id: Uuid,
        completed: Option<bool>,
        page: Pagination,
    ) -> Result<Vec<TodoRecord>, DomainError> {
        self.inner.list_by_user(user_id, completed, page).await
    }
    async fn list_open_by_user(&self, user_id: Uuid) -> Result<Vec<TodoRecord>, DomainError> {
        self.inner.list_open_by_user(user_id).await
    }
    async fn update(&self, id: Uuid, changes: &TodoChanges) -> Result<u64, DomainError> {
        self.inner.update(id, changes).await
    }
    async fn set_due_date(
        &self,
        id: Uuid,
        due_date: Option<OffsetDateTime>,
    ) -> Result<u64, DomainError> {
        self.inner.set_due_date(id, due_date).await
    }
    async fn delete(&self, id: Uuid) -> Result<u64, DomainError> {
        self.inner.delete(id).await
    }
}

#[tokio::test]
async fn concurrent_toggles_can_lose_an_update() -> Result<(), TodoFeatureError> {
    let repo = Arc::new(SynchronizedReads {
        inner: InMemoryTodoRepository::new(),
        reads: Barrier::new(2),
    });
    let service = TodoService::new(repo.clone(), TodoServiceConfig::default());
    let todo = repo
        .inner
        .create(NewTodo {
            user_id: Uuid::new_v4(),
            title: "Racy".to_string(),
            description: None,
            due_date: None,
        })
        .await?;
    let id = todo.id.to_string();

    // Both toggles read `completed = false` before either writes
    let (first, second) = tokio::join!(
        service.toggle_completion(&id),
        service.toggle_completion(&id)
    );

    // Each one believes it flipped the todo to complete
    assert!(first?);
    assert!(second?);

    // Two toggles should have restored `false`; one flip was lost
    let stored = repo.inner.find_by_id(todo.id).await?.unwrap();
    assert_eq!(stored.completed, Some(true));
    Ok(())
}

// =============================================================================
// Repository Failures
// =============================================================================

/// Repository whose calls never complete, like a stalled database
struct StalledRepository;

#[async_trait]
impl TodoRepository for StalledRepository {
    async fn create(&self, _todo: NewTodo) -> Result<TodoRecord, DomainError> {
        std::future::pending().await
    }
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<TodoRecord>, DomainError> {
        std::future::pending().await
    }
    async fn find_by_id_for_user(
        &self,
        _id: Uuid,
        _user_id: Uuid,
    ) -> Result<Option<TodoRecord>, DomainError> {
        std::future::pending().await
    }
    async fn list_by_user(
        &self,
        _user_id: Uuid,
        _completed: Option<bool>,
        _page: Pagination,
    ) -> Result<Vec<TodoRecord>, DomainError> {
        std::future::pending().await
    }
    async fn list_open_by_user(&self, _user_id: Uuid) -> Result<Vec<TodoRecord>, DomainError> {
        std::future::pending().await
    }
    async fn update(&self, _id: Uuid, _changes: &TodoChanges) -> Result<u64, DomainError> {
        std::future::pending().await
    }
    async fn set_due_date(
        &self,
        _id: Uuid,
        _due_date: Option<OffsetDateTime>,
    ) -> Result<u64, DomainError> {
        std::future::pending().await
    }
    async fn delete(&self, _id: Uuid) -> Result<u64, DomainError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn stalled_repository_calls_stop_at_the_deadline() {
    let service = TodoService::new(
        Arc::new(StalledRepository),
        TodoServiceConfig {
            call_timeout: Some(Duration::from_millis(20)),
        },
    );
    let id = Uuid::new_v4().to_string();

    let toggled = service.toggle_completion(&id).await;
    let overdue = service.overdue(&id).await;

    assert!(matches!(
        toggled,
        Err(TodoFeatureError::Domain(DomainError::DeadlineExceeded(_)))
    ));
    assert!(matches!(
        overdue,
        Err(TodoFeatureError::Domain(DomainError::DeadlineExceeded(_)))
    ));
}

#[tokio::test]
async fn dropping_the_call_cancels_it() {
    let service = TodoService::new(
        Arc::new(StalledRepository),
        TodoServiceConfig { call_timeout: None },
    );
    let id = Uuid::new_v4().to_string();

    // The caller's own timeout drops the service future mid-call
    let result =
        tokio::time::timeout(Duration::from_millis(20), service.get(&id)).await;

    assert!(result.is_err());
}
