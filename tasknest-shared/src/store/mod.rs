/// Storage traits and backends
///
/// The HTTP layer and the auth service talk to storage only through these
/// traits. Two backends implement them:
///
/// - [`postgres::PgStore`]: production backend on a sqlx `PgPool`
/// - [`memory::MemoryStore`]: process-local backend for tests and local runs
///
/// Every method on an owned resource takes an [`OwnerScope`] and must not read
/// or modify rows outside it. "Not found" is `Ok(None)` (lookups and updates)
/// or `Ok(0)` rows affected (deletes); the caller turns those into
/// [`AuthzError`](crate::auth::authorization::AuthzError).

use async_trait::async_trait;

use crate::auth::authorization::OwnerScope;
use crate::models::category::{Category, CreateCategory};
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::user::{CreateUser, User, USERNAME_UNIQUE_CONSTRAINT};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Username uniqueness constraint rejected the insert
    #[error("Username already exists")]
    DuplicateUsername,

    /// Any other backend failure
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation()
                && db_err.constraint() == Some(USERNAME_UNIQUE_CONSTRAINT)
            {
                return StoreError::DuplicateUsername;
            }
        }
        StoreError::Database(err.to_string())
    }
}

/// Identity persistence
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Looks up an identity by exact username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Inserts a new identity
    ///
    /// Fails with `StoreError::DuplicateUsername` if the username is taken,
    /// including when a concurrent insert won the race.
    async fn insert_user(&self, data: CreateUser) -> Result<User, StoreError>;
}

/// Task persistence, always owner-scoped
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Creates a task; `None` if `category_id` is not a category inside `scope`
    async fn create_task(
        &self,
        scope: &OwnerScope,
        data: CreateTask,
    ) -> Result<Option<Task>, StoreError>;

    async fn find_task(&self, scope: &OwnerScope, id: i64) -> Result<Option<Task>, StoreError>;

    /// Newest first, optionally filtered by category
    async fn list_tasks(
        &self,
        scope: &OwnerScope,
        category_id: Option<i64>,
    ) -> Result<Vec<Task>, StoreError>;

    /// Replaces a task; `None` if the task or the new category is outside `scope`
    async fn update_task(
        &self,
        scope: &OwnerScope,
        id: i64,
        data: UpdateTask,
    ) -> Result<Option<Task>, StoreError>;

    async fn set_task_completed(
        &self,
        scope: &OwnerScope,
        id: i64,
        completed: bool,
    ) -> Result<Option<Task>, StoreError>;

    /// Rows deleted (0 or 1)
    async fn delete_task(&self, scope: &OwnerScope, id: i64) -> Result<u64, StoreError>;
}

/// Category persistence, always owner-scoped
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn create_category(
        &self,
        scope: &OwnerScope,
        data: CreateCategory,
    ) -> Result<Category, StoreError>;

    async fn find_category(
        &self,
        scope: &OwnerScope,
        id: i64,
    ) -> Result<Option<Category>, StoreError>;

    /// Newest first
    async fn list_categories(&self, scope: &OwnerScope) -> Result<Vec<Category>, StoreError>;

    /// Rows deleted (0 or 1); tasks filed under the category are detached
    async fn delete_category(&self, scope: &OwnerScope, id: i64) -> Result<u64, StoreError>;
}

/// A complete storage backend
#[async_trait]
pub trait Store: CredentialStore + TaskStore + CategoryStore {
    /// Checks the backend is reachable
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for health output
    fn backend(&self) -> &'static str;
}
