/// PostgreSQL storage backend
///
/// Thin adapter from the storage traits onto the model SQL in
/// [`crate::models`]. A unique violation on `users_username_key` becomes
/// `StoreError::DuplicateUsername`.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{CategoryStore, CredentialStore, Store, StoreError, TaskStore};
use crate::auth::authorization::OwnerScope;
use crate::db::pool::health_check;
use crate::models::category::{Category, CreateCategory};
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::user::{CreateUser, User};

/// Storage backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn insert_user(&self, data: CreateUser) -> Result<User, StoreError> {
        Ok(User::create(&self.pool, data).await?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_task(
        &self,
        scope: &OwnerScope,
        data: CreateTask,
    ) -> Result<Option<Task>, StoreError> {
        Ok(Task::create(&self.pool, scope, data).await?)
    }

    async fn find_task(&self, scope: &OwnerScope, id: i64) -> Result<Option<Task>, StoreError> {
        Ok(Task::find(&self.pool, scope, id).await?)
    }

    async fn list_tasks(
        &self,
        scope: &OwnerScope,
        category_id: Option<i64>,
    ) -> Result<Vec<Task>, StoreError> {
        Ok(Task::list(&self.pool, scope, category_id).await?)
    }

    async fn update_task(
        &self,
        scope: &OwnerScope,
        id: i64,
        data: UpdateTask,
    ) -> Result<Option<Task>, StoreError> {
        Ok(Task::update(&self.pool, scope, id, data).await?)
    }

    async fn set_task_completed(
        &self,
        scope: &OwnerScope,
        id: i64,
        completed: bool,
    ) -> Result<Option<Task>, StoreError> {
        Ok(Task::set_completed(&self.pool, scope, id, completed).await?)
    }

    async fn delete_task(&self, scope: &OwnerScope, id: i64) -> Result<u64, StoreError> {
        Ok(Task::delete(&self.pool, scope, id).await?)
    }
}

#[async_trait]
impl CategoryStore for PgStore {
    async fn create_category(
        &self,
        scope: &OwnerScope,
        data: CreateCategory,
    ) -> Result<Category, StoreError> {
        Ok(Category::create(&self.pool, scope, data).await?)
    }

    async fn find_category(
        &self,
        scope: &OwnerScope,
        id: i64,
    ) -> Result<Option<Category>, StoreError> {
        Ok(Category::find(&self.pool, scope, id).await?)
    }

    async fn list_categories(&self, scope: &OwnerScope) -> Result<Vec<Category>, StoreError> {
        Ok(Category::list(&self.pool, scope).await?)
    }

    async fn delete_category(&self, scope: &OwnerScope, id: i64) -> Result<u64, StoreError> {
        Ok(Category::delete(&self.pool, scope, id).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(health_check(&self.pool).await?)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
