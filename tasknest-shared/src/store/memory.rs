/// In-memory storage backend
///
/// Keeps every table in one `RwLock`-guarded struct. Each trait method takes
/// the lock once, so every operation is atomic the same way a single SQL
/// statement is. Used by the API integration tests and by `DATABASE_URL=memory://`.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{CategoryStore, CredentialStore, Store, StoreError, TaskStore};
use crate::auth::authorization::{within_scope, OwnerScope};
use crate::models::category::{Category, CreateCategory};
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::user::{CreateUser, User};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    categories: Vec<Category>,
    tasks: Vec<Task>,
    next_user_id: i64,
    next_category_id: i64,
    next_task_id: i64,
}

impl Tables {
    fn owns_category(&self, scope: &OwnerScope, category_id: Option<i64>) -> bool {
        match category_id {
            None => true,
            Some(id) => self
                .categories
                .iter()
                .any(|c| c.id == id && scope.permits(c.user_id)),
        }
    }

    fn task_mut(&mut self, scope: &OwnerScope, id: i64) -> Option<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id && scope.permits(t.user_id))
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Process-local storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered identities
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert_user(&self, data: CreateUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.username == data.username) {
            return Err(StoreError::DuplicateUsername);
        }

        let user = User {
            id: next_id(&mut tables.next_user_id),
            username: data.username,
            password_hash: data.password_hash,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());

        Ok(user)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(
        &self,
        scope: &OwnerScope,
        data: CreateTask,
    ) -> Result<Option<Task>, StoreError> {
        let mut tables = self.tables.write().await;

        if !tables.owns_category(scope, data.category_id) {
            return Ok(None);
        }

        let task = Task {
            id: next_id(&mut tables.next_task_id),
            user_id: scope.owner_id(),
            category_id: data.category_id,
            title: data.title,
            description: data.description,
            completed: false,
            created_at: Utc::now(),
            due_date: data.due_date,
        };
        tables.tasks.push(task.clone());

        Ok(Some(task))
    }

    async fn find_task(&self, scope: &OwnerScope, id: i64) -> Result<Option<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .find(|t| t.id == id && scope.permits(t.user_id))
            .cloned())
    }

    async fn list_tasks(
        &self,
        scope: &OwnerScope,
        category_id: Option<i64>,
    ) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables.read().await;

        let mut tasks: Vec<Task> = within_scope(
            scope,
            tables
                .tasks
                .iter()
                .filter(|t| category_id.is_none() || t.category_id == category_id),
        );
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(tasks)
    }

    async fn update_task(
        &self,
        scope: &OwnerScope,
        id: i64,
        data: UpdateTask,
    ) -> Result<Option<Task>, StoreError> {
        let mut tables = self.tables.write().await;

        if !tables.owns_category(scope, data.category_id) {
            return Ok(None);
        }

        Ok(tables.task_mut(scope, id).map(|task| {
            task.title = data.title;
            task.description = data.description;
            task.category_id = data.category_id;
            task.due_date = data.due_date;
            task.completed = data.completed;
            task.clone()
        }))
    }

    async fn set_task_completed(
        &self,
        scope: &OwnerScope,
        id: i64,
        completed: bool,
    ) -> Result<Option<Task>, StoreError> {
        let mut tables = self.tables.write().await;

        Ok(tables.task_mut(scope, id).map(|task| {
            task.completed = completed;
            task.clone()
        }))
    }

    async fn delete_task(&self, scope: &OwnerScope, id: i64) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;

        let before = tables.tasks.len();
        tables
            .tasks
            .retain(|t| !(t.id == id && scope.permits(t.user_id)));

        Ok((before - tables.tasks.len()) as u64)
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn create_category(
        &self,
        scope: &OwnerScope,
        data: CreateCategory,
    ) -> Result<Category, StoreError> {
        let mut tables = self.tables.write().await;

        let category = Category {
            id: next_id(&mut tables.next_category_id),
            user_id: scope.owner_id(),
            name: data.name,
            created_at: Utc::now(),
        };
        tables.categories.push(category.clone());

        Ok(category)
    }

    async fn find_category(
        &self,
        scope: &OwnerScope,
        id: i64,
    ) -> Result<Option<Category>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .iter()
            .find(|c| c.id == id && scope.permits(c.user_id))
            .cloned())
    }

    async fn list_categories(&self, scope: &OwnerScope) -> Result<Vec<Category>, StoreError> {
        let tables = self.tables.read().await;

        let mut categories = within_scope(scope, &tables.categories);
        categories.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(categories)
    }

    async fn delete_category(&self, scope: &OwnerScope, id: i64) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;

        let before = tables.categories.len();
        tables
            .categories
            .retain(|c| !(c.id == id && scope.permits(c.user_id)));
        let deleted = (before - tables.categories.len()) as u64;

        if deleted > 0 {
            // ON DELETE SET NULL
            for task in tables.tasks.iter_mut().filter(|t| t.category_id == Some(id)) {
                task.category_id = None;
            }
        }

        Ok(deleted)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
