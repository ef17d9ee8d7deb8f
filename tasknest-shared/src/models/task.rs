/// Task model and database operations
///
/// A task is a to-do item owned by exactly one user, optionally filed under
/// one of that user's categories. Every query in this module is scoped by an
/// [`OwnerScope`]; there is no unscoped accessor.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     category_id BIGINT REFERENCES categories(id) ON DELETE SET NULL,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     due_date TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::auth::authorization::OwnerScope;
/// use tasknest_shared::models::task::{Task, CreateTask};
/// use tasknest_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let scope = OwnerScope::for_user(1);
///
/// let task = Task::create(&pool, &scope, CreateTask {
///     title: "Buy milk".to_string(),
///     ..Default::default()
/// }).await?;
///
/// let tasks = Task::list(&pool, &scope, None).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::authorization::{Owned, OwnerScope};

/// Task model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: i64,

    /// Owner; set at creation and never changed
    pub user_id: i64,

    /// Category this task is filed under, if any
    pub category_id: Option<i64>,

    /// Short title
    pub title: String,

    /// Free-form description
    pub description: Option<String>,

    /// Whether the task is done
    pub completed: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// Optional deadline
    pub due_date: Option<DateTime<Utc>>,
}

impl Owned for Task {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

/// Input for creating a new task
///
/// The owner comes from the [`OwnerScope`], never from input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Full replacement of a task's mutable fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTask {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed: bool,
}

const TASK_COLUMNS: &str =
    "id, user_id, category_id, title, description, completed, created_at, due_date";

impl Task {
    /// Creates a task owned by `scope`
    ///
    /// The insert only happens if `category_id` is `None` or names a category
    /// owned by the same user; the check and the insert are one statement.
    ///
    /// # Returns
    ///
    /// The created task, or `None` if the category is absent or foreign
    pub async fn create(
        pool: &PgPool,
        scope: &OwnerScope,
        data: CreateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO tasks (user_id, category_id, title, description, due_date)
            SELECT $1, $2, $3, $4, $5
            WHERE $2::BIGINT IS NULL
               OR EXISTS (SELECT 1 FROM categories WHERE id = $2 AND user_id = $1)
            RETURNING {TASK_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(scope.owner_id())
            .bind(data.category_id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.due_date)
            .fetch_optional(pool)
            .await
    }

    /// Finds a task by ID within `scope`
    pub async fn find(
        pool: &PgPool,
        scope: &OwnerScope,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2");

        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(scope.owner_id())
            .fetch_optional(pool)
            .await
    }

    /// Lists tasks within `scope`, newest first
    ///
    /// With `category_id`, only tasks filed under that category are returned.
    pub async fn list(
        pool: &PgPool,
        scope: &OwnerScope,
        category_id: Option<i64>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE user_id = $1
              AND ($2::BIGINT IS NULL OR category_id = $2)
            ORDER BY created_at DESC, id DESC
            "#
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(scope.owner_id())
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    /// Replaces the mutable fields of a task within `scope`
    ///
    /// # Returns
    ///
    /// The updated task, or `None` if the task is outside the scope or the new
    /// category is absent or foreign
    pub async fn update(
        pool: &PgPool,
        scope: &OwnerScope,
        id: i64,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE tasks
            SET title = $3, description = $4, category_id = $5, due_date = $6, completed = $7
            WHERE id = $1 AND user_id = $2
              AND ($5::BIGINT IS NULL
                   OR EXISTS (SELECT 1 FROM categories WHERE id = $5 AND user_id = $2))
            RETURNING {TASK_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(scope.owner_id())
            .bind(data.title)
            .bind(data.description)
            .bind(data.category_id)
            .bind(data.due_date)
            .bind(data.completed)
            .fetch_optional(pool)
            .await
    }

    /// Sets the completion flag of a task within `scope`
    pub async fn set_completed(
        pool: &PgPool,
        scope: &OwnerScope,
        id: i64,
        completed: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE tasks SET completed = $3
            WHERE id = $1 AND user_id = $2
            RETURNING {TASK_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(scope.owner_id())
            .bind(completed)
            .fetch_optional(pool)
            .await
    }

    /// Deletes a task within `scope`
    ///
    /// # Returns
    ///
    /// Number of rows deleted (0 or 1)
    pub async fn delete(pool: &PgPool, scope: &OwnerScope, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(scope.owner_id())
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Whether the task is past its deadline and still open
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }
}
