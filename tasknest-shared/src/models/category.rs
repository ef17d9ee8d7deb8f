/// Category model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE categories (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(100) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Deleting a category leaves its tasks in place with `category_id` set to
/// NULL (`ON DELETE SET NULL` on `tasks.category_id`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::authorization::{Owned, OwnerScope};

/// Category model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    /// Unique category ID
    pub id: i64,

    /// Owner; set at creation and never changed
    pub user_id: i64,

    /// Display name
    pub name: String,

    /// When the category was created
    pub created_at: DateTime<Utc>,
}

impl Owned for Category {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

/// Input for creating a new category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCategory {
    pub name: String,
}

impl Category {
    /// Creates a category owned by `scope`
    pub async fn create(
        pool: &PgPool,
        scope: &OwnerScope,
        data: CreateCategory,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(scope.owner_id())
        .bind(data.name)
        .fetch_one(pool)
        .await
    }

    /// Finds a category by ID within `scope`
    pub async fn find(
        pool: &PgPool,
        scope: &OwnerScope,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, user_id, name, created_at
            FROM categories
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(scope.owner_id())
        .fetch_optional(pool)
        .await
    }

    /// Lists categories within `scope`, newest first
    pub async fn list(pool: &PgPool, scope: &OwnerScope) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, user_id, name, created_at
            FROM categories
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(scope.owner_id())
        .fetch_all(pool)
        .await
    }

    /// Deletes a category within `scope`
    ///
    /// # Returns
    ///
    /// Number of rows deleted (0 or 1)
    pub async fn delete(pool: &PgPool, scope: &OwnerScope, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(scope.owner_id())
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
