//! # Category Repository
//!
//! Database operations for categories.
//!
//! Deleting a category only stamps `deleted_at`. Products that still point
//! at it keep their `category_id`; product reads simply stop joining it.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use storefront_core::validation::normalize_uuid;
use storefront_core::{Category, CategoryDraft, CoreError};

const CATEGORY_COLUMNS: &str =
    "id, uuid, name, description, created_at, updated_at, deleted_at";

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists live categories ordered by key.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE deleted_at IS NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = categories.len(), "Listed categories");
        Ok(categories)
    }

    /// Gets a live category by its external id.
    ///
    /// ## Returns
    /// * `Ok(Some(Category))` - Category found
    /// * `Ok(None)` - Unknown, malformed or soft-deleted id
    pub async fn get_by_uuid(&self, id: &str) -> DbResult<Option<Category>> {
        let Some(uuid) = normalize_uuid(id) else {
            return Ok(None);
        };

        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE uuid = ? AND deleted_at IS NULL"
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Inserts a new category.
    pub async fn insert(&self, draft: &CategoryDraft) -> DbResult<Category> {
        draft.validate().map_err(CoreError::from)?;

        let uuid = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(uuid = %uuid, name = %draft.name, "Inserting category");

        let result = sqlx::query(
            r#"
            INSERT INTO categories (uuid, name, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(&uuid)
        .bind(draft.name.trim())
        .bind(&draft.description)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Category {
            id: result.last_insert_rowid(),
            uuid,
            name: draft.name.trim().to_string(),
            description: draft.description.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    /// Replaces name and description of a live category.
    ///
    /// ## Returns
    /// * `Ok(Category)` - The stored row after the update
    /// * `Err(DbError::NotFound)` - Category doesn't exist or was deleted
    pub async fn update(&self, id: &str, draft: &CategoryDraft) -> DbResult<Category> {
        draft.validate().map_err(CoreError::from)?;

        let uuid = normalize_uuid(id).ok_or_else(|| DbError::not_found("Category", id))?;

        debug!(uuid = %uuid, "Updating category");

        let result = sqlx::query(
            r#"
            UPDATE categories SET
                name = ?2,
                description = ?3,
                updated_at = ?4
            WHERE uuid = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(&uuid)
        .bind(draft.name.trim())
        .bind(&draft.description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        self.get_by_uuid(&uuid)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Soft-deletes a category by stamping `deleted_at`.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        let uuid = normalize_uuid(id).ok_or_else(|| DbError::not_found("Category", id))?;

        debug!(uuid = %uuid, "Soft-deleting category");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE categories
            SET deleted_at = ?2, updated_at = ?2
            WHERE uuid = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(&uuid)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    /// Resolves a category reference from a product write to its key.
    ///
    /// Missing, malformed and deleted references all fail with
    /// `CoreError::CategoryNotFound`: the caller's body is wrong, not the
    /// path.
    pub async fn resolve_reference(&self, reference: &str) -> DbResult<i64> {
        let missing = || DbError::Domain(CoreError::CategoryNotFound(reference.to_string()));

        let uuid = normalize_uuid(reference).ok_or_else(missing)?;

        let id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM categories WHERE uuid = ? AND deleted_at IS NULL")
                .bind(uuid)
                .fetch_optional(&self.pool)
                .await?;

        id.ok_or_else(missing)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{seed_category, test_db};

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let created = db
            .categories()
            .insert(&CategoryDraft {
                name: "  Drinks ".to_string(),
                description: Some("Cold and hot".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(created.name, "Drinks");

        let fetched = db
            .categories()
            .get_by_uuid(&created.uuid.to_uppercase())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.description.as_deref(), Some("Cold and hot"));
    }

    #[tokio::test]
    async fn test_list_excludes_deleted_and_orders_by_key() {
        let db = test_db().await;
        let a = seed_category(&db, "A").await;
        let b = seed_category(&db, "B").await;
        let c = seed_category(&db, "C").await;

        db.categories().soft_delete(&b.uuid).await.unwrap();

        let names: Vec<String> = db
            .categories()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec![a.name, c.name]);
        assert!(db.categories().get_by_uuid(&b.uuid).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_id_is_not_found() {
        let db = test_db().await;

        assert!(db.categories().get_by_uuid("nope").await.unwrap().is_none());
        assert!(matches!(
            db.categories().soft_delete("nope").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_deleted_category_fails() {
        let db = test_db().await;
        let cat = seed_category(&db, "Snacks").await;
        db.categories().soft_delete(&cat.uuid).await.unwrap();

        let result = db
            .categories()
            .update(
                &cat.uuid,
                &CategoryDraft {
                    name: "Crisps".to_string(),
                    description: None,
                },
            )
            .await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));

        assert!(matches!(
            db.categories().soft_delete(&cat.uuid).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let db = test_db().await;
        let cat = seed_category(&db, "Snacks").await;

        let updated = db
            .categories()
            .update(
                &cat.uuid,
                &CategoryDraft {
                    name: "Crisps".to_string(),
                    description: Some("Salty".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.uuid, cat.uuid);
        assert_eq!(updated.name, "Crisps");
        assert_eq!(updated.description.as_deref(), Some("Salty"));
    }

    #[tokio::test]
    async fn test_resolve_reference() {
        let db = test_db().await;
        let cat = seed_category(&db, "Dairy").await;

        assert_eq!(
            db.categories().resolve_reference(&cat.uuid).await.unwrap(),
            cat.id
        );

        db.categories().soft_delete(&cat.uuid).await.unwrap();
        assert!(matches!(
            db.categories().resolve_reference(&cat.uuid).await,
            Err(DbError::Domain(CoreError::CategoryNotFound(_)))
        ));
        assert!(matches!(
            db.categories().resolve_reference("garbage").await,
            Err(DbError::Domain(CoreError::CategoryNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_insert_rejects_blank_name() {
        let db = test_db().await;
        let result = db.categories().insert(&CategoryDraft::default()).await;
        assert!(matches!(
            result,
            Err(DbError::Domain(CoreError::Validation(_)))
        ));
    }
}
