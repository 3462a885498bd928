//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD with soft delete
//! - Case-insensitive name search
//! - Batch stock lookup for checkout
//!
//! ## Category Join
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products p  LEFT JOIN  categories c                                    │
//! │              ON c.id = p.category_id AND c.deleted_at IS NULL           │
//! │                                                                         │
//! │  p.category_id = NULL           → category: null                        │
//! │  p.category_id = 7, c live      → category: { ... }                     │
//! │  p.category_id = 7, c deleted   → category: null   (row still kept)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use rand::distributions::Uniform;
use rand::Rng;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::category::CategoryRepository;
use storefront_core::validation::{normalize_uuid, validate_search_query};
use storefront_core::{Category, CoreError, Product, ProductDraft, StockSnapshot};
use storefront_core::GENERATED_SKU_PREFIX;

/// Length of the random part of a generated SKU.
const GENERATED_SKU_LEN: usize = 12;

const SKU_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const PRODUCT_SELECT: &str = r#"
    SELECT
        p.id,
        p.uuid,
        p.sku,
        p.name,
        p.stock,
        p.price_cents,
        p.category_id,
        p.created_at,
        p.updated_at,
        c.id AS c_id,
        c.uuid AS c_uuid,
        c.name AS c_name,
        c.description AS c_description,
        c.created_at AS c_created_at,
        c.updated_at AS c_updated_at
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id AND c.deleted_at IS NULL
"#;

/// Flat row of [`PRODUCT_SELECT`]; the `c_` columns are all NULL when no
/// live category joined.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    uuid: String,
    sku: String,
    name: String,
    stock: Option<i64>,
    price_cents: Option<i64>,
    category_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    c_id: Option<i64>,
    c_uuid: Option<String>,
    c_name: Option<String>,
    c_description: Option<String>,
    c_created_at: Option<DateTime<Utc>>,
    c_updated_at: Option<DateTime<Utc>>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        let category = match (row.c_id, row.c_uuid, row.c_name, row.c_created_at, row.c_updated_at) {
            (Some(id), Some(uuid), Some(name), Some(created_at), Some(updated_at)) => {
                Some(Category {
                    id,
                    uuid,
                    name,
                    description: row.c_description,
                    created_at,
                    updated_at,
                    deleted_at: None,
                })
            }
            _ => None,
        };

        Product {
            id: row.id,
            uuid: row.uuid,
            sku: row.sku,
            name: row.name,
            stock: row.stock,
            price_cents: row.price_cents,
            category_id: row.category_id,
            category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let all = repo.list(None).await?;
/// let cola = repo.list(Some("cola")).await?;
/// let one = repo.get_by_uuid("6f1c2a4e-...").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists live products ordered by key, optionally filtered by a
    /// case-insensitive substring of the name.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<Product>> {
        let search = validate_search_query(search).map_err(CoreError::from)?;

        debug!(search = ?search, "Listing products");

        let mut query = QueryBuilder::<Sqlite>::new(PRODUCT_SELECT);
        query.push(" WHERE p.deleted_at IS NULL");

        if let Some(keyword) = search {
            query
                .push(" AND p.name LIKE ")
                .push_bind(like_pattern(&keyword))
                .push(r" ESCAPE '\'");
        }

        query.push(" ORDER BY p.id");

        let rows: Vec<ProductRow> = query.build_query_as().fetch_all(&self.pool).await?;

        debug!(count = rows.len(), "Listed products");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Gets a live product by its external id.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Unknown, malformed or soft-deleted id
    pub async fn get_by_uuid(&self, id: &str) -> DbResult<Option<Product>> {
        let Some(uuid) = normalize_uuid(id) else {
            return Ok(None);
        };

        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "{PRODUCT_SELECT} WHERE p.uuid = ? AND p.deleted_at IS NULL"
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The stored product, category joined
    /// * `Err(DbError::UniqueViolation)` - SKU already used by a live product
    /// * `Err(DbError::Domain(CategoryNotFound))` - Bad category reference
    pub async fn insert(&self, draft: &ProductDraft) -> DbResult<Product> {
        draft.validate().map_err(CoreError::from)?;

        let category_id = self.category_key(draft).await?;
        let uuid = generate_product_id();
        let sku = match &draft.sku {
            Some(sku) => sku.trim().to_string(),
            None => generate_sku(),
        };
        let now = Utc::now();

        debug!(uuid = %uuid, sku = %sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                uuid, sku, name, stock, price_cents, category_id,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
        )
        .bind(&uuid)
        .bind(&sku)
        .bind(draft.name.trim())
        .bind(draft.stock)
        .bind(draft.price_cents)
        .bind(category_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| sku_conflict(e, &sku))?;

        self.get_by_uuid(&uuid)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &uuid))
    }

    /// Replaces name, stock, price and category of a live product. The SKU
    /// changes only when the draft carries one.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The stored product after the update
    /// * `Err(DbError::NotFound)` - Product doesn't exist or was deleted
    pub async fn update(&self, id: &str, draft: &ProductDraft) -> DbResult<Product> {
        draft.validate().map_err(CoreError::from)?;

        let uuid = normalize_uuid(id).ok_or_else(|| DbError::not_found("Product", id))?;
        let category_id = self.category_key(draft).await?;
        let sku = draft.sku.as_deref().map(str::trim);

        debug!(uuid = %uuid, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                sku = COALESCE(?2, sku),
                name = ?3,
                stock = ?4,
                price_cents = ?5,
                category_id = ?6,
                updated_at = ?7
            WHERE uuid = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(&uuid)
        .bind(sku)
        .bind(draft.name.trim())
        .bind(draft.stock)
        .bind(draft.price_cents)
        .bind(category_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| sku_conflict(e, sku.unwrap_or_default()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_uuid(&uuid)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Soft-deletes a product by stamping `deleted_at`.
    ///
    /// Historic transaction details keep pointing at the row.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        let uuid = normalize_uuid(id).ok_or_else(|| DbError::not_found("Product", id))?;

        debug!(uuid = %uuid, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET deleted_at = ?2, updated_at = ?2
            WHERE uuid = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(&uuid)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts live products (for diagnostics and the seed binary).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn category_key(&self, draft: &ProductDraft) -> DbResult<Option<i64>> {
        match draft.category_ref() {
            Some(reference) => CategoryRepository::new(self.pool.clone())
                .resolve_reference(reference)
                .await
                .map(Some),
            None => Ok(None),
        }
    }
}

// =============================================================================
// Stock Lookup
// =============================================================================

/// Reads every live product whose UUID or SKU is in `keys`, in one query.
///
/// Takes a connection rather than the pool so the checkout can run it
/// inside its transaction.
///
/// ```text
/// SELECT id, uuid, sku, name, stock, price_cents FROM products
/// WHERE deleted_at IS NULL
///   AND (uuid IN (?, ?, ...) OR sku IN (?, ?, ...))
/// ```
pub async fn resolve_stock(
    conn: &mut SqliteConnection,
    keys: &[String],
) -> DbResult<Vec<StockSnapshot>> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT id, uuid, sku, name, stock, price_cents FROM products \
         WHERE deleted_at IS NULL AND (uuid IN (",
    );

    let mut uuids = query.separated(", ");
    for key in keys {
        uuids.push_bind(key.clone());
    }
    uuids.push_unseparated(") OR sku IN (");

    let mut skus = query.separated(", ");
    for key in keys {
        skus.push_bind(key.clone());
    }
    skus.push_unseparated("))");

    query.push(" ORDER BY id");

    let snapshots: Vec<StockSnapshot> = query.build_query_as().fetch_all(&mut *conn).await?;

    debug!(
        requested = keys.len(),
        found = snapshots.len(),
        "Resolved checkout products"
    );
    Ok(snapshots)
}

// =============================================================================
// Helpers
// =============================================================================

/// Helper to generate a new product UUID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates `ITEM-` followed by 12 random characters from `[A-Z0-9]`.
pub fn generate_sku() -> String {
    let mut rng = rand::thread_rng();
    let dist = Uniform::from(0..SKU_ALPHABET.len());

    let suffix: String = (0..GENERATED_SKU_LEN)
        .map(|_| SKU_ALPHABET[rng.sample(dist)] as char)
        .collect();

    format!("{GENERATED_SKU_PREFIX}{suffix}")
}

/// `%keyword%` with LIKE wildcards in the keyword escaped.
fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Names the SKU on a unique violation; passes everything else through.
fn sku_conflict(err: sqlx::Error, sku: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate("sku", sku),
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
