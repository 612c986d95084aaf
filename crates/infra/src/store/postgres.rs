//! Postgres-backed user and sweet stores.
//!
//! Stock mutations are single statements that lock the row, check availability
//! and write, so the check and the write are one atomic step per row regardless
//! of how many API instances share the database. The quantity reported on an
//! out-of-stock rejection is the one the check saw.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | Result | Scenario |
//! |------------|----------------------|--------|----------|
//! | Database (unique violation) | `23505` | `StoreError::UniqueViolation` | Duplicate email |
//! | Database (numeric out of range) | `22003` | `StockChange::Overflow` | Restock past `BIGINT` |
//! | Database (check constraint violation) | `23514` | `StoreError::Backend` | Negative price/quantity slipped past validation |
//! | PoolClosed | N/A | `StoreError::Backend` | Connection pool was closed |
//! | Other | N/A | `StoreError::Backend` | Network errors, decode errors, etc. |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;
use uuid::Uuid;

use sweetshop_auth::{Role, UserRecord, UserStore};
use sweetshop_catalog::{Page, StockChange, Sweet, SweetPatch, SweetQuery, SweetStore};
use sweetshop_core::{StoreError, SweetId, UserId};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";
const SWEET_COLUMNS: &str = "id, name, category, price, quantity, created_at, updated_at";

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: Arc<PgPool>,
}

impl PostgresUserStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert(&self, user: UserRecord) -> Result<UserRecord, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;

        Ok(user)
    }

    #[instrument(skip(self, email), err)]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        row.map(UserRecord::try_from).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("find_user_by_id", e))?;

        row.map(UserRecord::try_from).transpose()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sweets
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PostgresSweetStore {
    pool: Arc<PgPool>,
}

impl PostgresSweetStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SweetStore for PostgresSweetStore {
    #[instrument(skip(self, sweet), fields(sweet_id = %sweet.id), err)]
    async fn insert(&self, sweet: Sweet) -> Result<Sweet, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sweets (id, name, category, price, quantity, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(sweet.id.as_uuid())
        .bind(&sweet.name)
        .bind(&sweet.category)
        .bind(sweet.price)
        .bind(sweet.quantity)
        .bind(sweet.created_at)
        .bind(sweet.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_sweet", e))?;

        Ok(sweet)
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: SweetId) -> Result<Option<Sweet>, StoreError> {
        let row: Option<SweetRow> =
            sqlx::query_as(&format!("SELECT {SWEET_COLUMNS} FROM sweets WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("get_sweet", e))?;

        Ok(row.map(Sweet::from))
    }

    #[instrument(skip(self), err)]
    async fn list(&self, page: Page) -> Result<Vec<Sweet>, StoreError> {
        let rows: Vec<SweetRow> = sqlx::query_as(&format!(
            "SELECT {SWEET_COLUMNS} FROM sweets ORDER BY created_at, id OFFSET $1 LIMIT $2"
        ))
        .bind(clamp_i64(page.skip))
        .bind(clamp_i64(page.limit))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_sweets", e))?;

        Ok(rows.into_iter().map(Sweet::from).collect())
    }

    #[instrument(skip(self, query), err)]
    async fn search(&self, query: &SweetQuery) -> Result<Vec<Sweet>, StoreError> {
        let mut qb =
            QueryBuilder::<Postgres>::new(format!("SELECT {SWEET_COLUMNS} FROM sweets WHERE TRUE"));

        if let Some(name) = &query.name {
            qb.push(" AND name ILIKE ")
                .push_bind(format!("%{}%", escape_like(name)));
        }
        if let Some(category) = &query.category {
            qb.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(min) = query.price_min {
            qb.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = query.price_max {
            qb.push(" AND price <= ").push_bind(max);
        }
        qb.push(" ORDER BY created_at, id");

        let rows: Vec<SweetRow> = qb
            .build_query_as()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("search_sweets", e))?;

        Ok(rows.into_iter().map(Sweet::from).collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sweets")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_sweets", e))?;

        Ok(u64::try_from(n).unwrap_or(0))
    }

    #[instrument(skip(self, patch), err)]
    async fn update(
        &self,
        id: SweetId,
        patch: &SweetPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Sweet>, StoreError> {
        if patch.is_empty() {
            return self.get(id).await;
        }

        let row: Option<SweetRow> = sqlx::query_as(&format!(
            r#"
            UPDATE sweets SET
                name = COALESCE($2, name),
                category = COALESCE($3, category),
                price = COALESCE($4, price),
                quantity = COALESCE($5, quantity),
                updated_at = $6
            WHERE id = $1
            RETURNING {SWEET_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(patch.name.as_deref())
        .bind(patch.category.as_deref())
        .bind(patch.price)
        .bind(patch.quantity)
        .bind(now)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_sweet", e))?;

        Ok(row.map(Sweet::from))
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: SweetId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM sweets WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_sweet", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn decrement(
        &self,
        id: SweetId,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<StockChange, StoreError> {
        // One statement: lock the row, read it, and take stock only if enough
        // remains. No row back means the sweet does not exist.
        let row: Option<(i64, Option<i64>)> = sqlx::query_as(
            r#"
            WITH target AS (
                SELECT id, quantity FROM sweets WHERE id = $1 FOR UPDATE
            ),
            taken AS (
                UPDATE sweets AS s
                SET quantity = t.quantity - $2, updated_at = $3
                FROM target AS t
                WHERE s.id = t.id AND t.quantity >= $2
                RETURNING s.quantity
            )
            SELECT t.quantity, k.quantity
            FROM target AS t
            LEFT JOIN taken AS k ON TRUE
            "#,
        )
        .bind(id.as_uuid())
        .bind(amount)
        .bind(now)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("decrement_stock", e))?;

        Ok(match row {
            Some((_, Some(remaining))) => StockChange::Applied(remaining),
            Some((available, None)) => StockChange::Insufficient { available },
            None => StockChange::Missing,
        })
    }

    #[instrument(skip(self), err)]
    async fn increment(
        &self,
        id: SweetId,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<StockChange, StoreError> {
        let result: Result<Option<i64>, sqlx::Error> = sqlx::query_scalar(
            r#"
            UPDATE sweets
            SET quantity = quantity + $2, updated_at = $3
            WHERE id = $1
            RETURNING quantity
            "#,
        )
        .bind(id.as_uuid())
        .bind(amount)
        .bind(now)
        .fetch_optional(&*self.pool)
        .await;

        match result {
            Ok(Some(quantity)) => Ok(StockChange::Applied(quantity)),
            Ok(None) => Ok(StockChange::Missing),
            Err(e) if is_numeric_overflow(&e) => Ok(StockChange::Overflow),
            Err(e) => Err(map_sqlx_error("increment_stock", e)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::UniqueViolation(
                    db_err.constraint().unwrap_or(operation).to_string(),
                ),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        other => StoreError::Backend(format!("{} failed: {}", operation, other)),
    }
}

fn is_numeric_overflow(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("22003"))
}

/// Escape `LIKE` metacharacters so user text matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for UserRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: row.try_get("role")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<UserRow> for UserRecord {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(StoreError::backend)?;
        Ok(UserRecord {
            id: UserId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

struct SweetRow {
    id: Uuid,
    name: String,
    category: String,
    price: f64,
    quantity: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for SweetRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(SweetRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            price: row.try_get("price")?,
            quantity: row.try_get("quantity")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<SweetRow> for Sweet {
    fn from(row: SweetRow) -> Self {
        Sweet {
            id: SweetId::from_uuid(row.id),
            name: row.name,
            category: row.category,
            price: row.price,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
