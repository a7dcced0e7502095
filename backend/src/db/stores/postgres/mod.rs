//! Postgres document store using Diesel.
//!
//! Documents are kept as JSONB rows in a single `documents` table keyed by
//! collection and id. Field filters are evaluated with JSONB containment
//! (`body @> '{...}'`), and unique indexes are partial expression indexes over
//! the indexed fields of one collection.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `DATABASE_NAME`: Display name reported by diagnostics (optional)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::debug;
use serde_json::Value;
use std::time::Duration;
use tokio::task;

use crate::db::document::{Document, Filter, StoredDocument};
use crate::db::id::{DocumentId, ObjectId};
use crate::db::store::{DocumentStore, ErrorContext, StoreError, StoreResult};

mod models;
mod schema;

use models::{DocumentRow, NewDocumentRow};
use schema::documents;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/stores/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Name reported by diagnostics
    pub database_name: Option<String>,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            database_name: None,
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;
        let defaults = Self::default();

        Ok(Self {
            database_url,
            database_name: std::env::var("DATABASE_NAME").ok(),
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed document store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
    config: PostgresConfig,
}

impl std::fmt::Debug for PostgresStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore")
            .field("database_name", &self.config.database_name)
            .field("max_pool_size", &self.config.max_pool_size)
            .finish()
    }
}

/// Index and collection names end up in DDL, so only plain identifiers are allowed.
fn checked_identifier(name: &str) -> StoreResult<&str> {
    let valid = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
    if valid {
        Ok(name)
    } else {
        Err(StoreError::validation_with_context(
            format!("'{}' is not a valid identifier", name),
            ErrorContext::new("ensure_unique_index"),
        ))
    }
}

fn filtered(collection: String, filter: &Filter) -> documents::BoxedQuery<'static, Pg> {
    let mut query = documents::table
        .filter(documents::collection.eq(collection))
        .into_boxed();
    if let Some(id) = filter.id() {
        query = query
            .filter(documents::native_id.eq(id.is_native()))
            .filter(documents::doc_id.eq(id.as_key()));
    }
    if !filter.clauses().is_empty() {
        query = query.filter(documents::body.contains(filter.clauses_as_object()));
    }
    query
}

impl PostgresStore {
    /// Create a new store and run pending migrations.
    pub fn new(config: PostgresConfig) -> StoreResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                StoreError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                StoreError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
                StoreError::internal_with_context(
                    format!("Migration failed: {}", e),
                    ErrorContext::new("run_migrations"),
                )
            })?;
        }

        Ok(Self { pool, config })
    }

    /// Execute a database operation with automatic retry for transient failures.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: Fn(&mut PgConnection) -> StoreResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        last_error = Some(StoreError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new(operation)
                                .with_details(format!("attempt={}", attempt + 1)),
                        ));
                        continue;
                    }
                };

                match f(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                    }
                    Err(e) => return Err(e.with_operation(operation)),
                }
            }

            Err(last_error
                .unwrap_or_else(|| StoreError::internal("Max retries exceeded with no error captured"))
                .with_operation(operation))
        })
        .await
        .map_err(|e| {
            StoreError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    fn insert_row(conn: &mut PgConnection, row: &NewDocumentRow) -> StoreResult<()> {
        diesel::insert_into(documents::table)
            .values(row)
            .execute(conn)
            .map_err(|e| StoreError::from(e).with_operation("insert"))?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn health_check(&self) -> StoreResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1").execute(conn)?;
            Ok(true)
        })
        .await
    }

    fn database_name(&self) -> Option<String> {
        self.config.database_name.clone()
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        self.with_conn("list_collections", |conn| {
            let names = documents::table
                .select(documents::collection)
                .distinct()
                .order(documents::collection.asc())
                .load::<String>(conn)?;
            Ok(names)
        })
        .await
    }

    async fn insert(&self, collection: &str, document: Document) -> StoreResult<DocumentId> {
        let id = DocumentId::Native(ObjectId::new());
        let row = NewDocumentRow::new(collection, &id, Value::Object(document));
        self.with_conn("insert", move |conn| Self::insert_row(conn, &row))
            .await?;
        debug!("Inserted document {} into '{}'", id, collection);
        Ok(id)
    }

    async fn insert_with_id(
        &self,
        collection: &str,
        id: DocumentId,
        document: Document,
    ) -> StoreResult<DocumentId> {
        let row = NewDocumentRow::new(collection, &id, Value::Object(document));
        self.with_conn("insert_with_id", move |conn| Self::insert_row(conn, &row))
            .await?;
        Ok(id)
    }

    async fn ensure_unique_index(&self, collection: &str, fields: &[&str]) -> StoreResult<()> {
        let collection = checked_identifier(collection)?.to_string();
        let mut exprs = Vec::with_capacity(fields.len());
        for field in fields {
            exprs.push(format!("(body->>'{}')", checked_identifier(field)?));
        }
        let index_name = format!("uq_{}_{}", collection, fields.join("_"));
        // NULLS NOT DISTINCT needs PostgreSQL 15
        let ddl = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON documents ({}) NULLS NOT DISTINCT \
             WHERE collection = '{}'",
            index_name,
            exprs.join(", "),
            collection
        );

        self.with_conn("ensure_unique_index", move |conn| {
            sql_query(ddl.as_str()).execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<StoredDocument>> {
        let collection = collection.to_string();
        let filter = filter.clone();
        self.with_conn("find", move |conn| {
            let rows = filtered(collection.clone(), &filter)
                .order(documents::created_at.asc())
                .select(DocumentRow::as_select())
                .load::<DocumentRow>(conn)?;
            rows.into_iter().map(DocumentRow::into_document).collect()
        })
        .await
    }

    async fn find_one(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> StoreResult<Option<StoredDocument>> {
        let filter = Filter::new().by_id(id.clone());
        let collection = collection.to_string();
        self.with_conn("find_one", move |conn| {
            let row = filtered(collection.clone(), &filter)
                .select(DocumentRow::as_select())
                .first::<DocumentRow>(conn)
                .optional()?;
            row.map(DocumentRow::into_document).transpose()
        })
        .await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let collection = collection.to_string();
        let filter = filter.clone();
        self.with_conn("count", move |conn| {
            let total: i64 = filtered(collection.clone(), &filter)
                .count()
                .get_result(conn)?;
            Ok(total as u64)
        })
        .await
    }
}
