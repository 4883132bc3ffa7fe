//! Repository layer for book storage
//!
//! `BookRepository` is the only seam between the service layer and storage.
//! Two implementations honour the same ordering, filtering and pagination
//! rules: [`SqlBooksRepository`] (sqlx over SQLite) and
//! [`InMemoryBooksRepository`]. Neither applies existence policy: absence is
//! reported as `None` / `false` and errors are storage failures only.

pub mod books_memory;
pub mod books_sql;

use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::{
    config::{DatabaseConfig, StorageBackend},
    error::AppResult,
    models::book::{Book, BookChanges, BookFilter, CreateBook},
};

pub use books_memory::InMemoryBooksRepository;
pub use books_sql::SqlBooksRepository;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Records matching `filter`, ordered by id, windowed to `[skip, skip + limit)`,
    /// together with the number of matches before windowing
    async fn list(&self, filter: &BookFilter, skip: i64, limit: i64) -> AppResult<(Vec<Book>, i64)>;

    async fn get(&self, id: i64) -> AppResult<Option<Book>>;

    /// Persist a new record; the id is assigned by storage
    async fn create(&self, data: &CreateBook) -> AppResult<Book>;

    /// Apply the present fields of `changes`, returning the full record
    async fn update(&self, id: i64, changes: &BookChanges) -> AppResult<Option<Book>>;

    /// Returns `true` if a record was removed
    async fn delete(&self, id: i64) -> AppResult<bool>;

    /// Check that storage answers
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct handed to services
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookRepository>,
}

impl Repository {
    pub fn new(books: Arc<dyn BookRepository>) -> Self {
        Self { books }
    }

    /// Repository backed by the given SQLite pool
    pub fn sql(pool: SqlitePool) -> Self {
        Self::new(Arc::new(SqlBooksRepository::new(pool)))
    }

    /// Repository keeping books in process memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryBooksRepository::new()))
    }

    /// Build the repository selected by configuration
    pub async fn from_config(backend: StorageBackend, database: &DatabaseConfig) -> AppResult<Self> {
        match backend {
            StorageBackend::Sql => {
                let pool = connect(database).await?;
                tracing::info!("Using SQL book storage at {}", database.url);
                Ok(Self::sql(pool))
            }
            StorageBackend::Memory => {
                tracing::info!("Using in-memory book storage");
                Ok(Self::in_memory())
            }
        }
    }
}

/// Open the SQLite pool and make sure the schema exists
pub async fn connect(config: &DatabaseConfig) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

    let pool_options = if config.is_in_memory() {
        // Every connection to `:memory:` opens its own database
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
    };

    let pool = pool_options.connect_with(options).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database schema ready");

    Ok(pool)
}
