//! Books repository backed by SQLite

use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

use super::BookRepository;
use crate::{
    error::AppResult,
    models::book::{Book, BookChanges, BookFilter, CreateBook},
};

const BOOK_COLUMNS: &str = "id, title, author, isbn, publication_year, genre";

/// Bind filter values in the order `where_clause` emits their placeholders
macro_rules! bind_filter {
    ($query:expr, $filter:expr) => {{
        let mut query = $query;
        if let Some(ref author) = $filter.author {
            query = query.bind(author);
        }
        if let Some(ref genre) = $filter.genre {
            query = query.bind(genre);
        }
        if let Some(year) = $filter.year {
            query = query.bind(year);
        }
        query
    }};
}

#[derive(Clone)]
pub struct SqlBooksRepository {
    pool: Pool<Sqlite>,
}

impl SqlBooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn where_clause(filter: &BookFilter) -> String {
        let mut conditions = vec!["1=1"];
        if filter.author.is_some() {
            conditions.push("author = ?");
        }
        if filter.genre.is_some() {
            conditions.push("genre = ?");
        }
        if filter.year.is_some() {
            conditions.push("publication_year = ?");
        }
        conditions.join(" AND ")
    }
}

#[async_trait]
impl BookRepository for SqlBooksRepository {
    async fn list(&self, filter: &BookFilter, skip: i64, limit: i64) -> AppResult<(Vec<Book>, i64)> {
        let where_clause = Self::where_clause(filter);

        let count_query = format!("SELECT COUNT(*) FROM books WHERE {}", where_clause);
        let total: i64 = bind_filter!(sqlx::query_scalar::<_, i64>(&count_query), filter)
            .fetch_one(&self.pool)
            .await?;

        let select_query = format!(
            "SELECT {} FROM books WHERE {} ORDER BY id ASC LIMIT ? OFFSET ?",
            BOOK_COLUMNS, where_clause
        );
        let books = bind_filter!(sqlx::query_as::<_, Book>(&select_query), filter)
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }

    async fn get(&self, id: i64) -> AppResult<Option<Book>> {
        let query = format!("SELECT {} FROM books WHERE id = ?", BOOK_COLUMNS);
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let query = format!(
            r#"
            INSERT INTO books (title, author, isbn, publication_year, genre)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );

        let mut tx = self.pool.begin().await?;
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(&data.title)
            .bind(&data.author)
            .bind(&data.isbn)
            .bind(data.publication_year)
            .bind(&data.genre)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(book)
    }

    async fn update(&self, id: i64, changes: &BookChanges) -> AppResult<Option<Book>> {
        if changes.is_empty() {
            return self.get(id).await;
        }

        let mut sets = Vec::new();

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ?", $name));
                }
            };
        }

        add_field!(changes.title, "title");
        add_field!(changes.author, "author");
        add_field!(changes.isbn, "isbn");
        add_field!(changes.publication_year, "publication_year");
        add_field!(changes.genre, "genre");

        let query = format!(
            "UPDATE books SET {} WHERE id = ? RETURNING {}",
            sets.join(", "),
            BOOK_COLUMNS
        );

        let mut builder = sqlx::query_as::<_, Book>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(changes.title);
        bind_field!(changes.author);
        bind_field!(changes.isbn);
        bind_field!(changes.publication_year);
        bind_field!(changes.genre);

        let mut tx = self.pool.begin().await?;
        let book = builder.bind(id).fetch_optional(&mut *tx).await?;
        tx.commit().await?;

        Ok(book)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
