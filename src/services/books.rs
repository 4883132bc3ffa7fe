//! Book catalog service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookChanges, BookFilter, CreateBook, UpdateBook},
    repository::Repository,
};

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Book with id={} not found", id))
}

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List books matching `filter`, one 1-based page at a time
    pub async fn list_books(
        &self,
        filter: &BookFilter,
        page: i64,
        page_size: i64,
    ) -> AppResult<(Vec<Book>, i64)> {
        // Pages past the end saturate to an offset no store can reach
        let skip = page.saturating_sub(1).saturating_mul(page_size);
        tracing::debug!(?filter, skip, limit = page_size, "Listing books");
        self.repository.books.list(filter, skip, page_size).await
    }

    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.repository
            .books
            .get(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn create_book(&self, payload: &CreateBook) -> AppResult<Book> {
        let book = self.repository.books.create(payload).await?;
        tracing::info!("Created book id={} ({})", book.id, book.title);
        Ok(book)
    }

    /// Update a book. Absent and null fields keep their stored values.
    pub async fn update_book(&self, id: i64, payload: UpdateBook) -> AppResult<Book> {
        // Check if book exists
        self.get_book(id).await?;

        let changes = BookChanges::from(payload);
        let book = self
            .repository
            .books
            .update(id, &changes)
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::info!("Updated book id={}", id);
        Ok(book)
    }

    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        if !self.repository.books.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!("Deleted book id={}", id);
        Ok(())
    }

    /// Storage readiness
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.books.ping().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockall::predicate::eq;

    use super::*;
    use crate::repository::MockBookRepository;

    fn service(mock: MockBookRepository) -> BooksService {
        BooksService::new(Repository::new(Arc::new(mock)))
    }

    fn sample(id: i64) -> Book {
        Book {
            id,
            title: "Clean Code".to_string(),
            author: "Robert C. Martin".to_string(),
            isbn: Some("9780132350884".to_string()),
            publication_year: Some(2008),
            genre: Some("Programming".to_string()),
        }
    }

    #[tokio::test]
    async fn test_list_converts_page_to_offset() {
        let mut mock = MockBookRepository::new();
        mock.expect_list()
            .withf(|filter, skip, limit| filter == &BookFilter::default() && *skip == 20 && *limit == 10)
            .times(1)
            .returning(|_, _, _| Ok((vec![], 42)));

        let (books, total) = service(mock)
            .list_books(&BookFilter::default(), 3, 10)
            .await
            .unwrap();
        assert!(books.is_empty());
        assert_eq!(total, 42);
    }

    #[tokio::test]
    async fn test_list_far_page_saturates_offset() {
        let mut mock = MockBookRepository::new();
        mock.expect_list()
            .withf(|_, skip, limit| *skip == i64::MAX && *limit == 100)
            .times(1)
            .returning(|_, _, _| Ok((vec![], 1)));

        let (books, total) = service(mock)
            .list_books(&BookFilter::default(), i64::MAX, 100)
            .await
            .unwrap();
        assert!(books.is_empty());
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let mut mock = MockBookRepository::new();
        mock.expect_get().with(eq(99999)).returning(|_| Ok(None));

        match service(mock).get_book(99999).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Book with id=99999 not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_checks_existence_before_writing() {
        let mut mock = MockBookRepository::new();
        mock.expect_get().with(eq(5)).returning(|_| Ok(None));
        mock.expect_update().never();

        let result = service(mock).update_book(5, UpdateBook::default()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_drops_null_fields() {
        let mut mock = MockBookRepository::new();
        mock.expect_get().with(eq(1)).returning(|id| Ok(Some(sample(id))));
        mock.expect_update()
            .withf(|id, changes| {
                *id == 1
                    && changes
                        == &BookChanges {
                            publication_year: Some(2000),
                            ..BookChanges::default()
                        }
            })
            .times(1)
            .returning(|id, _| {
                let mut book = sample(id);
                book.publication_year = Some(2000);
                Ok(Some(book))
            });

        let payload = UpdateBook {
            publication_year: Some(Some(2000)),
            genre: Some(None),
            ..UpdateBook::default()
        };
        let book = service(mock).update_book(1, payload).await.unwrap();
        assert_eq!(book.publication_year, Some(2000));
        assert_eq!(book.genre.as_deref(), Some("Programming"));
    }

    #[tokio::test]
    async fn test_update_of_vanished_record_is_not_found() {
        let mut mock = MockBookRepository::new();
        mock.expect_get().returning(|id| Ok(Some(sample(id))));
        mock.expect_update().returning(|_, _| Ok(None));

        let result = service(mock).update_book(1, UpdateBook::default()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let mut mock = MockBookRepository::new();
        mock.expect_delete().with(eq(3)).returning(|_| Ok(false));

        let result = service(mock).delete_book(3).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let mut mock = MockBookRepository::new();
        mock.expect_get()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let result = service(mock).get_book(1).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
