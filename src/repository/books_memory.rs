//! Books repository kept in process memory

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::BookRepository;
use crate::{
    error::AppResult,
    models::book::{Book, BookChanges, BookFilter, CreateBook},
};

#[derive(Default)]
struct Shelf {
    /// Always sorted by id: ids only grow and records are appended
    books: Vec<Book>,
    last_id: i64,
}

#[derive(Default)]
pub struct InMemoryBooksRepository {
    shelf: RwLock<Shelf>,
}

impl InMemoryBooksRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookRepository for InMemoryBooksRepository {
    async fn list(&self, filter: &BookFilter, skip: i64, limit: i64) -> AppResult<(Vec<Book>, i64)> {
        let shelf = self.shelf.read().await;
        let matching: Vec<&Book> = shelf.books.iter().filter(|b| filter.matches(b)).collect();
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn get(&self, id: i64) -> AppResult<Option<Book>> {
        let shelf = self.shelf.read().await;
        Ok(shelf.books.iter().find(|b| b.id == id).cloned())
    }

    async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let mut shelf = self.shelf.write().await;
        shelf.last_id += 1;
        let book = Book {
            id: shelf.last_id,
            title: data.title.clone(),
            author: data.author.clone(),
            isbn: data.isbn.clone(),
            publication_year: data.publication_year,
            genre: data.genre.clone(),
        };
        shelf.books.push(book.clone());
        Ok(book)
    }

    async fn update(&self, id: i64, changes: &BookChanges) -> AppResult<Option<Book>> {
        let mut shelf = self.shelf.write().await;
        Ok(shelf.books.iter_mut().find(|b| b.id == id).map(|book| {
            changes.apply_to(book);
            book.clone()
        }))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut shelf = self.shelf.write().await;
        match shelf.books.iter().position(|b| b.id == id) {
            Some(idx) => {
                shelf.books.remove(idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, genre: Option<&str>) -> CreateBook {
        CreateBook {
            title: title.to_string(),
            author: "Anon".to_string(),
            isbn: None,
            publication_year: None,
            genre: genre.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_ids_start_at_one_and_are_not_reused() {
        let repo = InMemoryBooksRepository::new();
        let first = repo.create(&book("One", None)).await.unwrap();
        assert_eq!(first.id, 1);
        assert!(repo.delete(first.id).await.unwrap());
        let second = repo.create(&book("Two", None)).await.unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_list_counts_before_windowing() {
        let repo = InMemoryBooksRepository::new();
        for i in 0..5 {
            let genre = if i % 2 == 0 { Some("Fiction") } else { None };
            repo.create(&book(&format!("Book {}", i), genre)).await.unwrap();
        }
        let filter = BookFilter {
            genre: Some("Fiction".to_string()),
            ..BookFilter::default()
        };
        let (page, total) = repo.list(&filter, 1, 1).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "Book 2");
    }

    #[tokio::test]
    async fn test_skip_past_end_is_empty() {
        let repo = InMemoryBooksRepository::new();
        repo.create(&book("Only", None)).await.unwrap();
        let (page, total) = repo.list(&BookFilter::default(), 10, 10).await.unwrap();
        assert!(page.is_empty());
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let repo = InMemoryBooksRepository::new();
        let changes = BookChanges {
            title: Some("Nope".to_string()),
            ..BookChanges::default()
        };
        assert_eq!(repo.update(99999, &changes).await.unwrap(), None);
    }
}
