//! Book model and request payloads

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// 13 ASCII digits, nothing else
static ISBN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{13}$").unwrap());

/// Book record as stored and returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    /// Storage-assigned identifier
    pub id: i64,
    pub title: String,
    pub author: String,
    /// 13-digit ISBN (digits only)
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub genre: Option<String>,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "Author must be 1 to 100 characters"))]
    pub author: String,
    #[validate(regex(path = *ISBN_REGEX, message = "ISBN must be exactly 13 digits"))]
    pub isbn: Option<String>,
    #[validate(range(min = 1000, max = 2024, message = "Publication year must be between 1000 and 2024"))]
    pub publication_year: Option<i32>,
    #[validate(length(min = 1, max = 50, message = "Genre must be 1 to 50 characters"))]
    pub genre: Option<String>,
}

/// Update book request.
///
/// Each field distinguishes an absent key (`None`) from an explicit `null`
/// (`Some(None)`). Neither clears the stored value; only `Some(Some(_))` is applied.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(length(min = 1, max = 100, message = "Author must be 1 to 100 characters"))]
    pub author: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(regex(path = *ISBN_REGEX, message = "ISBN must be exactly 13 digits"))]
    pub isbn: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    #[validate(range(min = 1000, max = 2024, message = "Publication year must be between 1000 and 2024"))]
    pub publication_year: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(length(min = 1, max = 50, message = "Genre must be 1 to 50 characters"))]
    pub genre: Option<Option<String>>,
}

/// Storage-level mutation: every `Some` field is written, `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub genre: Option<String>,
}

impl From<UpdateBook> for BookChanges {
    fn from(update: UpdateBook) -> Self {
        Self {
            title: update.title.flatten(),
            author: update.author.flatten(),
            isbn: update.isbn.flatten(),
            publication_year: update.publication_year.flatten(),
            genre: update.genre.flatten(),
        }
    }
}

impl BookChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.isbn.is_none()
            && self.publication_year.is_none()
            && self.genre.is_none()
    }

    /// Apply the present fields to `book`, leaving its id untouched
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(ref title) = self.title {
            book.title = title.clone();
        }
        if let Some(ref author) = self.author {
            book.author = author.clone();
        }
        if let Some(ref isbn) = self.isbn {
            book.isbn = Some(isbn.clone());
        }
        if let Some(year) = self.publication_year {
            book.publication_year = Some(year);
        }
        if let Some(ref genre) = self.genre {
            book.genre = Some(genre.clone());
        }
    }
}

/// Exact-match filters for listing books
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub author: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        self.author.as_ref().map_or(true, |a| &book.author == a)
            && self.genre.as_ref().map_or(true, |g| book.genre.as_ref() == Some(g))
            && self.year.map_or(true, |y| book.publication_year == Some(y))
    }
}

/// Book list query parameters
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListBooksQuery {
    /// Filter by author (exact match)
    pub author: Option<String>,
    /// Filter by genre (exact match)
    pub genre: Option<String>,
    /// Filter by publication year
    #[validate(range(min = 1000, max = 2024, message = "Year must be between 1000 and 2024"))]
    pub year: Option<i32>,
    /// Page number, 1-based (default: 1)
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<i64>,
    /// Page size (default: 10, max: 100)
    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    pub page_size: Option<i64>,
}

impl ListBooksQuery {
    /// Filters for the repository; empty strings count as no filter
    pub fn filter(&self) -> BookFilter {
        let non_empty = |s: &Option<String>| s.clone().filter(|v| !v.is_empty());
        BookFilter {
            author: non_empty(&self.author),
            genre: non_empty(&self.genre),
            year: self.year,
        }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}
