//! Book endpoints

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{Book, CreateBook, ListBooksQuery, UpdateBook},
};

use serde::Deserialize;

use super::{ValidatedJson, ValidatedPath, ValidatedQuery};

/// Number of books matching the list filters, regardless of the page window
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// `/books/:id`
#[derive(Debug, Deserialize)]
pub struct BookPath {
    pub id: i64,
}

/// List books with exact-match filters and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(ListBooksQuery),
    responses(
        (status = 200, description = "Page of books ordered by id", body = Vec<Book>,
            headers(("x-total-count" = i64, description = "Books matching the filters"))),
        (status = 422, description = "Invalid query parameters", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    ValidatedQuery(query): ValidatedQuery<ListBooksQuery>,
) -> AppResult<impl IntoResponse> {
    let (books, total) = state
        .services
        .books
        .list_books(&query.filter(), query.page(), query.page_size())
        .await?;

    Ok(([(TOTAL_COUNT_HEADER, total.to_string())], Json(books)))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    ValidatedPath(BookPath { id }): ValidatedPath<BookPath>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get_book(id).await?;
    Ok(Json(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book,
            headers(("location" = String, description = "URL of the new book"))),
        (status = 422, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    ValidatedJson(payload): ValidatedJson<CreateBook>,
) -> AppResult<impl IntoResponse> {
    let created = state.services.books.create_book(&payload).await?;
    let location = format!("/books/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

/// Update an existing book; only fields present and non-null are changed
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    ValidatedPath(BookPath { id }): ValidatedPath<BookPath>,
    ValidatedJson(payload): ValidatedJson<UpdateBook>,
) -> AppResult<Json<Book>> {
    let updated = state.services.books.update_book(id, payload).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    ValidatedPath(BookPath { id }): ValidatedPath<BookPath>,
) -> AppResult<StatusCode> {
    state.services.books.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
