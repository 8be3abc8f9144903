//! services/api/src/web/books.rs
//!
//! Catalog management endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::protocol::{BookResponse, BookSearchQuery, CreateBookRequest, UpdateBookRequest};
use crate::web::state::AppState;

/// List the catalog, optionally filtered by title, author or ISBN.
#[utoipa::path(
    get,
    path = "/books",
    params(BookSearchQuery),
    responses((status = 200, description = "Books in catalog order", body = [BookResponse]))
)]
pub async fn list_books_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookSearchQuery>,
) -> Json<Vec<BookResponse>> {
    let ledger = state.ledger.read().await;
    let books = ledger
        .search_books(query.search.as_deref().unwrap_or_default())
        .into_iter()
        .map(BookResponse::from)
        .collect();
    Json(books)
}

/// Add a book to the catalog.
#[utoipa::path(
    post,
    path = "/books",
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book added", body = BookResponse),
        (status = 400, description = "Quantity or availability out of range")
    )
)]
pub async fn create_book_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let mut ledger = state.ledger.write().await;
    let book_id = ledger.add_book(req.into())?;
    let book = ledger
        .book(book_id)
        .ok_or_else(|| ApiError::Internal(format!("Book {book_id} vanished after insert")))?;
    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// Edit a catalog entry. Edits that would leave more copies available than
/// owned are rejected.
#[utoipa::path(
    put,
    path = "/books/{id}",
    request_body = UpdateBookRequest,
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 400, description = "Quantity or availability out of range"),
        (status = 404, description = "No such book")
    )
)]
pub async fn update_book_handler(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
    Json(req): Json<UpdateBookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let mut ledger = state.ledger.write().await;
    let book = ledger.update_book(book_id, req.into())?;
    Ok(Json(BookResponse::from(book)))
}

/// Remove a book from the catalog. Past loans stay in the history.
#[utoipa::path(
    delete,
    path = "/books/{id}",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 204, description = "Book removed"),
        (status = 404, description = "No such book")
    )
)]
pub async fn delete_book_handler(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.ledger.write().await.delete_book(book_id)?;
    Ok(StatusCode::NO_CONTENT)
}
