//! services/api/src/web/reviews.rs
//!
//! Star ratings and reviews of catalog books.

use axum::{
    extract::{Path, State},
    Json,
};
use lending_ledger_core::{ports::UserDirectory, LedgerError};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::loans::find_member;
use crate::web::protocol::{BookReviewsResponse, ReviewRequest, ReviewResponse};
use crate::web::state::AppState;

/// Fails with 404 unless `book_id` is in the catalog.
pub(crate) async fn ensure_book(state: &AppState, book_id: Uuid) -> Result<(), ApiError> {
    if state.ledger.read().await.book(book_id).is_none() {
        return Err(LedgerError::NotFound(format!("Book {book_id} not found")).into());
    }
    Ok(())
}

/// Every review of a book with its average rating.
#[utoipa::path(
    get,
    path = "/books/{id}/reviews",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 200, description = "Reviews in submission order", body = BookReviewsResponse),
        (status = 404, description = "No such book")
    )
)]
pub async fn book_reviews_handler(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<BookReviewsResponse>, ApiError> {
    ensure_book(&state, book_id).await?;
    let reviews = state.reviews.read().await;
    let entries: Vec<ReviewResponse> = reviews
        .reviews_for(book_id)
        .into_iter()
        .map(|review| {
            let name = state.directory.find_user(review.user_id).map(|u| u.name);
            ReviewResponse::new(review, name)
        })
        .collect();
    Ok(Json(BookReviewsResponse {
        book_id,
        average_rating: reviews.average_rating(book_id),
        review_count: entries.len(),
        reviews: entries,
    }))
}

/// Create or replace the member's review of a book.
#[utoipa::path(
    put,
    path = "/books/{id}/reviews/{user_id}",
    request_body = ReviewRequest,
    params(
        ("id" = Uuid, Path, description = "Book id"),
        ("user_id" = Uuid, Path, description = "Member id")
    ),
    responses(
        (status = 200, description = "Stored review", body = ReviewResponse),
        (status = 400, description = "Rating outside 1 to 5"),
        (status = 404, description = "Unknown book or member")
    )
)]
pub async fn submit_review_handler(
    State(state): State<Arc<AppState>>,
    Path((book_id, user_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let member = find_member(&state, user_id)?;
    ensure_book(&state, book_id).await?;
    let mut reviews = state.reviews.write().await;
    let review = reviews.submit(user_id, book_id, req.rating, &req.review, state.clock.today())?;
    Ok(Json(ReviewResponse::new(review, Some(member.name))))
}
