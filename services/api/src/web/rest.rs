//! services/api/src/web/rest.rs
//!
//! Assembles the REST routes and the master definition for the OpenAPI
//! specification.

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::web::{
    books::{self, *},
    catalog::{self, *},
    categories::{self, *},
    loans::{self, *},
    protocol::*,
    reading::{self, *},
    reports::{self, *},
    reviews::{self, *},
    state::AppState,
    users::{self, *},
};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        books::list_books_handler,
        books::create_book_handler,
        books::update_book_handler,
        books::delete_book_handler,
        reviews::book_reviews_handler,
        reviews::submit_review_handler,
        users::list_users_handler,
        loans::list_loans_handler,
        loans::create_loan_handler,
        loans::return_loan_handler,
        loans::user_loans_handler,
        reports::export_report_handler,
        reports::report_summary_handler,
        reading::list_progress_handler,
        reading::update_progress_handler,
        reading::reading_stats_handler,
        categories::list_categories_handler,
        categories::create_category_handler,
        categories::update_category_handler,
        categories::delete_category_handler,
        categories::assign_book_handler,
        categories::remove_book_handler,
        catalog::catalog_search_handler,
    ),
    components(
        schemas(
            BookResponse,
            CreateBookRequest,
            UpdateBookRequest,
            UserResponse,
            CreateLoanRequest,
            CreateLoanResponse,
            ReturnLoanRequest,
            LoanViewResponse,
            ReportSummaryResponse,
            ProgressRequest,
            ProgressResponse,
            ReadingStatsResponse,
            ReviewRequest,
            ReviewResponse,
            BookReviewsResponse,
            CategoryRequest,
            CategoryResponse,
            CatalogEntryResponse,
        )
    ),
    tags(
        (name = "Library Lending API", description = "Catalog, loans, reports, reviews and reading analytics.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Router
//=========================================================================================

/// Every API route, bound to the shared state. Cross-cutting layers such as
/// CORS are added by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/books", get(list_books_handler).post(create_book_handler))
        .route("/books/{id}", put(update_book_handler).delete(delete_book_handler))
        .route("/books/{id}/reviews", get(book_reviews_handler))
        .route("/books/{id}/reviews/{user_id}", put(submit_review_handler))
        .route("/users", get(list_users_handler))
        .route("/users/{id}/loans", get(user_loans_handler))
        .route("/users/{id}/reading", get(list_progress_handler))
        .route("/users/{id}/reading/stats", get(reading_stats_handler))
        .route("/users/{id}/reading/{book_id}", put(update_progress_handler))
        .route(
            "/users/{id}/categories",
            get(list_categories_handler).post(create_category_handler),
        )
        .route(
            "/users/{id}/categories/{category_id}",
            put(update_category_handler).delete(delete_category_handler),
        )
        .route(
            "/users/{id}/categories/{category_id}/books/{book_id}",
            put(assign_book_handler).delete(remove_book_handler),
        )
        .route("/loans", get(list_loans_handler).post(create_loan_handler))
        .route("/loans/{id}/return", post(return_loan_handler))
        .route("/reports", get(export_report_handler))
        .route("/reports/summary", get(report_summary_handler))
        .route("/catalog/search", get(catalog_search_handler))
        .with_state(state)
}
