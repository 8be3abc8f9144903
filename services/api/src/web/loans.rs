//! services/api/src/web/loans.rs
//!
//! Lending endpoints: list, lend, return, and per-member history.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use lending_ledger_core::{
    build_report,
    ports::{PortError, UserDirectory},
    Report, ReportFilter, User,
};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::protocol::{
    CreateLoanRequest, CreateLoanResponse, LoanQuery, LoanViewResponse, ReturnLoanRequest,
};
use crate::web::state::AppState;

/// Looks up a member, failing with 404 when the directory does not know them.
pub(crate) fn find_member(state: &AppState, user_id: Uuid) -> Result<User, ApiError> {
    state
        .directory
        .find_user(user_id)
        .ok_or_else(|| ApiError::Port(PortError::NotFound(format!("User {user_id} not found"))))
}

/// List loans joined with their book and member, newest borrow date first.
#[utoipa::path(
    get,
    path = "/loans",
    params(LoanQuery),
    responses(
        (status = 200, description = "Matching loans", body = [LoanViewResponse]),
        (status = 400, description = "Malformed filter")
    )
)]
pub async fn list_loans_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoanQuery>,
) -> Result<Json<Vec<LoanViewResponse>>, ApiError> {
    let filter = query.to_filter()?;
    let as_of = query.as_of.unwrap_or_else(|| state.clock.now());
    let ledger = state.ledger.read().await;
    let report = build_report(&ledger, state.directory.as_ref(), filter, as_of);
    Ok(Json(report.rows.iter().map(LoanViewResponse::from).collect()))
}

/// Lend one copy of a book to a member.
///
/// Without an explicit `due_date` the configured borrow period and loan limit
/// apply.
#[utoipa::path(
    post,
    path = "/loans",
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan created", body = CreateLoanResponse),
        (status = 403, description = "Member is banned"),
        (status = 404, description = "Unknown book or member"),
        (status = 409, description = "No copies available or loan limit reached")
    )
)]
pub async fn create_loan_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLoanRequest>,
) -> Result<(StatusCode, Json<CreateLoanResponse>), ApiError> {
    let member = find_member(&state, req.user_id)?;
    if member.is_banned() {
        warn!(user_id = %member.id, "Loan refused, member is banned");
        return Err(ApiError::Forbidden(format!("{} is banned from borrowing", member.name)));
    }

    let borrow_date = req.borrow_date.unwrap_or_else(|| state.clock.today());
    let mut ledger = state.ledger.write().await;
    let loan_id = match req.due_date {
        Some(due_date) => ledger.create_loan(req.book_id, member.id, borrow_date, due_date)?,
        None => ledger.checkout(req.book_id, member.id, borrow_date)?,
    };
    Ok((StatusCode::CREATED, Json(CreateLoanResponse { loan_id })))
}

/// Mark a loan returned.
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    request_body = ReturnLoanRequest,
    params(("id" = Uuid, Path, description = "Loan id")),
    responses(
        (status = 200, description = "Loan returned", body = LoanViewResponse),
        (status = 404, description = "No such loan"),
        (status = 409, description = "Loan already returned")
    )
)]
pub async fn return_loan_handler(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
    Json(req): Json<ReturnLoanRequest>,
) -> Result<Json<LoanViewResponse>, ApiError> {
    let return_date = req.return_date.unwrap_or_else(|| state.clock.today());
    let mut ledger = state.ledger.write().await;
    ledger.return_loan(loan_id, return_date)?;
    let loan = ledger
        .loan(loan_id)
        .ok_or_else(|| ApiError::Internal(format!("Loan {loan_id} vanished after return")))?;
    let view = ledger.view(loan, state.clock.now(), state.directory.as_ref());
    Ok(Json(LoanViewResponse::from(&view)))
}

/// A member's full borrowing history, newest first.
#[utoipa::path(
    get,
    path = "/users/{id}/loans",
    params(("id" = Uuid, Path, description = "Member id")),
    responses(
        (status = 200, description = "Loans for the member", body = [LoanViewResponse]),
        (status = 404, description = "Unknown member")
    )
)]
pub async fn user_loans_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<LoanViewResponse>>, ApiError> {
    let member = find_member(&state, user_id)?;
    let now = state.clock.now();
    let ledger = state.ledger.read().await;
    let views = ledger
        .history_for(member.id)
        .into_iter()
        .map(|loan| ledger.view(loan, now, state.directory.as_ref()))
        .collect();
    let report = Report::from_views(views, ReportFilter::default(), now);
    Ok(Json(report.rows.iter().map(LoanViewResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::state::test_support::fixture;
    use chrono::NaiveDate;
    use lending_ledger_core::NewBook;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn add_book(state: &AppState, quantity: u32) -> Uuid {
        state
            .ledger
            .write()
            .await
            .add_book(NewBook {
                title: "1984".into(),
                author: "George Orwell".into(),
                isbn: "978-0-452-28423-4".into(),
                genre: "Fiction".into(),
                quantity,
                available: None,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn lend_and_return_through_handlers() {
        let fx = fixture();
        let book_id = add_book(&fx.state, 1).await;

        let (status, Json(created)) = create_loan_handler(
            State(fx.state.clone()),
            Json(CreateLoanRequest {
                book_id,
                user_id: fx.active_user.id,
                borrow_date: Some(date(2025, 11, 1)),
                due_date: Some(date(2025, 11, 12)),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        // Last copy is gone.
        let err = create_loan_handler(
            State(fx.state.clone()),
            Json(CreateLoanRequest {
                book_id,
                user_id: fx.active_user.id,
                borrow_date: None,
                due_date: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let Json(listed) = list_loans_handler(
            State(fx.state.clone()),
            Query(LoanQuery {
                status: Some("overdue".into()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].user_name.as_deref(), Some("John Doe"));
        assert_eq!(listed[0].fine, 1.5);

        let Json(returned) = return_loan_handler(
            State(fx.state.clone()),
            Path(created.loan_id),
            Json(ReturnLoanRequest::default()),
        )
        .await
        .unwrap();
        assert_eq!(returned.status, "returned");
        assert_eq!(returned.return_date, Some(date(2025, 11, 15)));
        assert_eq!(fx.state.ledger.read().await.book(book_id).unwrap().available, 1);

        let err = return_loan_handler(
            State(fx.state.clone()),
            Path(created.loan_id),
            Json(ReturnLoanRequest::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn banned_and_unknown_members_cannot_borrow() {
        let fx = fixture();
        let book_id = add_book(&fx.state, 2).await;

        let err = create_loan_handler(
            State(fx.state.clone()),
            Json(CreateLoanRequest {
                book_id,
                user_id: fx.banned_user.id,
                borrow_date: None,
                due_date: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err = create_loan_handler(
            State(fx.state.clone()),
            Json(CreateLoanRequest {
                book_id,
                user_id: Uuid::new_v4(),
                borrow_date: None,
                due_date: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(fx.state.ledger.read().await.book(book_id).unwrap().available, 2);
    }

    #[tokio::test]
    async fn history_lists_only_the_member() {
        let fx = fixture();
        let book_id = add_book(&fx.state, 3).await;
        create_loan_handler(
            State(fx.state.clone()),
            Json(CreateLoanRequest {
                book_id,
                user_id: fx.active_user.id,
                borrow_date: None,
                due_date: None,
            }),
        )
        .await
        .unwrap();

        let Json(history) = user_loans_handler(State(fx.state.clone()), Path(fx.active_user.id))
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].due_date, date(2025, 12, 13));
        assert_eq!(history[0].status, "active");

        let Json(none) = user_loans_handler(State(fx.state.clone()), Path(fx.banned_user.id))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn out_of_range_borrow_date_is_a_bad_request() {
        let fx = fixture();
        let book_id = add_book(&fx.state, 1).await;
        let err = create_loan_handler(
            State(fx.state.clone()),
            Json(CreateLoanRequest {
                book_id,
                user_id: fx.active_user.id,
                borrow_date: Some(NaiveDate::MAX),
                due_date: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(fx.state.ledger.read().await.book(book_id).unwrap().available, 1);
    }
}
