//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between HTTP clients and the API server,
//! and their conversions to and from the core domain types.

use chrono::{DateTime, NaiveDate, Utc};
use lending_ledger_core::{
    analytics::ProgressUpdate, rating_label, Achievement, Book, BookUpdate, CatalogEntry, Category,
    ExportFormat, LoanView, NewBook, ReadingProgressRecord, ReadingStats, ReadingStatus, Report,
    ReportFilter, Review, StatusFilter, User,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;

//=========================================================================================
// Books
//=========================================================================================

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: String,
    pub quantity: u32,
    pub available: u32,
}

impl From<&Book> for BookResponse {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            genre: book.genre.clone(),
            quantity: book.quantity,
            available: book.available,
        }
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: String,
    pub quantity: u32,
    /// Defaults to `quantity`.
    pub available: Option<u32>,
}

impl From<CreateBookRequest> for NewBook {
    fn from(req: CreateBookRequest) -> Self {
        Self {
            title: req.title,
            author: req.author,
            isbn: req.isbn,
            genre: req.genre,
            quantity: req.quantity,
            available: req.available,
        }
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub genre: Option<String>,
    pub quantity: Option<u32>,
    /// Only accepted together with a changed `quantity`, and never more than
    /// the copies not currently on loan.
    pub available: Option<u32>,
}

impl From<UpdateBookRequest> for BookUpdate {
    fn from(req: UpdateBookRequest) -> Self {
        Self {
            title: req.title,
            author: req.author,
            isbn: req.isbn,
            genre: req.genre,
            quantity: req.quantity,
            available: req.available,
        }
    }
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookSearchQuery {
    /// Matches title, author or ISBN.
    pub search: Option<String>,
}

//=========================================================================================
// Members
//=========================================================================================

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub banned: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            banned: user.is_banned(),
        }
    }
}

//=========================================================================================
// Loans
//=========================================================================================

#[derive(Deserialize, Debug, ToSchema)]
pub struct CreateLoanRequest {
    pub book_id: Uuid,
    pub user_id: Uuid,
    /// Defaults to today.
    pub borrow_date: Option<NaiveDate>,
    /// Defaults to the borrow date plus the configured borrow period, in
    /// which case the per-member loan limit also applies.
    pub due_date: Option<NaiveDate>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct CreateLoanResponse {
    pub loan_id: Uuid,
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct ReturnLoanRequest {
    /// Defaults to today.
    pub return_date: Option<NaiveDate>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct LoanViewResponse {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub book_title: Option<String>,
    pub user_name: Option<String>,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: String,
    pub fine: f64,
}

impl From<&LoanView> for LoanViewResponse {
    fn from(view: &LoanView) -> Self {
        Self {
            id: view.loan.id,
            book_id: view.loan.book_id,
            user_id: view.loan.user_id,
            book_title: view.book.as_ref().map(|b| b.title.clone()),
            user_name: view.user.as_ref().map(|u| u.name.clone()),
            borrow_date: view.loan.borrow_date,
            due_date: view.loan.due_date,
            return_date: view.loan.return_date,
            status: view.status.to_string(),
            fine: view.fine,
        }
    }
}

/// Filters shared by the loan listing and the report endpoints. Dates use
/// `YYYY-MM-DD`; anything else is rejected.
#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoanQuery {
    /// One of `all`, `active`, `overdue`, `returned`.
    pub status: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    /// Matches book title or member name.
    pub search: Option<String>,
    /// Evaluate statuses and fines at this instant instead of now.
    pub as_of: Option<DateTime<Utc>>,
}

impl LoanQuery {
    pub fn to_filter(&self) -> Result<ReportFilter, ApiError> {
        let status = match self.status.as_deref() {
            Some(raw) => raw.parse::<StatusFilter>().map_err(ApiError::BadRequest)?,
            None => StatusFilter::All,
        };
        Ok(ReportFilter {
            status,
            date_from: parse_date("date_from", self.date_from.as_deref())?,
            date_to: parse_date("date_to", self.date_to.as_deref())?,
            search: self.search.clone(),
        })
    }
}

fn parse_date(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("{name} must be a YYYY-MM-DD date, got '{value}'"))),
    }
}

//=========================================================================================
// Reports
//=========================================================================================

#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// `csv` or `html` (default).
    pub format: Option<String>,
    /// One of `all`, `active`, `overdue`, `returned`.
    pub status: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    /// Matches book title or member name.
    pub search: Option<String>,
    /// Generate the report as of this instant instead of now.
    pub as_of: Option<DateTime<Utc>>,
}

impl ReportQuery {
    pub fn loan_query(&self) -> LoanQuery {
        LoanQuery {
            status: self.status.clone(),
            date_from: self.date_from.clone(),
            date_to: self.date_to.clone(),
            search: self.search.clone(),
            as_of: self.as_of,
        }
    }

    pub fn export_format(&self) -> Result<ExportFormat, ApiError> {
        match self.format.as_deref() {
            Some(raw) => raw.parse::<ExportFormat>().map_err(ApiError::BadRequest),
            None => Ok(ExportFormat::default()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ReportSummaryResponse {
    pub generated_at: DateTime<Utc>,
    pub filters: String,
    pub total: usize,
    pub active: usize,
    pub overdue: usize,
    pub returned: usize,
    pub total_fines: f64,
}

impl From<&Report> for ReportSummaryResponse {
    fn from(report: &Report) -> Self {
        Self {
            generated_at: report.generated_at,
            filters: report.filter.describe(),
            total: report.summary.total,
            active: report.summary.active,
            overdue: report.summary.overdue,
            returned: report.summary.returned,
            total_fines: report.summary.total_fines,
        }
    }
}

//=========================================================================================
// Reading Progress
//=========================================================================================

#[derive(Deserialize, Debug, ToSchema)]
pub struct ProgressRequest {
    /// One of `not-started`, `reading`, `completed`, `on-hold`.
    pub status: String,
    pub progress: Option<u8>,
    pub current_page: Option<u32>,
    pub total_pages: Option<u32>,
    pub notes: Option<String>,
}

impl ProgressRequest {
    pub fn into_update(self, book_id: Uuid) -> Result<ProgressUpdate, ApiError> {
        let status = self
            .status
            .parse::<ReadingStatus>()
            .map_err(ApiError::BadRequest)?;
        if self.progress.is_some_and(|p| p > 100) {
            return Err(ApiError::BadRequest("progress must be between 0 and 100".to_string()));
        }
        Ok(ProgressUpdate {
            book_id,
            status,
            progress: self.progress,
            current_page: self.current_page,
            total_pages: self.total_pages,
            notes: self.notes,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ProgressResponse {
    pub book_id: Uuid,
    pub status: String,
    pub progress: u8,
    pub current_page: u32,
    pub total_pages: u32,
    pub start_date: Option<NaiveDate>,
    pub finish_date: Option<NaiveDate>,
    pub notes: String,
}

impl From<&ReadingProgressRecord> for ProgressResponse {
    fn from(record: &ReadingProgressRecord) -> Self {
        Self {
            book_id: record.book_id,
            status: record.status.as_str().to_string(),
            progress: record.progress,
            current_page: record.current_page,
            total_pages: record.total_pages,
            start_date: record.start_date,
            finish_date: record.finish_date,
            notes: record.notes.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ReadingStatsResponse {
    pub total: usize,
    pub completed: usize,
    pub reading: usize,
    pub on_hold: usize,
    pub average_progress: u8,
    pub finished_this_month: usize,
    pub streak: u32,
    pub completed_share: f64,
    pub reading_share: f64,
    pub on_hold_share: f64,
    pub achievements: Vec<String>,
}

impl From<&ReadingStats> for ReadingStatsResponse {
    fn from(stats: &ReadingStats) -> Self {
        Self {
            total: stats.total,
            completed: stats.completed,
            reading: stats.reading,
            on_hold: stats.on_hold,
            average_progress: stats.average_progress,
            finished_this_month: stats.finished_this_month,
            streak: stats.streak,
            completed_share: stats.completed_share(),
            reading_share: stats.reading_share(),
            on_hold_share: stats.on_hold_share(),
            achievements: stats
                .achievements()
                .iter()
                .map(Achievement::label)
                .map(str::to_string)
                .collect(),
        }
    }
}

//=========================================================================================
// Reviews
//=========================================================================================

#[derive(Deserialize, Debug, ToSchema)]
pub struct ReviewRequest {
    /// Stars, 1 to 5.
    pub rating: u8,
    #[serde(default)]
    pub review: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    /// Absent when the member has since left the directory.
    pub user_name: Option<String>,
    pub rating: u8,
    pub rating_label: String,
    pub review: String,
    pub date: NaiveDate,
}

impl ReviewResponse {
    pub fn new(review: &Review, user_name: Option<String>) -> Self {
        Self {
            id: review.id,
            book_id: review.book_id,
            user_id: review.user_id,
            user_name,
            rating: review.rating,
            rating_label: rating_label(review.rating).unwrap_or_default().to_string(),
            review: review.text.clone(),
            date: review.date,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct BookReviewsResponse {
    pub book_id: Uuid,
    /// 0 when the book has no reviews.
    pub average_rating: f64,
    pub review_count: usize,
    pub reviews: Vec<ReviewResponse>,
}

//=========================================================================================
// Categories
//=========================================================================================

#[derive(Deserialize, Debug, ToSchema)]
pub struct CategoryRequest {
    pub name: String,
    /// `#RRGGBB`. Defaults to the first preset on create and is left unchanged on edit.
    pub color: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub book_count: usize,
    pub book_ids: Vec<Uuid>,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            color: category.color.clone(),
            book_count: category.book_count(),
            book_ids: category.book_ids.clone(),
        }
    }
}

//=========================================================================================
// Catalog
//=========================================================================================

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogQuery {
    /// ISBN, title or author.
    pub q: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct CatalogEntryResponse {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: String,
    pub published: Option<NaiveDate>,
}

impl From<CatalogEntry> for CatalogEntryResponse {
    fn from(entry: CatalogEntry) -> Self {
        Self {
            title: entry.title,
            author: entry.author,
            isbn: entry.isbn,
            genre: entry.genre,
            published: entry.published,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_filter_dates_are_rejected() {
        let query = LoanQuery {
            date_from: Some("11/15/2025".into()),
            ..Default::default()
        };
        assert!(matches!(query.to_filter(), Err(ApiError::BadRequest(_))));

        let query = LoanQuery {
            status: Some("overdue".into()),
            date_from: Some("2025-11-15".into()),
            date_to: Some("".into()),
            ..Default::default()
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.status, StatusFilter::Overdue);
        assert_eq!(filter.date_from, NaiveDate::from_ymd_opt(2025, 11, 15));
        assert_eq!(filter.date_to, None);
    }

    #[test]
    fn progress_request_validates_status_and_range() {
        let book = Uuid::new_v4();
        let bad_status = ProgressRequest {
            status: "done".into(),
            progress: None,
            current_page: None,
            total_pages: None,
            notes: None,
        };
        assert!(bad_status.into_update(book).is_err());

        let too_far = ProgressRequest {
            status: "reading".into(),
            progress: Some(120),
            current_page: None,
            total_pages: None,
            notes: None,
        };
        assert!(too_far.into_update(book).is_err());
    }
}
