//! crates/lending_ledger_core/src/domain.rs
//!
//! Defines the pure, core data structures for the lending ledger.
//! These structs are independent of any storage or serialization format.
//!
//! Calendar dates are `NaiveDate` values interpreted as UTC midnight; the
//! current instant is always passed in explicitly as a `DateTime<Utc>`.

use chrono::NaiveDate;
use std::fmt;
use uuid::Uuid;

/// A title in the library's inventory.
///
/// `available` is the number of copies not currently on loan and always
/// satisfies `0 <= available <= quantity`.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: String,
    pub quantity: u32,
    pub available: u32,
}

impl Book {
    /// True when at least one copy can be lent out.
    pub fn is_available(&self) -> bool {
        self.available > 0
    }

    /// Number of copies currently out on loan.
    pub fn on_loan(&self) -> u32 {
        self.quantity.saturating_sub(self.available)
    }
}

/// Input for adding a book to the catalog. `available` defaults to `quantity`.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: String,
    pub quantity: u32,
    pub available: Option<u32>,
}

/// A partial catalog edit. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub genre: Option<String>,
    pub quantity: Option<u32>,
    pub available: Option<u32>,
}

/// A single borrowing transaction. Append-only: only `return_date` is ever
/// written after creation, and only once.
#[derive(Debug, Clone, PartialEq)]
pub struct Loan {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
}

impl Loan {
    pub fn is_returned(&self) -> bool {
        self.return_date.is_some()
    }
}

/// Status of a loan, derived on every read and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoanStatus {
    Active,
    Overdue,
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Returned => "returned",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    Active,
    Banned,
}

// Represents a library member. Owned by the identity collaborator, only read here.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
}

impl User {
    pub fn is_banned(&self) -> bool {
        self.status == UserStatus::Banned
    }
}

/// A loan joined with its book and user, plus the status and fine derived at
/// a particular instant. Missing cross-references stay `None`.
#[derive(Debug, Clone)]
pub struct LoanView {
    pub loan: Loan,
    pub book: Option<Book>,
    pub user: Option<User>,
    pub status: LoanStatus,
    pub fine: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadingStatus {
    NotStarted,
    Reading,
    Completed,
    OnHold,
}

impl ReadingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::NotStarted => "not-started",
            ReadingStatus::Reading => "reading",
            ReadingStatus::Completed => "completed",
            ReadingStatus::OnHold => "on-hold",
        }
    }
}

impl std::str::FromStr for ReadingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not-started" => Ok(ReadingStatus::NotStarted),
            "reading" => Ok(ReadingStatus::Reading),
            "completed" => Ok(ReadingStatus::Completed),
            "on-hold" => Ok(ReadingStatus::OnHold),
            other => Err(format!("unknown reading status '{other}'")),
        }
    }
}

/// One user's progress through one book.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingProgressRecord {
    pub book_id: Uuid,
    pub status: ReadingStatus,
    /// Percentage, 0 to 100.
    pub progress: u8,
    pub current_page: u32,
    pub total_pages: u32,
    pub start_date: Option<NaiveDate>,
    /// Only set while `status` is `Completed`.
    pub finish_date: Option<NaiveDate>,
    pub notes: String,
}

/// One member's rating of a book. Each member holds at most one review per book.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    /// Stars, 1 to 5.
    pub rating: u8,
    pub text: String,
    /// Day the review was last submitted.
    pub date: NaiveDate,
}

/// A member-defined shelf label.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    /// `#RRGGBB`.
    pub color: String,
    pub book_ids: Vec<Uuid>,
}

impl Category {
    pub fn book_count(&self) -> usize {
        self.book_ids.len()
    }
}

/// A result returned by an external catalog lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: String,
    pub published: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_status_parses_its_own_labels() {
        for status in [
            ReadingStatus::NotStarted,
            ReadingStatus::Reading,
            ReadingStatus::Completed,
            ReadingStatus::OnHold,
        ] {
            assert_eq!(status.as_str().parse::<ReadingStatus>(), Ok(status));
        }
        assert!("finished".parse::<ReadingStatus>().is_err());
    }

    #[test]
    fn on_loan_counts_missing_copies() {
        let book = Book {
            id: Uuid::new_v4(),
            title: "1984".into(),
            author: "George Orwell".into(),
            isbn: "978-0-452-28423-4".into(),
            genre: "Science Fiction".into(),
            quantity: 4,
            available: 1,
        };
        assert_eq!(book.on_loan(), 3);
        assert!(book.is_available());
    }
}
