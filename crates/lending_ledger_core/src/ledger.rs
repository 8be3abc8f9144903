//! crates/lending_ledger_core/src/ledger.rs
//!
//! The inventory and loan ledger. Owns the book and loan collections, keeps
//! `0 <= available <= quantity` true for every book after every operation, and
//! is the single source of truth for loan status and fines.
//!
//! Mutations take `&mut self`, so the borrow checker already guarantees one
//! writer at a time. Callers that share a `Ledger` across tasks wrap it in a
//! lock.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{Book, BookUpdate, Loan, LoanStatus, LoanView, NewBook};
use crate::ports::UserDirectory;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

//=========================================================================================
// Errors
//=========================================================================================

/// Validation failures raised by ledger operations. A failed operation leaves
/// the ledger exactly as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("Book {0} has no copies available")]
    OutOfStock(Uuid),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Loan {0} has already been returned")]
    AlreadyReturned(Uuid),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
    #[error("User {user_id} already has {limit} books on loan")]
    LoanLimitReached { user_id: Uuid, limit: u32 },
}

pub type LedgerResult<T> = Result<T, LedgerError>;

//=========================================================================================
// Policy
//=========================================================================================

/// Library-wide lending rules supplied by configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LendingPolicy {
    /// Currency units charged per started day past the due date.
    pub daily_fine_rate: f64,
    pub borrow_period_days: u32,
    pub max_loans_per_user: u32,
}

impl Default for LendingPolicy {
    fn default() -> Self {
        Self {
            daily_fine_rate: 0.50,
            borrow_period_days: 28,
            max_loans_per_user: 5,
        }
    }
}

//=========================================================================================
// Derivations
//=========================================================================================

/// Start of `date` in UTC.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Derives the status of `loan` at `now`. Returned wins over overdue.
pub fn derive_status(loan: &Loan, now: DateTime<Utc>) -> LoanStatus {
    if loan.return_date.is_some() {
        LoanStatus::Returned
    } else if now > start_of_day(loan.due_date) {
        LoanStatus::Overdue
    } else {
        LoanStatus::Active
    }
}

/// Whole days late, rounding any started day up. Never negative.
pub fn days_late(
    due_date: NaiveDate,
    return_date: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> i64 {
    let effective_end = return_date.map(start_of_day).unwrap_or(now);
    let late_ms = (effective_end - start_of_day(due_date)).num_milliseconds();
    if late_ms <= 0 {
        0
    } else {
        (late_ms + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    }
}

/// Fine owed for a loan due on `due_date`. Unreturned loans keep accruing
/// against `now`.
pub fn calculate_fine(
    due_date: NaiveDate,
    return_date: Option<NaiveDate>,
    now: DateTime<Utc>,
    daily_rate: f64,
) -> f64 {
    days_late(due_date, return_date, now) as f64 * daily_rate
}

//=========================================================================================
// The Ledger
//=========================================================================================

#[derive(Debug, Default)]
pub struct Ledger {
    books: Vec<Book>,
    loans: Vec<Loan>,
    policy: LendingPolicy,
}

impl Ledger {
    pub fn new(policy: LendingPolicy) -> Self {
        Self {
            books: Vec::new(),
            loans: Vec::new(),
            policy,
        }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn book(&self, book_id: Uuid) -> Option<&Book> {
        self.books.iter().find(|b| b.id == book_id)
    }

    pub fn loan(&self, loan_id: Uuid) -> Option<&Loan> {
        self.loans.iter().find(|l| l.id == loan_id)
    }

    // --- Catalog ---

    pub fn add_book(&mut self, new_book: NewBook) -> LedgerResult<Uuid> {
        let available = new_book.available.unwrap_or(new_book.quantity);
        check_counts(new_book.quantity, available)?;

        let book = Book {
            id: Uuid::new_v4(),
            title: new_book.title,
            author: new_book.author,
            isbn: new_book.isbn,
            genre: new_book.genre,
            quantity: new_book.quantity,
            available,
        };
        let id = book.id;
        info!(book_id = %id, title = %book.title, quantity = book.quantity, "Book added");
        self.books.push(book);
        Ok(id)
    }

    /// Applies a catalog edit. When the quantity changes without an explicit
    /// `available`, the copies on loan stay on loan and `available` moves by the
    /// same delta. An explicit `available` is only accepted alongside a new
    /// quantity and may not put copies that are still on loan back on the
    /// shelf. Edits that would break the invariant are rejected whole.
    pub fn update_book(&mut self, book_id: Uuid, update: BookUpdate) -> LedgerResult<&Book> {
        let open_loans = self
            .loans
            .iter()
            .filter(|l| l.book_id == book_id && !l.is_returned())
            .count();
        let book = self
            .books
            .iter_mut()
            .find(|b| b.id == book_id)
            .ok_or_else(|| LedgerError::NotFound(format!("Book {book_id} not found")))?;

        let quantity = update.quantity.unwrap_or(book.quantity);
        let available = match update.available {
            Some(_) if quantity == book.quantity => {
                warn!(book_id = %book_id, "Rejected direct availability edit");
                return Err(LedgerError::InvalidQuantity(
                    "available can only be set together with a new quantity".to_string(),
                ));
            }
            Some(available) => {
                let open_loans = u32::try_from(open_loans).unwrap_or(u32::MAX);
                let shelf_limit = quantity.saturating_sub(open_loans);
                if available > shelf_limit {
                    warn!(book_id = %book_id, quantity, available, open_loans, "Rejected catalog edit");
                    return Err(LedgerError::InvalidQuantity(format!(
                        "available copies ({available}) exceed the {shelf_limit} not on loan"
                    )));
                }
                available
            }
            None => {
                let shifted = i64::from(book.available) + i64::from(quantity)
                    - i64::from(book.quantity);
                u32::try_from(shifted).map_err(|_| {
                    LedgerError::InvalidQuantity(format!(
                        "quantity {quantity} is below the {} copies on loan",
                        book.on_loan()
                    ))
                })?
            }
        };
        if let Err(err) = check_counts(quantity, available) {
            warn!(book_id = %book_id, quantity, available, "Rejected catalog edit");
            return Err(err);
        }

        if let Some(title) = update.title {
            book.title = title;
        }
        if let Some(author) = update.author {
            book.author = author;
        }
        if let Some(isbn) = update.isbn {
            book.isbn = isbn;
        }
        if let Some(genre) = update.genre {
            book.genre = genre;
        }
        book.quantity = quantity;
        book.available = available;
        info!(book_id = %book_id, quantity, available, "Book updated");
        Ok(book)
    }

    /// Removes a book from the catalog. Its loans remain as history.
    pub fn delete_book(&mut self, book_id: Uuid) -> LedgerResult<Book> {
        let index = self
            .books
            .iter()
            .position(|b| b.id == book_id)
            .ok_or_else(|| LedgerError::NotFound(format!("Book {book_id} not found")))?;
        let book = self.books.remove(index);
        info!(book_id = %book_id, title = %book.title, "Book deleted");
        Ok(book)
    }

    /// Case-insensitive match on title or author, plain substring on ISBN.
    pub fn search_books(&self, term: &str) -> Vec<&Book> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.books.iter().collect();
        }
        self.books
            .iter()
            .filter(|b| {
                b.title.to_lowercase().contains(&needle)
                    || b.author.to_lowercase().contains(&needle)
                    || b.isbn.contains(term.trim())
            })
            .collect()
    }

    // --- Loans ---

    /// Lends one copy of `book_id` to `user_id`. The availability decrement
    /// and the new loan record are applied together or not at all.
    pub fn create_loan(
        &mut self,
        book_id: Uuid,
        user_id: Uuid,
        borrow_date: NaiveDate,
        due_date: NaiveDate,
    ) -> LedgerResult<Uuid> {
        let book = self
            .books
            .iter_mut()
            .find(|b| b.id == book_id)
            .ok_or_else(|| LedgerError::NotFound(format!("Book {book_id} not found")))?;

        if book.available == 0 {
            warn!(book_id = %book_id, user_id = %user_id, "Loan refused, no copies available");
            return Err(LedgerError::OutOfStock(book_id));
        }

        book.available -= 1;
        let loan = Loan {
            id: Uuid::new_v4(),
            book_id,
            user_id,
            borrow_date,
            due_date,
            return_date: None,
        };
        let loan_id = loan.id;
        self.loans.push(loan);
        info!(loan_id = %loan_id, book_id = %book_id, user_id = %user_id, %due_date, "Loan created");
        Ok(loan_id)
    }

    /// Lends a copy using the configured borrow period and per-user limit.
    pub fn checkout(&mut self, book_id: Uuid, user_id: Uuid, today: NaiveDate) -> LedgerResult<Uuid> {
        let limit = self.policy.max_loans_per_user;
        let outstanding = self.outstanding_loans_for(user_id).len();
        if outstanding >= limit as usize {
            warn!(user_id = %user_id, outstanding, limit, "Loan refused, limit reached");
            return Err(LedgerError::LoanLimitReached { user_id, limit });
        }
        let period = self.policy.borrow_period_days;
        let due_date = today
            .checked_add_days(Days::new(u64::from(period)))
            .ok_or_else(|| {
                LedgerError::InvalidDate(format!("{today} plus {period} days is out of range"))
            })?;
        self.create_loan(book_id, user_id, today, due_date)
    }

    /// Marks a loan returned and puts the copy back on the shelf. The
    /// increment is clamped to `quantity` so a return is never lost.
    pub fn return_loan(&mut self, loan_id: Uuid, return_date: NaiveDate) -> LedgerResult<()> {
        let loan = self
            .loans
            .iter_mut()
            .find(|l| l.id == loan_id)
            .ok_or_else(|| LedgerError::NotFound(format!("Loan {loan_id} not found")))?;

        if loan.return_date.is_some() {
            return Err(LedgerError::AlreadyReturned(loan_id));
        }
        loan.return_date = Some(return_date);
        let book_id = loan.book_id;

        match self.books.iter_mut().find(|b| b.id == book_id) {
            Some(book) => {
                if book.available >= book.quantity {
                    debug!(book_id = %book_id, "Return clamped at catalog quantity");
                }
                book.available = (book.available + 1).min(book.quantity);
            }
            None => warn!(loan_id = %loan_id, book_id = %book_id, "Returned loan references a deleted book"),
        }
        info!(loan_id = %loan_id, %return_date, "Loan returned");
        Ok(())
    }

    pub fn outstanding_loans_for(&self, user_id: Uuid) -> Vec<&Loan> {
        self.loans
            .iter()
            .filter(|l| l.user_id == user_id && !l.is_returned())
            .collect()
    }

    pub fn history_for(&self, user_id: Uuid) -> Vec<&Loan> {
        self.loans.iter().filter(|l| l.user_id == user_id).collect()
    }

    // --- Derived views ---

    pub fn fine_for(&self, loan: &Loan, now: DateTime<Utc>) -> f64 {
        calculate_fine(loan.due_date, loan.return_date, now, self.policy.daily_fine_rate)
    }

    pub fn view<D>(&self, loan: &Loan, now: DateTime<Utc>, directory: &D) -> LoanView
    where
        D: UserDirectory + ?Sized,
    {
        LoanView {
            loan: loan.clone(),
            book: self.book(loan.book_id).cloned(),
            user: directory.find_user(loan.user_id),
            status: derive_status(loan, now),
            fine: self.fine_for(loan, now),
        }
    }

    /// Every loan joined with its book and user, in insertion order.
    pub fn loan_views<D>(&self, now: DateTime<Utc>, directory: &D) -> Vec<LoanView>
    where
        D: UserDirectory + ?Sized,
    {
        self.loans
            .iter()
            .map(|loan| self.view(loan, now, directory))
            .collect()
    }
}

fn check_counts(quantity: u32, available: u32) -> LedgerResult<()> {
    if quantity < 1 {
        return Err(LedgerError::InvalidQuantity(
            "a book must own at least one copy".to_string(),
        ));
    }
    if available > quantity {
        return Err(LedgerError::InvalidQuantity(format!(
            "available copies ({available}) exceed quantity ({quantity})"
        )));
    }
    Ok(())
}
