//! services/api/src/seed.rs
//!
//! A small demo library loaded at startup when `SEED_DEMO_DATA` is set.

use chrono::NaiveDate;
use lending_ledger_core::{Ledger, LendingPolicy, NewBook, User, UserStatus};
use tracing::info;
use uuid::Uuid;

use crate::adapters::InMemoryUserDirectory;
use crate::error::ApiError;

const BOOKS: [(&str, &str, &str, &str, u32); 10] = [
    ("To Kill a Mockingbird", "Harper Lee", "978-0-06-112008-4", "Fiction", 5),
    ("1984", "George Orwell", "978-0-452-28423-4", "Science Fiction", 4),
    ("Pride and Prejudice", "Jane Austen", "978-0-14-143951-8", "Romance", 6),
    ("The Great Gatsby", "F. Scott Fitzgerald", "978-0-7432-7356-5", "Fiction", 3),
    ("The Hobbit", "J.R.R. Tolkien", "978-0-547-92822-7", "Fantasy", 7),
    ("Harry Potter and the Philosopher's Stone", "J.K. Rowling", "978-0-439-70818-8", "Fantasy", 8),
    ("The Catcher in the Rye", "J.D. Salinger", "978-0-316-76948-0", "Fiction", 4),
    ("The Lord of the Rings", "J.R.R. Tolkien", "978-0-618-64561-1", "Fantasy", 5),
    ("The Alchemist", "Paulo Coelho", "978-0-06-112241-5", "Fiction", 6),
    ("Sapiens: A Brief History of Humankind", "Yuval Noah Harari", "978-0-06-231609-7", "Non-Fiction", 5),
];

const USERS: [(&str, &str, UserStatus); 4] = [
    ("John Doe", "john@library.com", UserStatus::Active),
    ("Sarah Smith", "sarah@library.com", UserStatus::Active),
    ("Mike Johnson", "mike@library.com", UserStatus::Active),
    ("Emma Wilson", "emma@library.com", UserStatus::Banned),
];

/// (book index, user index, borrowed, due) as (y, m, d) triples.
type LoanSeed = (usize, usize, (i32, u32, u32), (i32, u32, u32));

const LOANS: [LoanSeed; 4] = [
    (0, 0, (2025, 11, 1), (2025, 11, 29)),
    (1, 0, (2025, 11, 5), (2025, 12, 3)),
    (3, 1, (2025, 11, 10), (2025, 12, 8)),
    (5, 0, (2025, 10, 15), (2025, 11, 12)),
];

fn ymd((y, m, d): (i32, u32, u32)) -> Result<NaiveDate, ApiError> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| ApiError::Internal(format!("invalid seed date {y}-{m}-{d}")))
}

/// Builds a ledger and member directory populated with demo data. Every loan
/// goes through the ledger, so availability reflects the copies on loan.
pub fn demo_library(policy: LendingPolicy) -> Result<(Ledger, InMemoryUserDirectory), ApiError> {
    let mut ledger = Ledger::new(policy);
    let mut book_ids = Vec::with_capacity(BOOKS.len());
    for (title, author, isbn, genre, quantity) in BOOKS {
        book_ids.push(ledger.add_book(NewBook {
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.to_string(),
            genre: genre.to_string(),
            quantity,
            available: None,
        })?);
    }

    let users: Vec<User> = USERS
        .into_iter()
        .map(|(name, email, status)| User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            status,
        })
        .collect();

    for (book, user, borrowed, due) in LOANS {
        ledger.create_loan(book_ids[book], users[user].id, ymd(borrowed)?, ymd(due)?)?;
    }

    info!(
        books = ledger.books().len(),
        users = users.len(),
        loans = ledger.loans().len(),
        "Demo library seeded"
    );
    Ok((ledger, InMemoryUserDirectory::new(users)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use lending_ledger_core::{build_report, ReportFilter, StatusFilter};

    #[test]
    fn demo_library_is_consistent() {
        let (ledger, directory) = demo_library(LendingPolicy::default()).unwrap();
        assert_eq!(ledger.books().len(), 10);
        assert_eq!(directory.users().len(), 4);
        assert!(ledger.books().iter().all(|b| b.available <= b.quantity));
        let on_loan: u32 = ledger.books().iter().map(|b| b.on_loan()).sum();
        assert_eq!(on_loan as usize, ledger.loans().len());

        let as_of = Utc.with_ymd_and_hms(2025, 11, 15, 0, 0, 0).unwrap();
        let overdue = build_report(
            &ledger,
            &directory,
            ReportFilter {
                status: StatusFilter::Overdue,
                ..Default::default()
            },
            as_of,
        );
        assert_eq!(overdue.rows.len(), 1);
        assert_eq!(overdue.summary.total_fines, 1.5);
    }
}
