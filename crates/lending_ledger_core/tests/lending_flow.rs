//! End-to-end checks of the ledger, report and analytics APIs working together.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use lending_ledger_core::{
    analytics::completion_streak, build_report, BookUpdate, Clock, ExportFormat, FixedClock,
    Ledger, LedgerError, LendingPolicy, LoanStatus, NewBook, ProgressUpdate, ReadingStatus,
    ReadingTracker, ReportFilter, StatusFilter, User, UserStatus,
};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn midnight(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn book(title: &str, quantity: u32) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: "Author".to_string(),
        isbn: "978-0-00-000000-0".to_string(),
        genre: "Fiction".to_string(),
        quantity,
        available: None,
    }
}

fn member(name: &str) -> User {
    User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@library.com", name.to_lowercase().replace(' ', ".")),
        status: UserStatus::Active,
    }
}

fn assert_invariant(ledger: &Ledger) {
    for b in ledger.books() {
        assert!(b.available <= b.quantity, "{} has {} of {}", b.title, b.available, b.quantity);
        assert!(b.quantity >= 1);
    }
}

#[test]
fn availability_invariant_survives_mixed_operations() {
    let mut ledger = Ledger::default();
    let a = ledger.add_book(book("A", 2)).unwrap();
    let b = ledger.add_book(book("B", 1)).unwrap();
    let user = Uuid::new_v4();
    let mut loans = Vec::new();
    let (mut edited, mut rejected) = (0, 0);

    for day in 1..=6 {
        for id in [a, b] {
            match ledger.create_loan(id, user, date(2025, 11, day), date(2025, 11, day + 14)) {
                Ok(loan) => loans.push(loan),
                Err(err) => assert_eq!(err, LedgerError::OutOfStock(id)),
            }
            assert_invariant(&ledger);
        }
        if let Some(loan) = loans.pop() {
            ledger.return_loan(loan, date(2025, 11, day + 1)).unwrap();
            assert_eq!(
                ledger.return_loan(loan, date(2025, 11, day + 2)),
                Err(LedgerError::AlreadyReturned(loan))
            );
        }
        let quantity = 1 + day % 3;
        match ledger.update_book(a, BookUpdate { quantity: Some(quantity), ..Default::default() }) {
            Ok(book) => {
                assert_eq!(book.quantity, quantity);
                edited += 1;
            }
            Err(err) => {
                assert!(matches!(err, LedgerError::InvalidQuantity(_)), "unexpected {err:?}");
                rejected += 1;
            }
        }
        assert_invariant(&ledger);
    }
    assert!(edited > 0 && rejected > 0);
}

#[test]
fn out_of_stock_single_copy() {
    let mut ledger = Ledger::default();
    let id = ledger
        .add_book(NewBook { available: Some(0), ..book("Harry Potter", 1) })
        .unwrap();
    let before = ledger.book(id).cloned();

    let result = ledger.create_loan(id, Uuid::new_v4(), date(2025, 11, 1), date(2025, 11, 29));

    assert_eq!(result, Err(LedgerError::OutOfStock(id)));
    assert_eq!(ledger.book(id).cloned(), before);
    assert!(ledger.loans().is_empty());
}

#[test]
fn report_over_live_ledger() {
    let clock = FixedClock(midnight(2025, 11, 15));
    let mut ledger = Ledger::new(LendingPolicy::default());
    let john = member("John Doe");
    let sarah = member("Sarah Smith");
    let users = vec![john.clone(), sarah.clone()];

    let mockingbird = ledger.add_book(book("To Kill a Mockingbird", 5)).unwrap();
    let potter = ledger.add_book(book("Harry Potter", 8)).unwrap();
    let gatsby = ledger.add_book(book("The Great Gatsby", 3)).unwrap();

    ledger
        .create_loan(mockingbird, john.id, date(2025, 11, 1), date(2025, 11, 29))
        .unwrap();
    let overdue = ledger
        .create_loan(potter, john.id, date(2025, 10, 15), date(2025, 11, 12))
        .unwrap();
    let returned = ledger
        .create_loan(gatsby, sarah.id, date(2025, 11, 10), date(2025, 12, 8))
        .unwrap();
    ledger.return_loan(returned, date(2025, 11, 12)).unwrap();
    ledger.delete_book(potter).unwrap();

    let report = build_report(&ledger, &users, ReportFilter::default(), clock.now());
    let order: Vec<_> = report.rows.iter().map(|r| r.loan.borrow_date).collect();
    assert_eq!(order, [date(2025, 11, 10), date(2025, 11, 1), date(2025, 10, 15)]);
    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.overdue, 1);
    assert_eq!(report.summary.total_fines, 1.5);

    let overdue_row = report.rows.iter().find(|r| r.loan.id == overdue).unwrap();
    assert_eq!(overdue_row.status, LoanStatus::Overdue);
    assert!(report.to_csv().contains(&format!("\"{overdue}\",\"2025-10-15\",\"John Doe\"")));
    assert!(report
        .to_csv()
        .lines()
        .any(|l| l.starts_with(&format!("\"{overdue}\"")) && l.contains("\"Unknown\"")));

    let only_returned = ReportFilter {
        status: StatusFilter::Returned,
        ..Default::default()
    };
    let report = build_report(&ledger, &users, only_returned, clock.now());
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].user.as_ref().map(|u| u.name.as_str()), Some("Sarah Smith"));

    let nothing = ReportFilter {
        date_from: Some(date(2026, 1, 1)),
        ..Default::default()
    };
    let payload = build_report(&ledger, &users, nothing, clock.now()).export(ExportFormat::Csv);
    assert_eq!(payload.filename, "library-report-2025-11-15.csv");
    assert_eq!(payload.body.lines().count(), 1);
}

#[test]
fn fines_keep_accruing_until_return() {
    let mut ledger = Ledger::default();
    let id = ledger.add_book(book("1984", 1)).unwrap();
    let loan_id = ledger
        .create_loan(id, Uuid::new_v4(), date(2025, 10, 15), date(2025, 11, 12))
        .unwrap();

    let loan = ledger.loan(loan_id).unwrap().clone();
    assert_eq!(ledger.fine_for(&loan, noon(2025, 11, 12)), 0.5);
    assert_eq!(ledger.fine_for(&loan, noon(2025, 11, 20)), 4.5);

    ledger.return_loan(loan_id, date(2025, 11, 14)).unwrap();
    let loan = ledger.loan(loan_id).unwrap().clone();
    assert_eq!(ledger.fine_for(&loan, noon(2026, 3, 1)), 1.0);
}

#[test]
fn reading_stats_for_a_member() {
    let mut tracker = ReadingTracker::new();
    let user = Uuid::new_v4();
    for finished in [date(2025, 11, 10), date(2025, 11, 9), date(2025, 11, 6)] {
        tracker.record_progress(
            user,
            ProgressUpdate::status(Uuid::new_v4(), ReadingStatus::Completed),
            finished,
        );
    }
    tracker.record_progress(
        user,
        ProgressUpdate::status(Uuid::new_v4(), ReadingStatus::Reading),
        date(2025, 11, 11),
    );

    let stats = tracker.stats_for(user, date(2025, 11, 15));
    assert_eq!(stats.streak, 2);
    assert_eq!(stats.completed, 3);
    assert_eq!(stats.finished_this_month, 3);
    assert_eq!(stats.average_progress, 75);
    assert_eq!(
        completion_streak([date(2025, 11, 10), date(2025, 11, 9), date(2025, 11, 6)]),
        2
    );
}
