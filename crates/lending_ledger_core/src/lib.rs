pub mod analytics;
pub mod domain;
pub mod ledger;
pub mod ports;
pub mod report;
pub mod shelf;

pub use analytics::{Achievement, ProgressUpdate, ReadingStats, ReadingTracker};
pub use domain::{
    Book, BookUpdate, CatalogEntry, Category, Loan, LoanStatus, LoanView, NewBook,
    ReadingProgressRecord, ReadingStatus, Review, User, UserStatus,
};
pub use ledger::{calculate_fine, derive_status, LedgerError, LedgerResult, Ledger, LendingPolicy};
pub use ports::{CatalogSearchService, Clock, FixedClock, PortError, PortResult, UserDirectory};
pub use report::{build_report, ExportFormat, ExportPayload, Report, ReportFilter, ReportSummary, StatusFilter};
pub use shelf::{rating_label, CategoryShelf, ReviewBook, PRESET_COLORS};
