//! crates/lending_ledger_core/src/report.rs
//!
//! Turns the loan collection into filtered, sorted and aggregated transaction
//! reports, and serializes them as a quoted CSV table or a standalone HTML
//! document. Both exports render the exact same row set.

use chrono::{DateTime, NaiveDate, Utc};
use std::str::FromStr;
use tracing::debug;

use crate::domain::{LoanStatus, LoanView};
use crate::ledger::Ledger;
use crate::ports::UserDirectory;

/// Column names of the tabular export, in order.
pub const CSV_HEADERS: [&str; 12] = [
    "Transaction ID",
    "Borrow Date",
    "User Name",
    "User Email",
    "Book Title",
    "Author",
    "ISBN",
    "Genre",
    "Due Date",
    "Return Date",
    "Status",
    "Fine",
];

const UNKNOWN: &str = "Unknown";
const NOT_RETURNED: &str = "Not Returned";

//=========================================================================================
// Filters
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Overdue,
    Returned,
}

impl StatusFilter {
    pub fn matches(&self, status: LoanStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == LoanStatus::Active,
            StatusFilter::Overdue => status == LoanStatus::Overdue,
            StatusFilter::Returned => status == LoanStatus::Returned,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All Transactions",
            StatusFilter::Active => "Active",
            StatusFilter::Overdue => "Overdue",
            StatusFilter::Returned => "Returned",
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "overdue" => Ok(StatusFilter::Overdue),
            "returned" => Ok(StatusFilter::Returned),
            other => Err(format!("unknown status filter '{other}'")),
        }
    }
}

/// Independent predicates, all ANDed. Date bounds are inclusive and compare
/// calendar days in UTC.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    pub status: StatusFilter,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Case-insensitive substring of the book title or the user name.
    pub search: Option<String>,
}

impl ReportFilter {
    pub fn matches(&self, view: &LoanView) -> bool {
        if !self.status.matches(view.status) {
            return false;
        }
        if self.date_from.is_some_and(|from| view.loan.borrow_date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| view.loan.borrow_date > to) {
            return false;
        }
        match self.search_term() {
            None => true,
            Some(needle) => {
                let in_title = view
                    .book
                    .as_ref()
                    .is_some_and(|b| b.title.to_lowercase().contains(&needle));
                let in_name = view
                    .user
                    .as_ref()
                    .is_some_and(|u| u.name.to_lowercase().contains(&needle));
                in_title || in_name
            }
        }
    }

    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Human-readable summary of the applied filters.
    pub fn describe(&self) -> String {
        let mut parts = vec![format!("Report Type: {}", self.status.label())];
        if let Some(from) = self.date_from {
            parts.push(format!("Date From: {from}"));
        }
        if let Some(to) = self.date_to {
            parts.push(format!("Date To: {to}"));
        }
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            parts.push(format!("Search: \"{term}\""));
        }
        parts.join("; ")
    }
}

//=========================================================================================
// Report
//=========================================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSummary {
    pub total: usize,
    pub active: usize,
    pub overdue: usize,
    pub returned: usize,
    pub total_fines: f64,
}

impl ReportSummary {
    pub fn from_rows(rows: &[LoanView]) -> Self {
        rows.iter().fold(Self::default(), |mut acc, row| {
            acc.total += 1;
            match row.status {
                LoanStatus::Active => acc.active += 1,
                LoanStatus::Overdue => acc.overdue += 1,
                LoanStatus::Returned => acc.returned += 1,
            }
            acc.total_fines += row.fine;
            acc
        })
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub filter: ReportFilter,
    pub rows: Vec<LoanView>,
    pub summary: ReportSummary,
}

/// Runs the join, filter, sort and aggregate steps against the ledger as of
/// `as_of`.
pub fn build_report<D>(
    ledger: &Ledger,
    directory: &D,
    filter: ReportFilter,
    as_of: DateTime<Utc>,
) -> Report
where
    D: UserDirectory + ?Sized,
{
    Report::from_views(ledger.loan_views(as_of, directory), filter, as_of)
}

impl Report {
    /// Filters and sorts already-joined views. Sorting is stable, so loans
    /// borrowed on the same day keep their insertion order.
    pub fn from_views(
        views: Vec<LoanView>,
        filter: ReportFilter,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut rows: Vec<LoanView> = views.into_iter().filter(|v| filter.matches(v)).collect();
        rows.sort_by(|a, b| b.loan.borrow_date.cmp(&a.loan.borrow_date));
        let summary = ReportSummary::from_rows(&rows);
        debug!(rows = rows.len(), filter = %filter.describe(), "Report built");
        Self {
            generated_at,
            filter,
            rows,
            summary,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn suggested_filename(&self, format: ExportFormat) -> String {
        format!(
            "library-report-{}.{}",
            self.generated_at.format("%Y-%m-%d"),
            format.extension()
        )
    }

    pub fn export(&self, format: ExportFormat) -> ExportPayload {
        let body = match format {
            ExportFormat::Csv => self.to_csv(),
            ExportFormat::Html => self.to_html(),
        };
        ExportPayload {
            filename: self.suggested_filename(format),
            content_type: format.content_type(),
            body,
        }
    }

    /// One header line, then one line per row with every cell double-quoted.
    pub fn to_csv(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(CSV_HEADERS.join(","));
        for row in &self.rows {
            let cells = row_cells(row, NOT_RETURNED);
            let quoted: Vec<String> = cells.iter().map(|c| quote_csv(c)).collect();
            lines.push(quoted.join(","));
        }
        lines.join("\n")
    }

    pub fn to_html(&self) -> String {
        let generated = self.generated_at.format("%B %-d, %Y %H:%M UTC").to_string();
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"UTF-8\">\n");
        html.push_str("<title>Library Transaction History Report</title>\n");
        html.push_str(REPORT_STYLE);
        html.push_str("</head>\n<body>\n");
        html.push_str("<div class=\"header\"><h1>Library Transaction History Report</h1></div>\n");

        html.push_str("<div class=\"meta-info\">\n");
        html.push_str(&format!("<p><strong>Report Generated:</strong> {}</p>\n", escape_html(&generated)));
        html.push_str(&format!(
            "<p><strong>Filters:</strong> {}</p>\n",
            escape_html(&self.filter.describe())
        ));
        html.push_str("</div>\n");

        let s = &self.summary;
        html.push_str("<div class=\"summary\">\n");
        html.push_str(&format!("<div class=\"card\"><h3>Total Transactions</h3><div class=\"value\">{}</div></div>\n", s.total));
        html.push_str(&format!("<div class=\"card\"><h3>Active Loans</h3><div class=\"value\">{}</div></div>\n", s.active));
        html.push_str(&format!("<div class=\"card\"><h3>Overdue Books</h3><div class=\"value\">{}</div></div>\n", s.overdue));
        html.push_str(&format!("<div class=\"card\"><h3>Total Fines</h3><div class=\"value\">${:.2}</div></div>\n", s.total_fines));
        html.push_str("</div>\n");

        html.push_str("<h2>Transaction Details</h2>\n");
        if self.rows.is_empty() {
            html.push_str(
                "<div class=\"no-data\"><p>No transactions found matching the selected criteria.</p></div>\n",
            );
        } else {
            html.push_str("<table>\n<thead><tr>");
            for header in CSV_HEADERS {
                html.push_str(&format!("<th>{header}</th>"));
            }
            html.push_str("</tr></thead>\n<tbody>\n");
            for row in &self.rows {
                html.push_str("<tr>");
                let mut cells = row_cells(row, "-");
                // Fine column reads as currency in the document.
                cells[11] = if row.fine > 0.0 {
                    format!("${:.2}", row.fine)
                } else {
                    "-".to_string()
                };
                for (i, cell) in cells.iter().enumerate() {
                    if i == 10 {
                        html.push_str(&format!(
                            "<td><span class=\"status {0}\">{0}</span></td>",
                            escape_html(cell)
                        ));
                    } else {
                        html.push_str(&format!("<td>{}</td>", escape_html(cell)));
                    }
                }
                html.push_str("</tr>\n");
            }
            html.push_str("</tbody>\n</table>\n");
        }

        html.push_str(&format!(
            "<div class=\"footer\"><p>Library Management System - Transaction History Report</p><p>Generated on {}</p></div>\n",
            escape_html(&generated)
        ));
        html.push_str("</body>\n</html>\n");
        html
    }
}

//=========================================================================================
// Export formats
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    Csv,
    #[default]
    Html,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Html => "text/html; charset=utf-8",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "html" => Ok(ExportFormat::Html),
            other => Err(format!("unknown export format '{other}'")),
        }
    }
}

/// A serialized report plus the metadata a caller needs to offer it as a download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPayload {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn row_cells(row: &LoanView, missing_return: &str) -> [String; 12] {
    let book = row.book.as_ref();
    let user = row.user.as_ref();
    let or_unknown = |value: Option<&String>| value.cloned().unwrap_or_else(|| UNKNOWN.to_string());
    [
        row.loan.id.to_string(),
        row.loan.borrow_date.to_string(),
        or_unknown(user.map(|u| &u.name)),
        or_unknown(user.map(|u| &u.email)),
        or_unknown(book.map(|b| &b.title)),
        or_unknown(book.map(|b| &b.author)),
        or_unknown(book.map(|b| &b.isbn)),
        or_unknown(book.map(|b| &b.genre)),
        row.loan.due_date.to_string(),
        row.loan
            .return_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| missing_return.to_string()),
        row.status.to_string(),
        format!("{:.2}", row.fine),
    ]
}

fn quote_csv(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const REPORT_STYLE: &str = "<style>
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; color: #333; padding: 40px; max-width: 1200px; margin: 0 auto; }
.header { border-bottom: 4px solid #4F46E5; margin-bottom: 30px; }
.header h1 { color: #4F46E5; }
.meta-info { background: #F9FAFB; padding: 20px; border-radius: 8px; margin-bottom: 30px; }
.summary { display: grid; grid-template-columns: repeat(4, 1fr); gap: 20px; margin-bottom: 40px; }
.card { padding: 20px; border-radius: 12px; background: #EEF2FF; }
.card .value { font-size: 32px; font-weight: 700; }
table { width: 100%; border-collapse: collapse; }
th, td { padding: 12px 16px; text-align: left; border-top: 1px solid #E5E7EB; }
.status.active { color: #1E40AF; }
.status.overdue { color: #991B1B; }
.status.returned { color: #065F46; }
.no-data { text-align: center; padding: 60px 20px; color: #6B7280; }
.footer { margin-top: 60px; text-align: center; color: #6B7280; font-size: 12px; }
@media print { tr { page-break-inside: avoid; } }
</style>
";
