//! crates/lending_ledger_core/src/analytics.rs
//!
//! Per-user reading progress and the statistics derived from it: counts,
//! average progress, completions this month, the completion streak and the
//! achievements unlocked by those numbers. Nothing here is cached; every
//! figure is recomputed from the records on each call.

use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::domain::{ReadingProgressRecord, ReadingStatus};

/// A change to one user's progress on one book. `None` keeps the stored value.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub book_id: Uuid,
    pub status: ReadingStatus,
    pub progress: Option<u8>,
    pub current_page: Option<u32>,
    pub total_pages: Option<u32>,
    pub notes: Option<String>,
}

impl ProgressUpdate {
    pub fn status(book_id: Uuid, status: ReadingStatus) -> Self {
        Self {
            book_id,
            status,
            progress: None,
            current_page: None,
            total_pages: None,
            notes: None,
        }
    }
}

/// Owns every user's reading records. One record per (user, book) pair, kept
/// in the order it was first created and never removed.
#[derive(Debug, Default)]
pub struct ReadingTracker {
    records: HashMap<Uuid, Vec<ReadingProgressRecord>>,
}

impl ReadingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records_for(&self, user_id: Uuid) -> &[ReadingProgressRecord] {
        self.records.get(&user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn record(&self, user_id: Uuid, book_id: Uuid) -> Option<&ReadingProgressRecord> {
        self.records_for(user_id).iter().find(|r| r.book_id == book_id)
    }

    /// Creates or updates the record for `(user_id, update.book_id)`.
    pub fn record_progress(
        &mut self,
        user_id: Uuid,
        update: ProgressUpdate,
        today: NaiveDate,
    ) -> &ReadingProgressRecord {
        let records = self.records.entry(user_id).or_default();
        let index = match records.iter().position(|r| r.book_id == update.book_id) {
            Some(index) => index,
            None => {
                records.push(ReadingProgressRecord {
                    book_id: update.book_id,
                    status: ReadingStatus::NotStarted,
                    progress: 0,
                    current_page: 0,
                    total_pages: 0,
                    start_date: None,
                    finish_date: None,
                    notes: String::new(),
                });
                records.len() - 1
            }
        };

        let record = &mut records[index];
        apply_update(record, update, today);
        info!(
            user_id = %user_id,
            book_id = %record.book_id,
            status = record.status.as_str(),
            progress = record.progress,
            "Reading progress recorded"
        );
        record
    }

    pub fn stats_for(&self, user_id: Uuid, today: NaiveDate) -> ReadingStats {
        ReadingStats::compute(self.records_for(user_id), today)
    }
}

fn apply_update(record: &mut ReadingProgressRecord, update: ProgressUpdate, today: NaiveDate) {
    let pages_given = update.current_page.is_some() || update.total_pages.is_some();
    if let Some(page) = update.current_page {
        record.current_page = page;
    }
    if let Some(total) = update.total_pages {
        record.total_pages = total;
    }
    if let Some(notes) = update.notes {
        record.notes = notes;
    }

    record.progress = match update.status {
        ReadingStatus::Completed => 100,
        ReadingStatus::NotStarted => 0,
        _ => match update.progress {
            Some(progress) => progress.min(100),
            None if pages_given && record.total_pages > 0 => {
                page_progress(record.current_page, record.total_pages)
            }
            None => record.progress,
        },
    };

    if record.start_date.is_none() && update.status != ReadingStatus::NotStarted {
        record.start_date = Some(today);
    }
    record.finish_date = match update.status {
        ReadingStatus::Completed => record.finish_date.or(Some(today)),
        _ => None,
    };
    record.status = update.status;
}

/// Percentage of `total` pages reached at `current`, capped at 100.
pub fn page_progress(current: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (f64::from(current) / f64::from(total) * 100.0).round();
    percent.min(100.0) as u8
}

//=========================================================================================
// Streak
//=========================================================================================

/// Counts back from the most recent completion while consecutive completions
/// are at most one day apart. The first larger gap ends the scan.
pub fn completion_streak<I>(finish_dates: I) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut dates: Vec<NaiveDate> = finish_dates.into_iter().collect();
    if dates.is_empty() {
        return 0;
    }
    dates.sort_unstable_by(|a, b| b.cmp(a));

    let mut streak = 1;
    for pair in dates.windows(2) {
        let gap = (pair[0] - pair[1]).num_days();
        if gap <= 1 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

pub fn reading_streak(records: &[ReadingProgressRecord]) -> u32 {
    completion_streak(records.iter().filter_map(|r| r.finish_date))
}

//=========================================================================================
// Statistics & Achievements
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Achievement {
    FirstBook,
    FiveBooks,
    TenBooks,
    WeekStreak,
    Multitasker,
    Dedicated,
}

impl Achievement {
    pub const ALL: [Achievement; 6] = [
        Achievement::FirstBook,
        Achievement::FiveBooks,
        Achievement::TenBooks,
        Achievement::WeekStreak,
        Achievement::Multitasker,
        Achievement::Dedicated,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Achievement::FirstBook => "First Book",
            Achievement::FiveBooks => "5 Books",
            Achievement::TenBooks => "10 Books!",
            Achievement::WeekStreak => "Week Streak",
            Achievement::Multitasker => "Multitasker",
            Achievement::Dedicated => "Dedicated",
        }
    }

    pub fn is_earned(&self, stats: &ReadingStats) -> bool {
        match self {
            Achievement::FirstBook => stats.completed >= 1,
            Achievement::FiveBooks => stats.completed >= 5,
            Achievement::TenBooks => stats.completed >= 10,
            Achievement::WeekStreak => stats.streak >= 7,
            Achievement::Multitasker => stats.reading >= 3,
            Achievement::Dedicated => stats.average_progress >= 50,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingStats {
    pub total: usize,
    pub completed: usize,
    pub reading: usize,
    pub on_hold: usize,
    /// Mean progress rounded to a whole percent; 0 with no records.
    pub average_progress: u8,
    pub finished_this_month: usize,
    pub streak: u32,
}

impl ReadingStats {
    pub fn compute(records: &[ReadingProgressRecord], today: NaiveDate) -> Self {
        let count = |status| records.iter().filter(|r| r.status == status).count();
        let average_progress = if records.is_empty() {
            0
        } else {
            let sum: u32 = records.iter().map(|r| u32::from(r.progress)).sum();
            (f64::from(sum) / records.len() as f64).round() as u8
        };
        let finished_this_month = records
            .iter()
            .filter_map(|r| r.finish_date)
            .filter(|d| d.year() == today.year() && d.month() == today.month())
            .count();

        Self {
            total: records.len(),
            completed: count(ReadingStatus::Completed),
            reading: count(ReadingStatus::Reading),
            on_hold: count(ReadingStatus::OnHold),
            average_progress,
            finished_this_month,
            streak: reading_streak(records),
        }
    }

    /// Fraction of tracked books in `count`, or 0 when nothing is tracked.
    pub fn share(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64
        }
    }

    pub fn completed_share(&self) -> f64 {
        self.share(self.completed)
    }

    pub fn reading_share(&self) -> f64 {
        self.share(self.reading)
    }

    pub fn on_hold_share(&self) -> f64 {
        self.share(self.on_hold)
    }

    pub fn achievements(&self) -> Vec<Achievement> {
        Achievement::ALL
            .into_iter()
            .filter(|a| a.is_earned(self))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn completed_on(finish: NaiveDate) -> ReadingProgressRecord {
        ReadingProgressRecord {
            book_id: Uuid::new_v4(),
            status: ReadingStatus::Completed,
            progress: 100,
            current_page: 300,
            total_pages: 300,
            start_date: Some(finish),
            finish_date: Some(finish),
            notes: String::new(),
        }
    }

    #[test]
    fn streak_stops_at_first_gap() {
        let dates = [date(2025, 11, 10), date(2025, 11, 9), date(2025, 11, 6)];
        assert_eq!(completion_streak(dates), 2);
    }

    #[test]
    fn streak_sorts_input_and_counts_same_day() {
        let dates = [date(2025, 11, 8), date(2025, 11, 10), date(2025, 11, 10), date(2025, 11, 9)];
        assert_eq!(completion_streak(dates), 4);
        assert_eq!(completion_streak(Vec::new()), 0);
        assert_eq!(completion_streak([date(2025, 1, 1)]), 1);
    }

    #[test]
    fn streak_is_greedy_from_most_recent() {
        // The older run of three does not beat the recent run of one.
        let dates = [date(2025, 11, 20), date(2025, 11, 3), date(2025, 11, 2), date(2025, 11, 1)];
        assert_eq!(completion_streak(dates), 1);
    }

    #[test]
    fn empty_stats_are_zero() {
        let stats = ReadingStats::compute(&[], date(2025, 11, 15));
        assert_eq!(stats, ReadingStats::default());
        assert_eq!(stats.completed_share(), 0.0);
        assert!(stats.achievements().is_empty());
    }

    #[test]
    fn stats_count_month_and_average() {
        let today = date(2025, 11, 15);
        let mut records = vec![
            completed_on(date(2025, 11, 10)),
            completed_on(date(2025, 11, 9)),
            completed_on(date(2024, 11, 9)),
        ];
        records.push(ReadingProgressRecord {
            status: ReadingStatus::Reading,
            progress: 25,
            finish_date: None,
            ..completed_on(today)
        });

        let stats = ReadingStats::compute(&records, today);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 3);
        assert_eq!(stats.reading, 1);
        assert_eq!(stats.finished_this_month, 2);
        assert_eq!(stats.average_progress, 81);
        assert_eq!(stats.streak, 2);
        assert_eq!(stats.completed_share(), 0.75);
        assert_eq!(
            stats.achievements(),
            vec![Achievement::FirstBook, Achievement::Dedicated]
        );
    }

    #[test]
    fn completing_sets_finish_and_full_progress() {
        let mut tracker = ReadingTracker::new();
        let user = Uuid::new_v4();
        let book = Uuid::new_v4();

        let record = tracker.record_progress(
            user,
            ProgressUpdate {
                current_page: Some(150),
                total_pages: Some(300),
                ..ProgressUpdate::status(book, ReadingStatus::Reading)
            },
            date(2025, 11, 1),
        );
        assert_eq!(record.progress, 50);
        assert_eq!(record.start_date, Some(date(2025, 11, 1)));
        assert_eq!(record.finish_date, None);

        let record = tracker.record_progress(
            user,
            ProgressUpdate::status(book, ReadingStatus::Completed),
            date(2025, 11, 9),
        );
        assert_eq!(record.progress, 100);
        assert_eq!(record.start_date, Some(date(2025, 11, 1)));
        assert_eq!(record.finish_date, Some(date(2025, 11, 9)));

        // Re-opening the book clears the finish date.
        let record = tracker.record_progress(
            user,
            ProgressUpdate::status(book, ReadingStatus::OnHold),
            date(2025, 11, 10),
        );
        assert_eq!(record.finish_date, None);
        assert_eq!(record.progress, 100);
        assert_eq!(tracker.records_for(user).len(), 1);
    }

    #[test]
    fn not_started_resets_progress_without_start_date() {
        let mut tracker = ReadingTracker::new();
        let user = Uuid::new_v4();
        let book = Uuid::new_v4();
        let record = tracker.record_progress(
            user,
            ProgressUpdate {
                progress: Some(40),
                ..ProgressUpdate::status(book, ReadingStatus::NotStarted)
            },
            date(2025, 11, 1),
        );
        assert_eq!(record.progress, 0);
        assert_eq!(record.start_date, None);
        assert!(tracker.record(user, book).is_some());
        assert!(tracker.records_for(Uuid::new_v4()).is_empty());
    }

    #[test]
    fn page_progress_caps_and_guards() {
        assert_eq!(page_progress(10, 0), 0);
        assert_eq!(page_progress(400, 300), 100);
        assert_eq!(page_progress(1, 3), 33);
    }
}
