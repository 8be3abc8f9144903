//! services/api/src/adapters/catalog.rs
//!
//! A catalog search adapter backed by a fixed list of entries. It implements
//! the `CatalogSearchService` port so a networked catalog can replace it
//! without touching the handlers.

use async_trait::async_trait;
use chrono::NaiveDate;
use lending_ledger_core::{
    ports::{CatalogSearchService, PortError, PortResult},
    CatalogEntry,
};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct StaticCatalogAdapter {
    entries: Vec<CatalogEntry>,
}

impl StaticCatalogAdapter {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// A small built-in catalog of well-known titles.
    pub fn with_defaults() -> Self {
        let entry = |title: &str, author: &str, isbn: &str, genre: &str, published: (i32, u32, u32)| {
            CatalogEntry {
                title: title.to_string(),
                author: author.to_string(),
                isbn: isbn.to_string(),
                genre: genre.to_string(),
                published: NaiveDate::from_ymd_opt(published.0, published.1, published.2),
            }
        };
        Self::new(vec![
            entry("Dune", "Frank Herbert", "978-0-441-17271-9", "Science Fiction", (1965, 8, 1)),
            entry("Brave New World", "Aldous Huxley", "978-0-06-085052-4", "Science Fiction", (1932, 1, 1)),
            entry("Jane Eyre", "Charlotte Brontë", "978-0-14-144114-6", "Romance", (1847, 10, 16)),
            entry("The Name of the Wind", "Patrick Rothfuss", "978-0-7564-0407-9", "Fantasy", (2007, 3, 27)),
            entry("Educated", "Tara Westover", "978-0-399-59050-4", "Non-Fiction", (2018, 2, 20)),
            entry("Thinking, Fast and Slow", "Daniel Kahneman", "978-0-374-53355-7", "Non-Fiction", (2011, 10, 25)),
        ])
    }
}

#[async_trait]
impl CatalogSearchService for StaticCatalogAdapter {
    async fn search(&self, query: &str) -> PortResult<Vec<CatalogEntry>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(PortError::Unexpected("search query must not be empty".to_string()));
        }
        let hits: Vec<CatalogEntry> = self
            .entries
            .iter()
            .filter(|e| {
                e.title.to_lowercase().contains(&needle)
                    || e.author.to_lowercase().contains(&needle)
                    || e.isbn.replace('-', "").contains(&needle.replace('-', ""))
            })
            .cloned()
            .collect();
        debug!(query = %query, hits = hits.len(), "Catalog search");
        Ok(hits)
    }
}
