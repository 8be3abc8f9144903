//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::InMemoryUserDirectory;
use crate::config::Config;
use lending_ledger_core::{
    ports::{CatalogSearchService, Clock},
    CategoryShelf, Ledger, ReadingTracker, ReviewBook,
};
use std::sync::Arc;
use tokio::sync::RwLock;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// The ledger sits behind a single write lock, so catalog edits, loans and
/// returns are applied one at a time.
pub struct AppState {
    pub config: Arc<Config>,
    pub ledger: RwLock<Ledger>,
    pub reading: RwLock<ReadingTracker>,
    pub reviews: RwLock<ReviewBook>,
    pub categories: RwLock<CategoryShelf>,
    pub directory: Arc<InMemoryUserDirectory>,
    pub clock: Arc<dyn Clock>,
    pub catalog: Arc<dyn CatalogSearchService>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        ledger: Ledger,
        directory: InMemoryUserDirectory,
        clock: Arc<dyn Clock>,
        catalog: Arc<dyn CatalogSearchService>,
    ) -> Self {
        Self {
            config,
            ledger: RwLock::new(ledger),
            reading: RwLock::new(ReadingTracker::new()),
            reviews: RwLock::new(ReviewBook::new()),
            categories: RwLock::new(CategoryShelf::new()),
            directory: Arc::new(directory),
            clock,
            catalog,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::adapters::StaticCatalogAdapter;
    use chrono::{TimeZone, Utc};
    use lending_ledger_core::{FixedClock, User, UserStatus};
    use uuid::Uuid;

    pub struct Fixture {
        pub state: Arc<AppState>,
        pub active_user: User,
        pub banned_user: User,
    }

    /// State with two members, an empty ledger, and a clock frozen at
    /// 2025-11-15T00:00:00Z.
    pub fn fixture() -> Fixture {
        let config = Config::from_lookup(|_| None).expect("default config");
        let active_user = User {
            id: Uuid::new_v4(),
            name: "John Doe".into(),
            email: "john@library.com".into(),
            status: UserStatus::Active,
        };
        let banned_user = User {
            id: Uuid::new_v4(),
            name: "Emma Wilson".into(),
            email: "emma@library.com".into(),
            status: UserStatus::Banned,
        };
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 11, 15, 0, 0, 0).unwrap());
        let state = AppState::new(
            Arc::new(config.clone()),
            Ledger::new(config.policy),
            InMemoryUserDirectory::new(vec![active_user.clone(), banned_user.clone()]),
            Arc::new(clock),
            Arc::new(StaticCatalogAdapter::with_defaults()),
        );
        Fixture {
            state: Arc::new(state),
            active_user,
            banned_user,
        }
    }
}
