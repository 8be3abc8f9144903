//! crates/lending_ledger_core/src/ports.rs
//!
//! Defines the contracts (traits) for the collaborators the ledger depends on.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to stay independent of wall clocks, identity providers and catalog services.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{CatalogEntry, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Time
//=========================================================================================

/// Source of "now". Core logic never reads the system clock itself; callers
/// resolve the instant through this port and pass it in.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> chrono::NaiveDate {
        self.now().date_naive()
    }
}

/// A clock frozen at one instant. Used by tests and by callers that want a
/// report generated "as of" a specific time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

//=========================================================================================
// Identity
//=========================================================================================

/// Read-only lookup of library members by id.
pub trait UserDirectory {
    fn find_user(&self, user_id: Uuid) -> Option<User>;
}

impl UserDirectory for [User] {
    fn find_user(&self, user_id: Uuid) -> Option<User> {
        self.iter().find(|u| u.id == user_id).cloned()
    }
}

impl UserDirectory for Vec<User> {
    fn find_user(&self, user_id: Uuid) -> Option<User> {
        self.as_slice().find_user(user_id)
    }
}

//=========================================================================================
// Catalog
//=========================================================================================

#[async_trait]
pub trait CatalogSearchService: Send + Sync {
    /// Looks up books by ISBN, title or author in an external catalog.
    async fn search(&self, query: &str) -> PortResult<Vec<CatalogEntry>>;
}
