pub mod books;
pub mod catalog;
pub mod categories;
pub mod loans;
pub mod protocol;
pub mod reading;
pub mod reports;
pub mod reviews;
pub mod rest;
pub mod state;
pub mod users;

// Re-export the router builder and the OpenAPI document for the binaries.
pub use rest::{router, ApiDoc};
