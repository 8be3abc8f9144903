pub mod catalog;
pub mod clock;
pub mod directory;

pub use catalog::StaticCatalogAdapter;
pub use clock::SystemClock;
pub use directory::InMemoryUserDirectory;
