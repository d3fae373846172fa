//! # duskhub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement [`ReadingRepository`](duskhub_app::ports::ReadingRepository)
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `duskhub-app` (for port traits) and `duskhub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod pool;
mod reading_repo;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use reading_repo::SqliteReadingRepository;
