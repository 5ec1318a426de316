//! # TrainTrack Shared Library
//!
//! This crate contains the types, stores, and business logic used by the
//! TrainTrack API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `store`: Storage traits with PostgreSQL and in-memory implementations
//! - `auth`: Password hashing, sessions, the auth service and role checks
//! - `compliance`: Training compliance statistics
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod compliance;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the TrainTrack shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
