//! # TaskNest Shared Library
//!
//! Authentication, ownership enforcement, models, and storage used by the
//! TaskNest API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, session tokens, the authentication gate,
//!   ownership scoping, and the auth service
//! - `models`: Database models and their SQL
//! - `store`: Storage traits with Postgres and in-memory backends
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the TaskNest shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
