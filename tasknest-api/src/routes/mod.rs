/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, and current identity
/// - `tasks`: Owned task CRUD
/// - `categories`: Owned category CRUD

pub mod auth;
pub mod categories;
pub mod health;
pub mod tasks;
