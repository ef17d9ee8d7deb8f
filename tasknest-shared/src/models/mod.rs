/// Database models for TaskNest
///
/// This module contains the database models and their SQL operations.
///
/// # Models
///
/// - `user`: Registered identities
/// - `category`: User-owned task categories
/// - `task`: User-owned tasks
///
/// Operations on owned models (`task`, `category`) take an
/// [`OwnerScope`](crate::auth::authorization::OwnerScope) and never touch rows
/// outside it.

pub mod category;
pub mod task;
pub mod user;
