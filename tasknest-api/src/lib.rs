//! # TaskNest API Server Library
//!
//! HTTP layer for TaskNest: authenticated, owner-scoped task and category
//! management.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
