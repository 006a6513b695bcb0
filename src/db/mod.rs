//! Database module for SQLite operations.
//!
//! This module provides:
//! - Database initialization and migrations
//! - SQLite pragma configuration (foreign keys are required for cascading deletes)
//! - Repository layer for programs, exercises and accounts

pub mod error;
pub mod migrations;
pub mod repo;

pub use error::RepoError;
pub use migrations::init_db;
pub use repo::Repository;
