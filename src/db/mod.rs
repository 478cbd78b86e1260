//! Local SQLite backend for settled positions.
//!
//! This module provides:
//! - Database initialization and migrations
//! - SQLite pragma configuration
//! - A repository that serves the DataSource queries
//! - CSV seeding for operators running without a hosted backend

pub mod migrations;
pub mod repo;
pub mod seed;

pub use migrations::init_db;
pub use repo::Repository;
pub use seed::{load_csv_file, parse_positions_csv, SeedError};
