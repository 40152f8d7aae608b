//! CloudNav database layer.
//!
//! Provides the SQLite connection and schema migrations backing the local
//! key-value cache.
//!
//! # Usage
//!
//! ```no_run
//! use cloudnav::database::Database;
//!
//! // Open a persistent database
//! let db = Database::open("cloudnav.db").expect("failed to open database");
//!
//! // Or use an in-memory database for testing
//! let db = Database::open_in_memory().expect("failed to open in-memory database");
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
