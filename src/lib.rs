//! SQLite data access layer for a football players and clubs database.
//!
//! # Intention
//!
//! - Provide a small, typed CRUD API over one SQLite file.
//! - Keep SQLite-specific logic, types, and error handling in one place.
//!
//! # Architectural Boundaries
//!
//! - Only SQLite/database code belongs here.
//! - One connection, used serially; each call commits on its own.

pub mod config;
pub mod error;
pub mod migrations;
pub mod model;
pub mod schema;
pub mod sqlite;
pub mod value;

pub use config::{ErrorPolicy, LoggingConfig, SqliteConfig};
pub use error::{Result, SqliteError};
pub use migrations::{bootstrap, current_version, BootstrapOutcome, SCHEMA_VERSION};
pub use model::{Club, NewClub, NewPlayer, Player};
pub use schema::{Schema, CLUBS, PLAYERS};
pub use sqlite::SqliteStore;
pub use value::{Params, Row, Value};
