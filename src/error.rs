use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the football data access layer.
#[derive(Error, Debug)]
pub enum SqliteError {
    /// The database file could not be opened or created.
    #[error("failed to open database at {path:?}: {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A raw SQL statement passed to `execute_statement` failed.
    #[error("statement failed: {0}")]
    Statement(#[source] rusqlite::Error),

    /// Any other failure reported by the engine (constraints, missing rows, ...).
    #[error("database operation failed: {0}")]
    Operational(#[from] rusqlite::Error),

    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("unknown column {column} in table {table}")]
    UnknownColumn { table: String, column: String },

    /// A filter was required but no column/value pairs were given.
    #[error("filter on table {0} has no conditions")]
    EmptyFilter(String),

    /// An insert was requested without any column value.
    #[error("insert into table {0} has no values")]
    EmptyInsert(String),

    /// An update was requested without any column to change.
    #[error("update on table {0} has no changes")]
    EmptyChanges(String),

    /// A row did not have the shape expected by a typed model.
    #[error("cannot decode {entity} from row: {reason}")]
    Decode { entity: &'static str, reason: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SqliteError>;
