//! Versioned schema creation and seeding.
//!
//! The version marker lives in `PRAGMA user_version`, so the state of a
//! database is read from the database itself and not from whether its file
//! existed before the process started.

use crate::error::Result;
use crate::model::{NewClub, NewPlayer};
use crate::schema::PLAYERS;
use crate::sqlite::SqliteStore;
use tracing::info;

/// Schema version written once tables exist and seed data is in place.
pub const SCHEMA_VERSION: i64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Tables were created and seeded; holds the generated ids per seed pair.
    Created { seeded: Vec<(i64, i64)> },
    AlreadyInitialized { version: i64 },
}

/// Seed players, each with the one club row inserted alongside them.
pub fn seed_data() -> Vec<(NewPlayer, (&'static str, &'static str, &'static str))> {
    vec![
        (
            NewPlayer::new("Lewandowski", Some("Striker"), 35),
            ("FC Barcelona", "Spain", "Barcelona"),
        ),
        (
            NewPlayer::new("Palmer", Some("Forward"), 22),
            ("FC Chelsea London", "England", "London"),
        ),
    ]
}

pub fn current_version(store: &SqliteStore) -> Result<i64> {
    Ok(store
        .connection()
        .pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Create tables and seed data unless the database is already at
/// [`SCHEMA_VERSION`]. Safe to call on every start.
///
/// A database whose `players` table predates the version marker is only
/// stamped with the current version, never seeded again. Table creation,
/// seeding and the version write commit together or not at all.
pub fn bootstrap(store: &SqliteStore) -> Result<BootstrapOutcome> {
    let version = current_version(store)?;
    if version >= SCHEMA_VERSION {
        info!(version, "Database already exists, skipping table creation and data insertion");
        return Ok(BootstrapOutcome::AlreadyInitialized { version });
    }

    let tx = store.connection().unchecked_transaction()?;

    if table_exists(store, PLAYERS)? {
        tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        tx.commit()?;
        info!(
            version = SCHEMA_VERSION,
            "Database already exists without a version marker, skipping data insertion"
        );
        return Ok(BootstrapOutcome::AlreadyInitialized {
            version: SCHEMA_VERSION,
        });
    }

    for table in &store.schema().tables {
        store.execute_statement(&table.create_sql())?;
    }

    let mut seeded = Vec::new();
    for (player, (name, country, city)) in seed_data() {
        let player_id = store.insert_player(&player)?;
        let club_id = store.insert_club(&NewClub::new(player_id, name, country, city))?;
        info!(player_id, club_id, "seeded");
        seeded.push((player_id, club_id));
    }

    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;
    info!(version = SCHEMA_VERSION, "schema created");
    Ok(BootstrapOutcome::Created { seeded })
}

fn table_exists(store: &SqliteStore, name: &str) -> Result<bool> {
    Ok(store.connection().query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [name],
        |row| row.get(0),
    )?)
}
