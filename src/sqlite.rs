//! The SQLite-backed store for players and clubs.
//!
//! Every operation is a single statement committed by the engine on return.
//! Table and column names are checked against the store's [`Schema`] before
//! any SQL is built; values are always bound as parameters.

use crate::config::{ErrorPolicy, SqliteConfig};
use crate::error::{Result, SqliteError};
use crate::model::{NewClub, NewPlayer};
use crate::schema::{quote_ident, Schema, TableDefinition, CLUBS, PLAYERS};
use crate::value::{Params, Row, Value};
use rusqlite::{params_from_iter, Connection};
use tracing::{debug, error, info};

pub struct SqliteStore {
    conn: Connection,
    schema: Schema,
    policy: ErrorPolicy,
}

impl SqliteStore {
    /// Open (or create) the database file named by `config.db_path`.
    pub fn connect(config: &SqliteConfig, schema: Schema) -> Result<Self> {
        let conn =
            Connection::open(&config.db_path).map_err(|source| SqliteError::Connection {
                path: config.db_path.clone().into(),
                source,
            })?;
        info!(
            path = %config.db_path,
            sqlite_version = rusqlite::version(),
            "connected"
        );
        Self::with_connection(conn, config, schema)
    }

    /// Open a private in-memory database.
    pub fn connect_in_memory(config: &SqliteConfig, schema: Schema) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| SqliteError::Connection {
            path: ":memory:".into(),
            source,
        })?;
        debug!(sqlite_version = rusqlite::version(), "connected to in-memory database");
        Self::with_connection(conn, config, schema)
    }

    fn with_connection(conn: Connection, config: &SqliteConfig, schema: Schema) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", config.foreign_keys)?;
        Ok(Self {
            conn,
            schema,
            policy: config.error_policy,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ErrorPolicy) {
        self.policy = policy;
    }

    /// Underlying connection, for pragmas and ad-hoc queries.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run an arbitrary SQL batch, typically DDL.
    pub fn execute_statement(&self, sql: &str) -> Result<()> {
        let result = self
            .conn
            .execute_batch(sql)
            .map_err(SqliteError::Statement);
        self.apply_policy("execute_statement", result)
    }

    pub fn insert_player(&self, player: &NewPlayer) -> Result<i64> {
        self.insert(PLAYERS, &player.to_params())
    }

    pub fn insert_club(&self, club: &NewClub) -> Result<i64> {
        self.insert(CLUBS, &club.to_params())
    }

    /// Insert one row and return the storage-assigned id.
    pub fn insert(&self, table: &str, values: &Params) -> Result<i64> {
        let def = self.table(table)?;
        if values.is_empty() {
            return Err(SqliteError::EmptyInsert(table.to_string()));
        }
        let columns = self.column_list(def, values)?;
        let placeholders = vec!["?"; values.len()].join(", ");
        let sql = format!(
            "INSERT INTO {}({}) VALUES({})",
            quote_ident(&def.name),
            columns.join(", "),
            placeholders
        );

        self.conn.execute(&sql, params_from_iter(values.values()))?;
        let id = self.conn.last_insert_rowid();
        debug!(table, id, "inserted row");
        Ok(id)
    }

    /// Every row of `table` in storage order.
    pub fn select_all(&self, table: &str) -> Result<Vec<Row>> {
        let def = self.table(table)?;
        let sql = format!("SELECT * FROM {}", quote_ident(&def.name));
        self.query(table, &sql, &Params::new())
    }

    /// Rows of `table` where every column in `filter` equals its value.
    pub fn select_where(&self, table: &str, filter: &Params) -> Result<Vec<Row>> {
        let def = self.table(table)?;
        let clause = self.where_clause(def, filter)?;
        let sql = format!("SELECT * FROM {} WHERE {}", quote_ident(&def.name), clause);
        self.query(table, &sql, filter)
    }

    /// Set the columns in `changes` on the row with the given `id`.
    ///
    /// Returns the number of rows changed, which is 0 when no row has that id.
    pub fn update_row(&self, table: &str, id: i64, changes: &Params) -> Result<usize> {
        let result = self.try_update_row(table, id, changes);
        if result.is_ok() {
            info!(table, id, "OK");
        }
        self.apply_policy("update_row", result)
    }

    fn try_update_row(&self, table: &str, id: i64, changes: &Params) -> Result<usize> {
        let def = self.table(table)?;
        if changes.is_empty() {
            return Err(SqliteError::EmptyChanges(table.to_string()));
        }
        let assignments = self
            .column_list(def, changes)?
            .into_iter()
            .map(|column| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE \"id\" = ?",
            quote_ident(&def.name),
            assignments
        );

        let id = Value::Integer(id);
        let bindings = changes.values().chain(std::iter::once(&id));
        Ok(self.conn.execute(&sql, params_from_iter(bindings))?)
    }

    /// Delete rows matching `filter`. Matching nothing is not an error.
    pub fn delete_where(&self, table: &str, filter: &Params) -> Result<usize> {
        let result = self.table(table).and_then(|def| {
            let clause = self.where_clause(def, filter)?;
            let sql = format!("DELETE FROM {} WHERE {}", quote_ident(&def.name), clause);
            Ok(self.conn.execute(&sql, params_from_iter(filter.values()))?)
        });
        if let Ok(rows) = result {
            info!(table, rows, "Deleted");
        }
        self.apply_policy("delete_where", result)
    }

    pub fn delete_all(&self, table: &str) -> Result<usize> {
        let result = self.table(table).and_then(|def| {
            let sql = format!("DELETE FROM {}", quote_ident(&def.name));
            Ok(self.conn.execute(&sql, [])?)
        });
        if let Ok(rows) = result {
            info!(table, rows, "Deleted");
        }
        self.apply_policy("delete_all", result)
    }

    /// Close the connection, reporting any error the engine raises on close.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| SqliteError::from(err))?;
        debug!("connection closed");
        Ok(())
    }

    fn table(&self, name: &str) -> Result<&TableDefinition> {
        self.schema.table(name)
    }

    fn column_list(&self, def: &TableDefinition, params: &Params) -> Result<Vec<String>> {
        params
            .columns()
            .map(|column| def.column(column).map(|c| quote_ident(&c.name)))
            .collect()
    }

    fn where_clause(&self, def: &TableDefinition, filter: &Params) -> Result<String> {
        if filter.is_empty() {
            return Err(SqliteError::EmptyFilter(def.name.clone()));
        }
        Ok(self
            .column_list(def, filter)?
            .into_iter()
            .map(|column| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(" AND "))
    }

    fn query(&self, table: &str, sql: &str, filter: &Params) -> Result<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql)?;
        let width = stmt.column_count();
        let mut rows = stmt.query(params_from_iter(filter.values()))?;

        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(Value::try_from(row.get_ref(i)?)?);
            }
            let row = Row::new(values);
            info!(table, "{row}");
            result.push(row);
        }
        Ok(result)
    }

    fn apply_policy<T: Default>(&self, operation: &str, result: Result<T>) -> Result<T> {
        match (result, self.policy) {
            (Err(err), ErrorPolicy::LogAndContinue) => {
                error!(operation, error = %err, "operation failed, continuing");
                Ok(T::default())
            }
            (result, _) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        let store =
            SqliteStore::connect_in_memory(&SqliteConfig::default(), Schema::football()).unwrap();
        for table in &Schema::football().tables {
            store.execute_statement(&table.create_sql()).unwrap();
        }
        store
    }

    #[test]
    fn insert_returns_sequential_ids() {
        let store = store();
        let first = store
            .insert_player(&NewPlayer::new("Lewandowski", Some("Striker"), 35))
            .unwrap();
        let second = store
            .insert_player(&NewPlayer::new("Palmer", Some("Forward"), 22))
            .unwrap();
        assert_eq!((first, second), (1, 2));
    }

    #[test]
    fn empty_filter_is_rejected() {
        let store = store();
        assert!(matches!(
            store.select_where(PLAYERS, &Params::new()),
            Err(SqliteError::EmptyFilter(_))
        ));
        assert!(matches!(
            store.delete_where(PLAYERS, &Params::new()),
            Err(SqliteError::EmptyFilter(_))
        ));
    }

    #[test]
    fn empty_changes_are_rejected() {
        let store = store();
        assert!(matches!(
            store.update_row(PLAYERS, 1, &Params::new()),
            Err(SqliteError::EmptyChanges(_))
        ));
    }

    #[test]
    fn empty_insert_is_rejected() {
        let store = store();
        let err = store.insert(PLAYERS, &Params::new()).unwrap_err();
        assert!(matches!(err, SqliteError::EmptyInsert(ref table) if table == "players"));
        assert_eq!(err.to_string(), "insert into table players has no values");
    }

    #[test]
    fn select_reports_invalid_utf8_text() {
        let store = store();
        store
            .connection()
            .execute(
                "INSERT INTO players(name, age) VALUES (CAST(X'66FF6F' AS TEXT), 30)",
                [],
            )
            .unwrap();

        assert!(matches!(
            store.select_all(PLAYERS),
            Err(SqliteError::Decode { .. })
        ));
    }

    #[test]
    fn injected_identifiers_never_reach_sql() {
        let store = store();
        store
            .insert_player(&NewPlayer::new("Lewandowski", Some("Striker"), 35))
            .unwrap();

        let filter = Params::new().with_value("1=1 OR name", "x");
        assert!(matches!(
            store.select_where(PLAYERS, &filter),
            Err(SqliteError::UnknownColumn { .. })
        ));
        assert!(matches!(
            store.delete_all("players; DROP TABLE clubs"),
            Err(SqliteError::UnknownTable(_))
        ));
        assert_eq!(store.select_all(PLAYERS).unwrap().len(), 1);
    }

    #[test]
    fn log_and_continue_returns_neutral_values() {
        let mut store = store();
        store.set_policy(ErrorPolicy::LogAndContinue);

        let changes = Params::new().with_value("salary", 1_000_000);
        assert_eq!(store.update_row(PLAYERS, 1, &changes).unwrap(), 0);
        store.execute_statement("CREATE TABLE (").unwrap();
        assert_eq!(store.delete_all("teams").unwrap(), 0);
    }

    #[test]
    fn propagate_surfaces_statement_errors() {
        let store = store();
        assert!(matches!(
            store.execute_statement("CREATE TABLE ("),
            Err(SqliteError::Statement(_))
        ));
    }
}
