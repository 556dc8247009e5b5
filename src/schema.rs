//! Declarative table definitions and the fixed football schema.

use crate::error::{Result, SqliteError};

pub const PLAYERS: &str = "players";
pub const CLUBS: &str = "clubs";

/// Schema definition for the SQLite database
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub tables: Vec<TableDefinition>,
}

impl Schema {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    pub fn add_table(mut self, table: TableDefinition) -> Self {
        self.tables.push(table);
        self
    }

    /// The two-table players/clubs schema.
    ///
    /// `clubs.player_id` points at `players.id`; one player may have many
    /// club rows.
    pub fn football() -> Self {
        let players = TableDefinition::new(PLAYERS)
            .with_column(ColumnDefinition::new("id", DataType::Integer).primary_key())
            .with_column(ColumnDefinition::new("name", DataType::Text).not_null())
            .with_column(ColumnDefinition::new("position", DataType::Text))
            .with_column(ColumnDefinition::new("age", DataType::Integer).not_null());

        let clubs = TableDefinition::new(CLUBS)
            .with_column(ColumnDefinition::new("id", DataType::Integer).primary_key())
            .with_column(ColumnDefinition::new("player_id", DataType::Integer).not_null())
            .with_column(ColumnDefinition::new("name", DataType::Varchar(250)))
            .with_column(ColumnDefinition::new("country", DataType::Text))
            .with_column(ColumnDefinition::new("city", DataType::Text))
            .with_foreign_key(ForeignKey::new("player_id", PLAYERS, "id"));

        Self::new().add_table(players).add_table(clubs)
    }

    pub fn table(&self, name: &str) -> Result<&TableDefinition> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| SqliteError::UnknownTable(name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    pub fn column(&self, name: &str) -> Result<&ColumnDefinition> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| SqliteError::UnknownColumn {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    /// Render an idempotent `CREATE TABLE IF NOT EXISTS` statement.
    pub fn create_sql(&self) -> String {
        let mut parts: Vec<String> = self.columns.iter().map(ColumnDefinition::sql).collect();
        parts.extend(self.foreign_keys.iter().map(ForeignKey::sql));
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n);",
            quote_ident(&self.name),
            parts.join(",\n    ")
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
}

impl ColumnDefinition {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            constraints: Vec::new(),
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.constraints.push(ColumnConstraint::PrimaryKey);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.constraints.push(ColumnConstraint::NotNull);
        self
    }

    pub fn unique(mut self) -> Self {
        self.constraints.push(ColumnConstraint::Unique);
        self
    }

    fn sql(&self) -> String {
        let mut sql = format!("{} {}", quote_ident(&self.name), self.data_type.sql());
        for constraint in &self.constraints {
            sql.push(' ');
            sql.push_str(constraint.sql());
        }
        sql
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    Integer,
    Text,
    Real,
    Blob,
    Varchar(u32),
}

impl DataType {
    fn sql(&self) -> String {
        match self {
            DataType::Integer => "INTEGER".to_string(),
            DataType::Text => "TEXT".to_string(),
            DataType::Real => "REAL".to_string(),
            DataType::Blob => "BLOB".to_string(),
            DataType::Varchar(len) => format!("VARCHAR({len})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnConstraint {
    PrimaryKey,
    NotNull,
    Unique,
}

impl ColumnConstraint {
    fn sql(&self) -> &'static str {
        match self {
            ColumnConstraint::PrimaryKey => "PRIMARY KEY",
            ColumnConstraint::NotNull => "NOT NULL",
            ColumnConstraint::Unique => "UNIQUE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
    pub on_delete: ForeignKeyAction,
    pub on_update: ForeignKeyAction,
}

impl ForeignKey {
    pub fn new(column: &str, foreign_table: &str, foreign_column: &str) -> Self {
        Self {
            column: column.to_string(),
            foreign_table: foreign_table.to_string(),
            foreign_column: foreign_column.to_string(),
            on_delete: ForeignKeyAction::NoAction,
            on_update: ForeignKeyAction::NoAction,
        }
    }

    pub fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = action;
        self
    }

    pub fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = action;
        self
    }

    fn sql(&self) -> String {
        let mut sql = format!(
            "FOREIGN KEY ({}) REFERENCES {}({})",
            quote_ident(&self.column),
            quote_ident(&self.foreign_table),
            quote_ident(&self.foreign_column)
        );
        // NO ACTION is SQLite's default, leave it implicit.
        if self.on_delete != ForeignKeyAction::NoAction {
            sql.push_str(" ON DELETE ");
            sql.push_str(self.on_delete.sql());
        }
        if self.on_update != ForeignKeyAction::NoAction {
            sql.push_str(" ON UPDATE ");
            sql.push_str(self.on_update.sql());
        }
        sql
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForeignKeyAction {
    NoAction,
    Cascade,
    SetNull,
    SetDefault,
    Restrict,
}

impl ForeignKeyAction {
    fn sql(&self) -> &'static str {
        match self {
            ForeignKeyAction::NoAction => "NO ACTION",
            ForeignKeyAction::Cascade => "CASCADE",
            ForeignKeyAction::SetNull => "SET NULL",
            ForeignKeyAction::SetDefault => "SET DEFAULT",
            ForeignKeyAction::Restrict => "RESTRICT",
        }
    }
}

/// Quote an identifier for interpolation into SQL.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn players_create_sql() {
        let schema = Schema::football();
        let sql = schema.table(PLAYERS).unwrap().create_sql();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"players\" (\n    \"id\" INTEGER PRIMARY KEY,\n    \"name\" TEXT NOT NULL,\n    \"position\" TEXT,\n    \"age\" INTEGER NOT NULL\n);"
        );
    }

    #[test]
    fn clubs_declare_foreign_key() {
        let schema = Schema::football();
        let sql = schema.table(CLUBS).unwrap().create_sql();
        assert!(sql.contains("\"name\" VARCHAR(250)"));
        assert!(sql.contains("FOREIGN KEY (\"player_id\") REFERENCES \"players\"(\"id\")"));
        assert!(!sql.contains("ON DELETE"));
    }

    #[test]
    fn foreign_key_actions_render() {
        let fk = ForeignKey::new("player_id", PLAYERS, "id").on_delete(ForeignKeyAction::Cascade);
        assert!(fk.sql().ends_with("ON DELETE CASCADE"));
    }

    #[test]
    fn custom_table_renders_unique_and_update_action() {
        let transfers = TableDefinition::new("transfers")
            .with_column(ColumnDefinition::new("id", DataType::Integer).primary_key())
            .with_column(ColumnDefinition::new("code", DataType::Text).not_null().unique())
            .with_column(ColumnDefinition::new("player_id", DataType::Integer))
            .with_foreign_key(
                ForeignKey::new("player_id", PLAYERS, "id")
                    .on_delete(ForeignKeyAction::SetNull)
                    .on_update(ForeignKeyAction::Restrict),
            );

        let sql = transfers.create_sql();
        assert!(sql.contains("\"code\" TEXT NOT NULL UNIQUE"));
        assert!(sql.contains("REFERENCES \"players\"(\"id\") ON DELETE SET NULL ON UPDATE RESTRICT"));
    }

    #[test]
    fn lookups_reject_unknown_names() {
        let schema = Schema::football();
        assert!(matches!(
            schema.table("teams"),
            Err(SqliteError::UnknownTable(name)) if name == "teams"
        ));
        let players = schema.table(PLAYERS).unwrap();
        assert!(matches!(
            players.column("salary"),
            Err(SqliteError::UnknownColumn { column, .. }) if column == "salary"
        ));
        assert!(players.column("age").is_ok());
    }

    #[test]
    fn quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
