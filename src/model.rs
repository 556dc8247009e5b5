//! Typed views over the `players` and `clubs` tables.

use crate::error::{Result, SqliteError};
use crate::value::{Params, Row, Value};
use serde::{Deserialize, Serialize};

/// Insert payload for a player. `id` is assigned by storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlayer {
    pub name: String,
    pub position: Option<String>,
    pub age: i64,
}

impl NewPlayer {
    pub fn new(name: &str, position: Option<&str>, age: i64) -> Self {
        Self {
            name: name.to_string(),
            position: position.map(str::to_string),
            age,
        }
    }

    pub fn to_params(&self) -> Params {
        Params::new()
            .with_value("name", self.name.as_str())
            .with_value("position", self.position.clone())
            .with_value("age", self.age)
    }
}

/// Insert payload for a club row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClub {
    pub player_id: i64,
    pub name: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

impl NewClub {
    pub fn new(player_id: i64, name: &str, country: &str, city: &str) -> Self {
        Self {
            player_id,
            name: Some(name.to_string()),
            country: Some(country.to_string()),
            city: Some(city.to_string()),
        }
    }

    pub fn to_params(&self) -> Params {
        Params::new()
            .with_value("player_id", self.player_id)
            .with_value("name", self.name.clone())
            .with_value("country", self.country.clone())
            .with_value("city", self.city.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub position: Option<String>,
    pub age: i64,
}

impl Player {
    /// Decode a `SELECT * FROM players` row.
    pub fn from_row(row: &Row) -> Result<Self> {
        let fields = RowFields::new("player", row, 4)?;
        Ok(Self {
            id: fields.integer(0)?,
            name: fields.text(1)?,
            position: fields.optional_text(2)?,
            age: fields.integer(3)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Club {
    pub id: i64,
    pub player_id: i64,
    pub name: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

impl Club {
    /// Decode a `SELECT * FROM clubs` row.
    pub fn from_row(row: &Row) -> Result<Self> {
        let fields = RowFields::new("club", row, 5)?;
        Ok(Self {
            id: fields.integer(0)?,
            player_id: fields.integer(1)?,
            name: fields.optional_text(2)?,
            country: fields.optional_text(3)?,
            city: fields.optional_text(4)?,
        })
    }
}

struct RowFields<'a> {
    entity: &'static str,
    row: &'a Row,
}

impl<'a> RowFields<'a> {
    fn new(entity: &'static str, row: &'a Row, width: usize) -> Result<Self> {
        if row.len() != width {
            return Err(SqliteError::Decode {
                entity,
                reason: format!("expected {width} columns, got {}", row.len()),
            });
        }
        Ok(Self { entity, row })
    }

    fn mismatch(&self, index: usize, expected: &str) -> SqliteError {
        SqliteError::Decode {
            entity: self.entity,
            reason: format!("column {index} is not {expected}: {:?}", self.row.values[index]),
        }
    }

    fn integer(&self, index: usize) -> Result<i64> {
        self.row.values[index]
            .as_i64()
            .ok_or_else(|| self.mismatch(index, "an integer"))
    }

    fn text(&self, index: usize) -> Result<String> {
        self.row.values[index]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.mismatch(index, "text"))
    }

    fn optional_text(&self, index: usize) -> Result<Option<String>> {
        match &self.row.values[index] {
            Value::Null => Ok(None),
            Value::Text(s) => Ok(Some(s.clone())),
            _ => Err(self.mismatch(index, "text or NULL")),
        }
    }
}
