//! Values, parameter bindings and rows exchanged with SQLite.

use crate::error::{Result, SqliteError};
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use std::fmt;

/// Core value types for SQLite operations
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Boolean(bool),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Boolean(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let out = match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
            // SQLite has no boolean storage class.
            Value::Boolean(b) => ToSqlOutput::Borrowed(ValueRef::Integer(i64::from(*b))),
        };
        Ok(out)
    }
}

impl TryFrom<ValueRef<'_>> for Value {
    type Error = SqliteError;

    /// Text that is not valid UTF-8 is reported, never replaced.
    fn try_from(v: ValueRef<'_>) -> Result<Self> {
        Ok(match v {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => match std::str::from_utf8(t) {
                Ok(text) => Value::Text(text.to_string()),
                Err(err) => {
                    return Err(SqliteError::Decode {
                        entity: "text value",
                        reason: err.to_string(),
                    })
                }
            },
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "None"),
            Value::Integer(i) => write!(f, "{i}"),
            // Debug keeps the fraction on whole numbers: 35.0, not 35.
            Value::Real(r) => write!(f, "{r:?}"),
            Value::Text(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            Value::Blob(b) => write!(f, "<{} bytes>", b.len()),
            Value::Boolean(b) => write!(f, "{}", i64::from(*b)),
        }
    }
}

/// Ordered column/value bindings used for filters, updates and inserts.
///
/// Setting the same column twice replaces the earlier value but keeps its
/// position, so the generated SQL is stable.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Params {
    pub values: Vec<(String, Value)>,
}

impl Params {
    /// Create a new Params object
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named value
    pub fn with_value(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.values.iter_mut().find(|(column, _)| column == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name.to_string(), value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(column, _)| column.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().map(|(_, value)| value)
    }
}

/// A row as returned by the engine, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_replace_keeps_position() {
        let params = Params::new()
            .with_value("name", "Palmer")
            .with_value("age", 22)
            .with_value("name", "Cole Palmer");

        assert_eq!(params.len(), 2);
        assert_eq!(params.columns().collect::<Vec<_>>(), vec!["name", "age"]);
        assert_eq!(params.values[0].1, Value::Text("Cole Palmer".to_string()));
    }

    #[test]
    fn option_none_becomes_null() {
        let value: Value = Option::<String>::None.into();
        assert!(value.is_null());
        assert_eq!(Value::from(Some(7)), Value::Integer(7));
    }

    #[test]
    fn row_displays_like_a_tuple() {
        let row = Row::new(vec![
            Value::Integer(1),
            Value::from("Lewandowski"),
            Value::Null,
            Value::Integer(35),
        ]);
        assert_eq!(row.to_string(), "(1, 'Lewandowski', None, 35)");
    }

    #[test]
    fn row_display_keeps_reals_and_quotes() {
        let row = Row::new(vec![
            Value::Real(35.0),
            Value::Real(1.5),
            Value::from("O'Neil"),
            Value::from("back\\slash"),
        ]);
        assert_eq!(row.to_string(), r"(35.0, 1.5, 'O\'Neil', 'back\\slash')");
    }

    #[test]
    fn invalid_utf8_text_is_a_decode_error() {
        let err = Value::try_from(ValueRef::Text(&[0x66, 0xff, 0x6f])).unwrap_err();
        assert!(matches!(err, SqliteError::Decode { entity: "text value", .. }));
        assert_eq!(
            Value::try_from(ValueRef::Text(b"Palmer")).unwrap(),
            Value::Text("Palmer".to_string())
        );
    }

    #[test]
    fn boolean_binds_as_integer() {
        let out = Value::Boolean(true).to_sql().unwrap();
        assert_eq!(out, ToSqlOutput::Borrowed(ValueRef::Integer(1)));
    }
}
