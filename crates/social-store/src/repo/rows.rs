//! Conversion between record column maps and SQLite values

use rusqlite::types::Value as SqlValue;
use serde_json::{Map, Number, Value};
use social_core::model::EntityRecord;
use social_core::schema::EntityKind;

use crate::errors::{value_error, Result};

/// Bindable value for one column of a record
pub(crate) fn to_sql(column: &str, value: Option<&Value>) -> Result<SqlValue> {
    match value {
        None | Some(Value::Null) => Ok(SqlValue::Null),
        Some(Value::String(s)) => Ok(SqlValue::Text(s.clone())),
        Some(Value::Bool(b)) => Ok(SqlValue::Integer(i64::from(*b))),
        Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(SqlValue::Integer(i)),
            (None, Some(f)) => Ok(SqlValue::Real(f)),
            _ => Err(value_error(column, "number out of range")),
        },
        Some(Value::Array(_)) | Some(Value::Object(_)) => {
            Err(value_error(column, "nested values are not stored"))
        }
    }
}

fn from_sql(column: &str, value: SqlValue) -> Result<Value> {
    match value {
        SqlValue::Null => Ok(Value::Null),
        SqlValue::Integer(i) => Ok(Value::from(i)),
        SqlValue::Real(f) => Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| value_error(column, "non-finite real")),
        SqlValue::Text(s) => Ok(Value::String(s)),
        SqlValue::Blob(_) => Err(value_error(column, "unexpected blob")),
    }
}

/// Rebuild a record from a row read in `columns` order
pub(crate) fn to_record(
    kind: EntityKind,
    columns: &[&'static str],
    values: Vec<SqlValue>,
) -> Result<EntityRecord> {
    let mut map = Map::with_capacity(columns.len());
    for (column, value) in columns.iter().zip(values) {
        map.insert((*column).to_string(), from_sql(column, value)?);
    }
    EntityRecord::from_columns(kind, map)
}
