use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::value::Value;

/// One result row from an ad-hoc query, as an ordered list of
/// (column name, value) pairs.
///
/// Column order is the statement's projection order, so iterating a `RawRow`
/// walks the columns exactly as the query selected them. Lookups by name are
/// exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRow {
    columns: Vec<(String, Value)>,
}

impl RawRow {
    /// The value of the named column, if the row has one.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    /// Iterates (column name, value) pairs in projection order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true for a zero-column row.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl IntoIterator for RawRow {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

/// Decodes one driver row into a [`RawRow`].
///
/// NULL is detected on the raw value before any typed read, so a NULL in any
/// column becomes [`Value::Null`] rather than a decode failure. Non-null
/// values dispatch on the column's declared type; anything unrecognized is
/// read as text, and a value the driver cannot coerce surfaces as a database
/// error instead of being silently dropped.
pub(crate) fn decode(row: &SqliteRow) -> crate::Result<RawRow> {
    let mut columns = Vec::with_capacity(row.len());
    for (index, column) in row.columns().iter().enumerate() {
        let value = if row.try_get_raw(index)?.is_null() {
            Value::Null
        } else {
            decode_column(row, index, column.type_info().name())?
        };
        columns.push((column.name().to_string(), value));
    }
    Ok(RawRow { columns })
}

fn decode_column(row: &SqliteRow, index: usize, type_name: &str) -> crate::Result<Value> {
    let value = match type_name {
        "BOOLEAN" | "BOOL" => Value::Bool(row.try_get(index)?),
        "INTEGER" | "INT4" | "INT8" | "BIGINT" | "SMALLINT" => {
            Value::BigInt(row.try_get(index)?)
        }
        "REAL" | "FLOAT4" | "FLOAT8" | "DOUBLE" | "NUMERIC" => {
            Value::Double(row.try_get(index)?)
        }
        "DATE" => Value::Date(row.try_get(index)?),
        "TIME" => Value::Time(row.try_get(index)?),
        "DATETIME" | "TIMESTAMP" => Value::Timestamp(row.try_get(index)?),
        "BLOB" => Value::Blob(row.try_get(index)?),
        _ => Value::Text(row.try_get(index)?),
    };
    Ok(value)
}
