use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::builder::Q;

/// Named parameter values keyed by placeholder name.
///
/// Usually built with the [`params!`](crate::params) macro:
///
/// ```rust
/// use sqlstore::params;
///
/// let p = params! {
///     "id" => 42,
///     "name" => "Alice",
/// };
/// assert_eq!(p.len(), 2);
/// ```
pub type Params = HashMap<String, Value>;

/// A dynamically typed SQL value.
///
/// `Value` carries every parameter a caller can bind and every column a raw
/// query can return. Binding dispatches on the variant, so any `Value` can be
/// handed to the driver; whether the database accepts it for a given column
/// is decided at execution time.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    BigInt(i64),
    /// Single-precision float
    Float(f32),
    /// Double-precision float
    Double(f64),
    /// Boolean
    Bool(bool),
    /// Text
    Text(String),
    /// Raw bytes; also the opaque fallback for anything the other variants
    /// don't cover
    Blob(Vec<u8>),
    /// Calendar date without a time component
    Date(NaiveDate),
    /// Time of day without a date component
    Time(NaiveTime),
    /// Date and time without a timezone
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Returns true for `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the integer content, widening `Int` to 64 bits.
    ///
    /// `Null` and non-integer variants yield `0`, mirroring how a
    /// non-nullable integer field treats a NULL column.
    pub fn as_i64(&self) -> i64 {
        match self {
            Value::Int(v) => i64::from(*v),
            Value::BigInt(v) => *v,
            _ => 0,
        }
    }

    /// Returns the floating-point content, widening `Float` to 64 bits.
    ///
    /// `Null` and non-float variants yield `0.0`.
    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Float(v) => f64::from(*v),
            Value::Double(v) => *v,
            _ => 0.0,
        }
    }

    /// Returns the boolean content; `Null` and non-boolean variants yield
    /// `false`.
    pub fn as_bool(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    /// Returns the text content; `Null` and non-text variants yield `""`.
    pub fn as_str(&self) -> &str {
        match self {
            Value::Text(v) => v,
            _ => "",
        }
    }

    /// Binds this value at the next positional slot of `q`.
    pub(crate) fn bind<'q>(&'q self, q: Q<'q>) -> Q<'q> {
        match self {
            Value::Null => q.bind(None::<i64>),
            Value::Int(v) => q.bind(*v),
            Value::BigInt(v) => q.bind(*v),
            Value::Float(v) => q.bind(*v),
            Value::Double(v) => q.bind(*v),
            Value::Bool(v) => q.bind(*v),
            Value::Text(v) => q.bind(v.as_str()),
            Value::Blob(v) => q.bind(v.as_slice()),
            Value::Date(v) => q.bind(*v),
            Value::Time(v) => q.bind(*v),
            Value::Timestamp(v) => q.bind(*v),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
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

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Blob(v.to_vec())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Time(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Builds a [`Params`](crate::Params) map from `"name" => value` pairs.
///
/// Values are converted through [`Value::from`], so anything with a `From`
/// conversion into [`Value`](crate::Value) works on the right-hand side.
///
/// ```rust
/// use sqlstore::{params, Value};
///
/// let p = params! { "id" => 7, "email" => "a@b.com" };
/// assert_eq!(p["id"], Value::Int(7));
/// assert_eq!(p["email"], Value::Text("a@b.com".to_string()));
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::Params::new();
        $(map.insert(::std::string::String::from($name), $crate::Value::from($value));)+
        map
    }};
}
