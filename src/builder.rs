use regex::Regex;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

use crate::catalog::PLACEHOLDER;
use crate::error::Error;
use crate::value::Params;

/// Type alias for a SQLx query with SQLite arguments
pub type Q<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Rewrites `{name}` placeholders to positional `?` markers.
///
/// Returns the rewritten SQL together with the placeholder names in
/// left-to-right occurrence order. A repeated name appears once per
/// occurrence, so the bind loop supplies its value to every slot.
///
/// # Examples
///
/// ```
/// use sqlstore::builder::expand;
///
/// let (sql, order) = expand("SELECT * FROM users WHERE id = {id} AND name = {name}")?;
/// assert_eq!(sql, "SELECT * FROM users WHERE id = ? AND name = ?");
/// assert_eq!(order, ["id", "name"]);
/// # Ok::<(), sqlstore::Error>(())
/// ```
pub fn expand(sql: &str) -> crate::Result<(String, Vec<String>)> {
    let regex = Regex::new(PLACEHOLDER)?;
    let order = regex
        .captures_iter(sql)
        .map(|captures| captures[1].to_string())
        .collect();
    let positional = regex.replace_all(sql, "?").into_owned();
    Ok((positional, order))
}

/// Builds a bound SQLx query from positional SQL, its placeholder order, and
/// the caller's named values.
///
/// Fails with [`Error::MissingParameter`] at the first placeholder absent
/// from `params`, before anything reaches the database. Values bind in
/// occurrence order through the [`Value`](crate::Value) type dispatch.
pub(crate) fn build<'q>(
    sql: &'q str,
    order: &'q [String],
    params: &'q Params,
) -> crate::Result<Q<'q>> {
    let mut query = sqlx::query::<Sqlite>(sql);
    for name in order {
        let value = params
            .get(name)
            .ok_or_else(|| Error::MissingParameter(name.clone()))?;
        query = value.bind(query);
    }
    Ok(query)
}
