use std::collections::HashSet;

use regex::Regex;

/// Marker that starts a new query definition inside a catalog file.
pub const QUERY_MARKER: &str = "-- :name ";

/// Regex matching a `{identifier}` placeholder.
pub(crate) const PLACEHOLDER: &str = r"\{([A-Za-z0-9_]+)\}";

/// An immutable named SQL query with `{name}` placeholders.
///
/// Parameter names are extracted from the SQL text once, at construction, in
/// first-occurrence order with duplicates removed. A query and its parameter
/// set therefore never diverge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlQuery {
    name: String,
    sql: String,
    params: Vec<String>,
}

impl SqlQuery {
    /// Creates a query, deriving its parameter names from `{name}`
    /// placeholders in the SQL.
    ///
    /// # Errors
    ///
    /// Returns an error if the placeholder pattern cannot be compiled.
    ///
    /// ```rust
    /// use sqlstore::SqlQuery;
    ///
    /// let q = SqlQuery::new("getUser", "SELECT * FROM users WHERE id = {id}")?;
    /// assert_eq!(q.parameter_names(), ["id"]);
    /// # Ok::<(), sqlstore::Error>(())
    /// ```
    pub fn new<N, S>(name: N, sql: S) -> crate::Result<Self>
    where
        N: Into<String>,
        S: Into<String>,
    {
        let sql = sql.into();
        let regex = Regex::new(PLACEHOLDER)?;
        let mut params: Vec<String> = Vec::new();
        for captures in regex.captures_iter(&sql) {
            let param = &captures[1];
            if !params.iter().any(|p| p == param) {
                params.push(param.to_string());
            }
        }
        Ok(Self {
            name: name.into(),
            sql,
            params,
        })
    }

    /// The query's symbolic name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw SQL body, placeholders included.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Distinct placeholder names in first-occurrence order.
    pub fn parameter_names(&self) -> &[String] {
        &self.params
    }

    /// Returns true if `caller_names` is exactly this query's parameter set.
    ///
    /// No subset or superset matching: same size, same members.
    pub fn matches(&self, caller_names: &HashSet<&str>) -> bool {
        self.params.len() == caller_names.len()
            && self.params.iter().all(|p| caller_names.contains(p.as_str()))
    }
}

/// Parses the text of one catalog source into its query definitions.
///
/// A line starting with [`QUERY_MARKER`] (leading whitespace tolerated)
/// begins a new query named by the rest of the line; every following line up
/// to the next marker or end of input is accumulated as the SQL body, which
/// is trimmed as a whole. A marker directly followed by another marker has an
/// empty body and yields nothing. Text before the first marker is ignored,
/// and input without markers parses to an empty list.
///
/// ```rust
/// let queries = sqlstore::catalog::parse(
///     "-- :name getUser\nSELECT * FROM users WHERE id = {id}\n",
/// )?;
/// assert_eq!(queries.len(), 1);
/// assert_eq!(queries[0].name(), "getUser");
/// # Ok::<(), sqlstore::Error>(())
/// ```
pub fn parse(content: &str) -> crate::Result<Vec<SqlQuery>> {
    let mut queries = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in content.lines() {
        if let Some(rest) = line.trim().strip_prefix(QUERY_MARKER) {
            if let Some((name, body)) = current.take() {
                let sql = body.join("\n").trim().to_string();
                if !sql.is_empty() {
                    queries.push(SqlQuery::new(name, sql)?);
                }
            }
            current = Some((rest.trim().to_string(), Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }

    if let Some((name, body)) = current.take() {
        let sql = body.join("\n").trim().to_string();
        if !sql.is_empty() {
            queries.push(SqlQuery::new(name, sql)?);
        }
    }

    Ok(queries)
}
