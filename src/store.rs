use std::any::type_name;
use std::collections::HashSet;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqliteRow};
use sqlx::{Connection, FromRow, Sqlite};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::builder;
use crate::error::Error;
use crate::registry::QueryRegistry;
use crate::row::{self, RawRow};
use crate::value::Params;

/// Executes named SQL queries from a [`QueryRegistry`] against a SQLite
/// database.
///
/// A store owns its registry and a connection source. Two sources are
/// supported:
///
/// - **Pooled** ([`SqlStore::with_pool`]): every operation borrows a
///   connection from the pool and returns it when the operation ends. Safe
///   under concurrent callers, since each operation holds its connection
///   exclusively.
/// - **Cached** ([`SqlStore::open`]): a single connection is created lazily
///   on first use, kept for the store's lifetime, and recreated when a
///   liveness check fails. Operations serialize on this connection.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlstore::{params, QueryRegistry, SqlStore};
///
/// #[derive(Debug, sqlx::FromRow)]
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = QueryRegistry::load("queries/")?;
/// let store = SqlStore::open("sqlite://app.db?mode=rwc", registry);
///
/// let users: Vec<User> = store.query("getUserById", &params! { "id" => 1 }).await?;
/// for user in &users {
///     println!("{}: {}", user.id, user.name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct SqlStore {
    registry: QueryRegistry,
    conns: ConnectionSource,
}

enum ConnectionSource {
    Pool(SqlitePool),
    Cached {
        url: String,
        conn: Mutex<Option<SqliteConnection>>,
    },
}

enum Handle<'a> {
    Pooled(PoolConnection<Sqlite>),
    Cached(MutexGuard<'a, Option<SqliteConnection>>),
}

impl ConnectionSource {
    async fn acquire(&self) -> crate::Result<Handle<'_>> {
        match self {
            ConnectionSource::Pool(pool) => Ok(Handle::Pooled(pool.acquire().await?)),
            ConnectionSource::Cached { url, conn } => {
                let mut guard = conn.lock().await;
                let dead = match guard.as_mut() {
                    Some(conn) => conn.ping().await.is_err(),
                    None => true,
                };
                if dead {
                    *guard = Some(SqliteConnection::connect(url).await?);
                }
                Ok(Handle::Cached(guard))
            }
        }
    }
}

impl Handle<'_> {
    fn conn(&mut self) -> &mut SqliteConnection {
        match self {
            Handle::Pooled(conn) => conn,
            Handle::Cached(guard) => match guard.as_mut() {
                Some(conn) => conn,
                // acquire() installs a live connection before handing out the guard
                None => unreachable!("cached connection missing after acquire"),
            },
        }
    }
}

impl SqlStore {
    /// Creates a store that draws a pooled connection per operation.
    pub fn with_pool(pool: SqlitePool, registry: QueryRegistry) -> Self {
        Self {
            registry,
            conns: ConnectionSource::Pool(pool),
        }
    }

    /// Creates a store that lazily opens, then caches, a single connection
    /// to `url`.
    ///
    /// The connection is first established by the first operation, so a bad
    /// URL surfaces there rather than here. If the connection is later found
    /// dead it is reopened transparently.
    pub fn open(url: impl Into<String>, registry: QueryRegistry) -> Self {
        Self {
            registry,
            conns: ConnectionSource::Cached {
                url: url.into(),
                conn: Mutex::new(None),
            },
        }
    }

    /// The registry this store resolves query names against.
    pub fn registry(&self) -> &QueryRegistry {
        &self.registry
    }

    /// Executes a named SELECT query and maps each row onto `T`.
    ///
    /// The registry is consulted with the query name and the parameter-name
    /// set of `params`; if no definition matches, a warning is logged and an
    /// empty vec is returned. Rows map via [`sqlx::FromRow`], so `T` is
    /// usually a `#[derive(sqlx::FromRow)]` struct, or a tuple, which maps
    /// by column position.
    ///
    /// # Errors
    ///
    /// [`Error::MissingParameter`] if the definition references a placeholder
    /// absent from `params`, [`Error::Mapping`] if a row does not fit `T`,
    /// or the underlying database error.
    pub async fn query<T>(&self, name: &str, params: &Params) -> crate::Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow>,
    {
        let caller_names = param_names(params);
        let Some(query) = self.registry.find(name, &caller_names) else {
            warn!(query = name, parameters = ?caller_names, "no query matching name and parameter set");
            return Ok(Vec::new());
        };
        let rows = self.fetch_rows(query.sql(), params).await?;
        rows.iter()
            .map(T::from_row)
            .collect::<Result<Vec<T>, sqlx::Error>>()
            .map_err(|source| Error::Mapping {
                target: type_name::<T>(),
                source,
            })
    }

    /// Executes a named SELECT query expecting zero or one row.
    ///
    /// # Errors
    ///
    /// [`Error::MultipleRows`] if the query returns more than one row, plus
    /// everything [`query`](Self::query) can fail with.
    pub async fn query_one<T>(&self, name: &str, params: &Params) -> crate::Result<Option<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow>,
    {
        let mut rows: Vec<T> = self.query(name, params).await?;
        if rows.len() > 1 {
            return Err(Error::MultipleRows {
                query: name.to_string(),
                count: rows.len(),
            });
        }
        Ok(rows.pop())
    }

    /// Executes a named INSERT/UPDATE/DELETE query.
    ///
    /// Returns `Some(true)` if rows were affected, `Some(false)` if zero
    /// rows were affected, and `None` if no definition matched the name and
    /// parameter set: three outcomes the caller can tell apart.
    pub async fn update(&self, name: &str, params: &Params) -> crate::Result<Option<bool>> {
        let caller_names = param_names(params);
        let Some(query) = self.registry.find(name, &caller_names) else {
            warn!(query = name, parameters = ?caller_names, "no query matching name and parameter set");
            return Ok(None);
        };
        let affected = self.execute_sql(query.sql(), params).await?;
        Ok(Some(affected > 0))
    }

    /// Executes an ad-hoc SELECT with `{name}` placeholders, bypassing the
    /// registry.
    ///
    /// Values are bound through the prepared statement, never spliced into
    /// the SQL text. Each row comes back as a [`RawRow`] preserving column
    /// order.
    pub async fn raw_query(&self, sql: &str, params: &Params) -> crate::Result<Vec<RawRow>> {
        let rows = self.fetch_rows(sql, params).await?;
        rows.iter().map(row::decode).collect()
    }

    /// Executes an ad-hoc INSERT/UPDATE/DELETE with `{name}` placeholders,
    /// bypassing the registry. Returns the number of rows affected.
    pub async fn raw_update(&self, sql: &str, params: &Params) -> crate::Result<u64> {
        self.execute_sql(sql, params).await
    }

    /// Closes the cached connection, if this store holds one.
    ///
    /// Pooled stores return their connections after every operation, so for
    /// them this is a no-op. A closed store can keep being used; the next
    /// operation reconnects.
    pub async fn close(&self) -> crate::Result<()> {
        if let ConnectionSource::Cached { conn, .. } = &self.conns {
            if let Some(conn) = conn.lock().await.take() {
                conn.close().await?;
            }
        }
        Ok(())
    }

    async fn fetch_rows(&self, sql: &str, params: &Params) -> crate::Result<Vec<SqliteRow>> {
        let (positional, order) = builder::expand(sql)?;
        let query = builder::build(&positional, &order, params)?;
        let mut handle = self.conns.acquire().await?;
        debug!(sql = %positional, "executing query");
        Ok(query.fetch_all(handle.conn()).await?)
    }

    async fn execute_sql(&self, sql: &str, params: &Params) -> crate::Result<u64> {
        let (positional, order) = builder::expand(sql)?;
        let query = builder::build(&positional, &order, params)?;
        let mut handle = self.conns.acquire().await?;
        debug!(sql = %positional, "executing update");
        Ok(query.execute(handle.conn()).await?.rows_affected())
    }
}

fn param_names(params: &Params) -> HashSet<&str> {
    params.keys().map(String::as_str).collect()
}
