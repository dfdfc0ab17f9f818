//! # sqlstore
//!
//! Keep your SQL in `.sql` files, call it by name, and let the library handle
//! named-parameter binding and row mapping on top of SQLx.
//!
//! ## Features
//!
//! - **SQL catalogs**: queries live in plain `.sql` files, introduced by a
//!   `-- :name queryName` marker line and referenced by that name at runtime
//! - **Named Placeholders**: use `{param_name}` instead of `?` in your SQL;
//!   values always travel through the prepared statement, never through
//!   string concatenation
//! - **Signature Overloading**: several queries may share one name and are
//!   told apart by the exact set of parameter names the caller supplies
//! - **Type-Safe Results**: typed queries materialize rows via SQLx's
//!   `FromRow`; ad-hoc queries return ordered column/value rows
//! - **Pooled or Single-Connection**: run against a `SqlitePool`, or let the
//!   store cache one lazily created connection and revive it when it dies
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! sqlx = { version = "0.8", features = ["sqlite", "runtime-tokio"] }
//! sqlstore = "0.1"
//! ```
//!
//! Write a catalog file, e.g. `queries/users.sql`:
//!
//! ```sql
//! -- :name getUserById
//! SELECT id, name, email FROM users WHERE id = {id}
//!
//! -- :name getUserById
//! SELECT id, name, email FROM users WHERE email = {email}
//!
//! -- :name deleteUser
//! DELETE FROM users WHERE id = {id}
//! ```
//!
//! Load it and query:
//!
//! ```rust,no_run
//! use sqlstore::{params, QueryRegistry, SqlStore};
//!
//! #[derive(Debug, sqlx::FromRow)]
//! struct User {
//!     id: i64,
//!     name: String,
//!     email: Option<String>,
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = QueryRegistry::load("queries/")?;
//! let store = SqlStore::open("sqlite://app.db?mode=rwc", registry);
//!
//! // Resolved by name + parameter set: {id} picks the first definition,
//! // {email} would pick the second.
//! let users: Vec<User> = store.query("getUserById", &params! { "id" => 1 }).await?;
//!
//! // Tri-state update: Some(true) rows affected, Some(false) zero rows,
//! // None when no definition matches.
//! match store.update("deleteUser", &params! { "id" => 99 }).await? {
//!     Some(true) => println!("deleted"),
//!     Some(false) => println!("nothing to delete"),
//!     None => println!("no such query"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Ad-hoc SQL
//!
//! `raw_query`/`raw_update` accept SQL directly, with the same placeholder
//! rules and no registry lookup:
//!
//! ```rust,no_run
//! use sqlstore::{params, QueryRegistry, SqlStore};
//!
//! # async fn example(store: SqlStore) -> Result<(), Box<dyn std::error::Error>> {
//! let rows = store
//!     .raw_query("SELECT name, score FROM users WHERE score > {min}", &params! { "min" => 0.5 })
//!     .await?;
//! for row in &rows {
//!     println!("{:?} scored {:?}", row.get("name"), row.get("score"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## How It Works
//!
//! 1. **Load**: catalog sources parse into immutable query definitions; each
//!    definition's parameter-name set is derived from its SQL once, at
//!    construction
//! 2. **Resolve**: a call site's (name, parameter-name set) selects the
//!    single definition whose signature matches exactly; no subset or
//!    superset matching
//! 3. **Execute**: `{name}` placeholders rewrite to positional `?` markers
//!    in occurrence order, values bind by variant through a type dispatch,
//!    and rows map onto the caller's type
//!
//! A missing parameter fails before any statement reaches the database, and
//! an unresolved name is an ordinary "not found" result; only I/O, binding,
//! and driver problems surface as errors.
//!
//! ## Limitations
//!
//! - SQLite only (the registry and builder are backend-agnostic; the
//!   executing store is written against SQLx's SQLite driver)
//! - Placeholder names must match `[A-Za-z0-9_]+`
//! - Two definitions sharing a name and an identical parameter set are
//!   allowed but ambiguous: the first loaded wins, and the collision is
//!   reported via [`QueryRegistry::duplicates`]
//!
//! ## License
//!
//! Licensed under either of Apache License, Version 2.0 or MIT license at
//! your option.

pub mod builder;
pub mod catalog;
pub mod error;
pub mod registry;
pub mod row;
pub mod store;
pub mod value;

pub use catalog::SqlQuery;
pub use error::{Error, Result};
pub use registry::{DuplicateSignature, QueryRegistry};
pub use row::RawRow;
pub use store::SqlStore;
pub use value::{Params, Value};

/// Convenience re-exports for common use cases
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::params;
    pub use crate::QueryRegistry;
    pub use crate::RawRow;
    pub use crate::SqlQuery;
    pub use crate::SqlStore;
    pub use crate::Value;
}
