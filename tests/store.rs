//! End-to-end tests against in-memory SQLite.

use chrono::NaiveDate;
use sqlstore::{params, Error, QueryRegistry, SqlStore, Value};
use sqlx::sqlite::SqlitePoolOptions;

const CATALOG: &str = "\
-- :name getAllUsers
SELECT * FROM users ORDER BY id

-- :name getUserById
SELECT * FROM users WHERE id = {id}

-- :name getUserByStatus
SELECT * FROM users WHERE status = {status} ORDER BY id

-- :name getUser
SELECT * FROM users WHERE id = {id}

-- :name getUser
SELECT * FROM users WHERE email = {email}

-- :name insertUser
INSERT INTO users (name, email, status, score) VALUES ({name}, {email}, {status}, {score})

-- :name insertUserWithTimestamp
INSERT INTO users (name, email, status, score, created_at) VALUES ({name}, {email}, {status}, {score}, {created_at})

-- :name updateUserStatus
UPDATE users SET status = {status} WHERE id = {id}

-- :name deleteUser
DELETE FROM users WHERE id = {id}

-- :name getUserCount
SELECT COUNT(*) AS user_count FROM users
";

const SCHEMA: &str = "\
CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT,
    status TEXT,
    score REAL NOT NULL DEFAULT 0.0,
    active BOOLEAN NOT NULL DEFAULT 1,
    created_at DATETIME
)";

#[derive(Debug, PartialEq, sqlx::FromRow)]
struct User {
    id: i64,
    name: String,
    email: Option<String>,
    status: Option<String>,
    score: f64,
    active: bool,
    created_at: Option<chrono::NaiveDateTime>,
}

async fn store() -> SqlStore {
    let registry: QueryRegistry = CATALOG.parse().expect("catalog parses");
    let store = SqlStore::open("sqlite::memory:", registry);
    store.raw_update(SCHEMA, &params! {}).await.expect("schema applies");
    store
}

async fn insert_user(store: &SqlStore, name: &str, email: Option<&str>, status: &str, score: f64) {
    let result = store
        .update(
            "insertUser",
            &params! {
                "name" => name,
                "email" => email,
                "status" => status,
                "score" => score,
            },
        )
        .await
        .expect("insert succeeds");
    assert_eq!(result, Some(true));
}

#[tokio::test]
async fn query_returns_matching_row() {
    let store = store().await;
    insert_user(&store, "Alice", Some("alice@example.com"), "active", 1.0).await;

    let users: Vec<User> = store.query("getUserById", &params! { "id" => 1 }).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "Alice");
    assert_eq!(users[0].email.as_deref(), Some("alice@example.com"));
    assert!(users[0].active);
}

#[tokio::test]
async fn query_without_matching_row_returns_empty() {
    let store = store().await;
    insert_user(&store, "Alice", None, "active", 1.0).await;

    let users: Vec<User> = store.query("getUserById", &params! { "id" => 999 }).await.unwrap();
    assert!(users.is_empty());
}

#[tokio::test]
async fn unknown_query_name_returns_empty() {
    let store = store().await;
    let users: Vec<User> = store.query("noSuchQuery", &params! { "id" => 1 }).await.unwrap();
    assert!(users.is_empty());
}

#[tokio::test]
async fn mismatched_parameter_set_returns_empty() {
    let store = store().await;
    insert_user(&store, "Alice", None, "active", 1.0).await;

    // subset and superset of the stored signature both miss
    let none: Vec<User> = store.query("getUserById", &params! {}).await.unwrap();
    assert!(none.is_empty());
    let none: Vec<User> = store
        .query("getUserById", &params! { "id" => 1, "extra" => 2 })
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn overloaded_name_resolves_by_parameter_signature() {
    let store = store().await;
    insert_user(&store, "Alice", Some("alice@example.com"), "active", 1.0).await;
    insert_user(&store, "Bob", Some("bob@example.com"), "active", 2.0).await;

    let by_email: Vec<User> = store
        .query("getUser", &params! { "email" => "bob@example.com" })
        .await
        .unwrap();
    assert_eq!(by_email.len(), 1);
    assert_eq!(by_email[0].name, "Bob");

    let by_id: Vec<User> = store.query("getUser", &params! { "id" => 1 }).await.unwrap();
    assert_eq!(by_id.len(), 1);
    assert_eq!(by_id[0].name, "Alice");
}

#[tokio::test]
async fn bound_string_is_a_literal_value_not_sql() {
    let store = store().await;
    insert_user(&store, "Alice", None, "active", 1.0).await;

    let hostile = "x' OR '1'='1";
    let rows = store
        .raw_query("SELECT * FROM users WHERE name = {name}", &params! { "name" => hostile })
        .await
        .unwrap();
    assert!(rows.is_empty());

    // the same string survives a round trip untouched
    insert_user(&store, hostile, None, "active", 0.0).await;
    let rows = store
        .raw_query("SELECT name FROM users WHERE name = {name}", &params! { "name" => hostile })
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some(&Value::Text(hostile.to_string())));
}

#[tokio::test]
async fn update_distinguishes_zero_rows_from_unknown_query() {
    let store = store().await;

    // zero rows affected
    assert_eq!(
        store.update("deleteUser", &params! { "id" => 999 }).await.unwrap(),
        Some(false)
    );
    // unknown query name
    assert_eq!(store.update("noSuchQuery", &params! { "id" => 1 }).await.unwrap(), None);

    // rows affected
    insert_user(&store, "Alice", None, "active", 1.0).await;
    assert_eq!(
        store.update("deleteUser", &params! { "id" => 1 }).await.unwrap(),
        Some(true)
    );
}

#[tokio::test]
async fn query_one_returns_at_most_one_row() {
    let store = store().await;
    assert_eq!(
        store.query_one::<User>("getUserById", &params! { "id" => 1 }).await.unwrap(),
        None
    );

    insert_user(&store, "Alice", None, "active", 1.0).await;
    let alice: Option<User> =
        store.query_one("getUserById", &params! { "id" => 1 }).await.unwrap();
    assert_eq!(alice.unwrap().name, "Alice");

    insert_user(&store, "Bob", None, "active", 2.0).await;
    let err = store
        .query_one::<User>("getUserByStatus", &params! { "status" => "active" })
        .await
        .unwrap_err();
    match err {
        Error::MultipleRows { query, count } => {
            assert_eq!(query, "getUserByStatus");
            assert_eq!(count, 2);
        }
        other => panic!("expected MultipleRows, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_parameter_fails_before_reaching_the_database() {
    let store = store().await;
    let err = store
        .raw_query("SELECT * FROM users WHERE id = {id}", &params! {})
        .await
        .unwrap_err();
    match err {
        Error::MissingParameter(name) => assert_eq!(name, "id"),
        other => panic!("expected MissingParameter, got {other:?}"),
    }

    // the same check guards updates; the table stays untouched on failure
    let err = store
        .raw_update("INSERT INTO users (name) VALUES ({name})", &params! { "wrong" => 1 })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingParameter(name) if name == "name"));
    let count: Option<(i64,)> = store.query_one("getUserCount", &params! {}).await.unwrap();
    assert_eq!(count, Some((0,)));
}

#[tokio::test]
async fn repeated_placeholder_receives_the_same_value_twice() {
    let store = store().await;
    insert_user(&store, "same", Some("same"), "active", 1.0).await;
    insert_user(&store, "other", Some("same"), "active", 1.0).await;

    let rows = store
        .raw_query(
            "SELECT * FROM users WHERE name = {v} AND email = {v}",
            &params! { "v" => "same" },
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn null_column_maps_to_none_for_optional_members() {
    let store = store().await;
    insert_user(&store, "Alice", None, "active", 1.0).await;

    let users: Vec<User> = store.query("getUserById", &params! { "id" => 1 }).await.unwrap();
    assert_eq!(users[0].email, None);
    assert_eq!(users[0].created_at, None);
}

#[tokio::test]
async fn null_column_in_raw_rows_has_zero_value_accessors() {
    let store = store().await;
    insert_user(&store, "Alice", None, "active", 1.0).await;

    let rows = store
        .raw_query("SELECT email FROM users WHERE id = {id}", &params! { "id" => 1 })
        .await
        .unwrap();
    let email = rows[0].get("email").unwrap();
    assert!(email.is_null());
    assert_eq!(email.as_str(), "");
    assert_eq!(email.as_i64(), 0);
    assert!(!email.as_bool());
}

#[tokio::test]
async fn null_into_non_optional_member_is_a_mapping_error() {
    #[derive(Debug, sqlx::FromRow)]
    struct StrictUser {
        #[allow(dead_code)]
        id: i64,
        #[allow(dead_code)]
        email: String,
    }

    let store = store().await;
    insert_user(&store, "Alice", None, "active", 1.0).await;

    let err = store
        .query::<StrictUser>("getUserById", &params! { "id" => 1 })
        .await
        .unwrap_err();
    match err {
        Error::Mapping { target, .. } => assert!(target.contains("StrictUser")),
        other => panic!("expected Mapping, got {other:?}"),
    }
}

#[tokio::test]
async fn timestamp_round_trips_through_catalog_queries() {
    let store = store().await;
    let moment = NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(12, 30, 45)
        .unwrap();

    let inserted = store
        .update(
            "insertUserWithTimestamp",
            &params! {
                "name" => "Alice",
                "email" => "alice@example.com",
                "status" => "active",
                "score" => 1.5,
                "created_at" => moment,
            },
        )
        .await
        .unwrap();
    assert_eq!(inserted, Some(true));

    let users: Vec<User> = store.query("getUserById", &params! { "id" => 1 }).await.unwrap();
    assert_eq!(users[0].created_at, Some(moment));

    let rows = store
        .raw_query("SELECT created_at FROM users WHERE id = {id}", &params! { "id" => 1 })
        .await
        .unwrap();
    assert_eq!(rows[0].get("created_at"), Some(&Value::Timestamp(moment)));
}

#[tokio::test]
async fn aliased_aggregate_column_keeps_its_label() {
    let store = store().await;
    insert_user(&store, "Alice", None, "active", 1.0).await;
    insert_user(&store, "Bob", None, "idle", 2.0).await;

    let count: Option<(i64,)> = store.query_one("getUserCount", &params! {}).await.unwrap();
    assert_eq!(count, Some((2,)));

    let rows = store.raw_query("SELECT COUNT(*) AS user_count FROM users", &params! {}).await.unwrap();
    assert_eq!(rows[0].get("user_count"), Some(&Value::BigInt(2)));
}

#[tokio::test]
async fn raw_update_reports_rows_affected() {
    let store = store().await;
    insert_user(&store, "Alice", None, "new", 1.0).await;
    insert_user(&store, "Bob", None, "new", 2.0).await;

    let affected = store
        .raw_update(
            "UPDATE users SET status = {to} WHERE status = {from}",
            &params! { "to" => "seen", "from" => "new" },
        )
        .await
        .unwrap();
    assert_eq!(affected, 2);
}

#[tokio::test]
async fn raw_rows_preserve_projection_order() {
    let store = store().await;
    insert_user(&store, "Alice", Some("a@b.com"), "active", 1.0).await;

    let rows = store
        .raw_query("SELECT score, name, id FROM users WHERE id = {id}", &params! { "id" => 1 })
        .await
        .unwrap();
    let names: Vec<&str> = rows[0].iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["score", "name", "id"]);
    assert_eq!(rows[0].get("score"), Some(&Value::Double(1.0)));
}

#[tokio::test]
async fn pooled_store_executes_named_queries() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let store = SqlStore::with_pool(pool, CATALOG.parse().unwrap());
    store.raw_update(SCHEMA, &params! {}).await.unwrap();

    insert_user(&store, "Alice", None, "active", 1.0).await;
    let users: Vec<User> = store.query("getAllUsers", &params! {}).await.unwrap();
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn cached_connection_reopens_after_close() {
    let store = store().await;
    insert_user(&store, "Alice", None, "active", 1.0).await;
    store.close().await.unwrap();

    // a fresh in-memory database comes back: the schema is gone
    let rows = store
        .raw_query(
            "SELECT name FROM sqlite_master WHERE type = {t} AND name = {n}",
            &params! { "t" => "table", "n" => "users" },
        )
        .await
        .unwrap();
    assert!(rows.is_empty());
}
