//! Basic example demonstrating named queries from a catalog file
//!
//! Run with: cargo run --example basic
//!
//! Uses an in-memory SQLite database by default; point DATABASE_URL at a
//! SQLite database to run against a file:
//! export DATABASE_URL="sqlite://demo.db?mode=rwc"

use sqlstore::{params, QueryRegistry, SqlStore};
use sqlx::sqlite::SqlitePoolOptions;

#[derive(Debug, sqlx::FromRow)]
struct User {
    id: i64,
    name: String,
    email: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());

    println!("Loading query catalog...");
    let registry = QueryRegistry::load(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/queries.sql"))?;
    println!("Loaded {} query definitions", registry.len());

    println!("Connecting to {database_url}...");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;
    let store = SqlStore::with_pool(pool, registry);

    store
        .raw_update(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT UNIQUE
            )",
            &params! {},
        )
        .await?;

    // Example 1: Insert through named queries
    println!("\n--- Example 1: Inserting users ---");
    for (name, email) in [
        ("Alice", "alice@example.com"),
        ("Bob", "bob@example.com"),
        ("Charlie", "charlie@example.com"),
    ] {
        let inserted = store
            .update("insertUser", &params! { "name" => name, "email" => email })
            .await?;
        println!("Inserted user '{name}': {inserted:?}");
    }

    // Example 2: Fetch all users, typed
    println!("\n--- Example 2: Fetching all users ---");
    let users: Vec<User> = store.query("getAllUsers", &params! {}).await?;
    println!("Found {} users:", users.len());
    for user in &users {
        println!("  - {} (id={}, email={:?})", user.name, user.id, user.email);
    }

    // Example 3: Same name, different parameter signature
    println!("\n--- Example 3: Signature-based resolution ---");
    let by_id: Option<User> = store.query_one("getUserById", &params! { "id" => 1 }).await?;
    println!("By id 1: {by_id:?}");
    let by_email: Option<User> = store
        .query_one("getUserByEmail", &params! { "email" => "bob@example.com" })
        .await?;
    println!("By email bob@example.com: {by_email:?}");

    // Example 4: Tri-state update result
    println!("\n--- Example 4: Updating users ---");
    let renamed = store
        .update(
            "renameUser",
            &params! { "name" => "Robert", "email" => "bob@example.com" },
        )
        .await?;
    println!("Renaming bob@example.com: {renamed:?}");
    let renamed = store
        .update(
            "renameUser",
            &params! { "name" => "Nobody", "email" => "missing@example.com" },
        )
        .await?;
    println!("Renaming missing@example.com: {renamed:?} (zero rows)");
    let renamed = store.update("renameEveryone", &params! { "name" => "X" }).await?;
    println!("Unknown query name: {renamed:?} (not found)");

    // Example 5: Delete
    println!("\n--- Example 5: Deleting a user ---");
    let deleted = store
        .update("deleteUser", &params! { "email" => "charlie@example.com" })
        .await?;
    println!("Deleted charlie@example.com: {deleted:?}");

    let users: Vec<User> = store.query("getAllUsers", &params! {}).await?;
    println!("\nRemaining {} users:", users.len());
    for user in &users {
        println!("  - {} (id={}, email={:?})", user.name, user.id, user.email);
    }

    println!("\nExample completed successfully!");
    Ok(())
}
