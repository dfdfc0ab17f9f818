//! Ad-hoc SQL example demonstrating raw queries on a cached connection
//!
//! Run with: cargo run --example adhoc
//!
//! Shows `raw_query`/`raw_update` with `{name}` placeholders, dynamic row
//! values, and why bound values cannot inject SQL.

use sqlstore::{params, QueryRegistry, SqlStore, Value};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());

    // No catalog needed for ad-hoc SQL; the store caches one lazily opened
    // connection for its whole lifetime.
    let store = SqlStore::open(database_url, QueryRegistry::default());

    store
        .raw_update(
            "CREATE TABLE IF NOT EXISTS measurements (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sensor TEXT NOT NULL,
                reading REAL,
                taken_at DATETIME
            )",
            &params! {},
        )
        .await?;

    // Example 1: Inserts with mixed value types
    println!("--- Example 1: Inserting measurements ---");
    let now = chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .expect("valid demo timestamp");
    for (sensor, reading) in [("boiler", Some(71.5)), ("intake", Some(18.2)), ("spare", None)] {
        let affected = store
            .raw_update(
                "INSERT INTO measurements (sensor, reading, taken_at) VALUES ({sensor}, {reading}, {taken_at})",
                &params! { "sensor" => sensor, "reading" => reading, "taken_at" => now },
            )
            .await?;
        println!("Inserted {sensor}: {affected} row(s)");
    }

    // Example 2: Raw rows keep projection order and carry typed values
    println!("\n--- Example 2: Reading raw rows ---");
    let rows = store
        .raw_query(
            "SELECT sensor, reading, taken_at FROM measurements ORDER BY sensor",
            &params! {},
        )
        .await?;
    for row in &rows {
        for (column, value) in row.iter() {
            print!("{column}={value:?}  ");
        }
        println!();
    }

    // Example 3: NULL readings come back as Value::Null with zero-value accessors
    println!("\n--- Example 3: NULL handling ---");
    let spare = rows
        .iter()
        .find(|row| row.get("sensor") == Some(&Value::Text("spare".to_string())))
        .expect("spare sensor inserted above");
    let reading = spare.get("reading").expect("column selected");
    println!("spare reading: is_null={}, as_f64={}", reading.is_null(), reading.as_f64());

    // Example 4: A hostile string binds as data, not as SQL
    println!("\n--- Example 4: Injection safety ---");
    let hostile = "boiler' OR '1'='1";
    let rows = store
        .raw_query(
            "SELECT sensor FROM measurements WHERE sensor = {sensor}",
            &params! { "sensor" => hostile },
        )
        .await?;
    println!("Rows matching {hostile:?}: {} (the value is compared literally)", rows.len());

    // Example 5: Aggregates with aliased columns
    println!("\n--- Example 5: Aggregation ---");
    let rows = store
        .raw_query(
            "SELECT COUNT(*) AS readings, AVG(reading) AS mean FROM measurements WHERE reading > {min}",
            &params! { "min" => 0.0 },
        )
        .await?;
    let summary = &rows[0];
    println!(
        "{} readings above zero, mean {:.1}",
        summary.get("readings").map(Value::as_i64).unwrap_or_default(),
        summary.get("mean").map(Value::as_f64).unwrap_or_default(),
    );

    store.close().await?;
    println!("\nExample completed successfully!");
    Ok(())
}
