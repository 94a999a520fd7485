//! MySQL-backed data source test.
//!
//! Needs a reachable MySQL server; run with
//! `TEST_DB_HOST=... TEST_DB_NAME=... TEST_DB_USER=... TEST_DB_PASS=... cargo test -- --ignored`.

use table_page::{
    config::DatabaseConfig,
    database::{setup_database, MySqlTableSource, TableSource},
};

fn test_database_config() -> DatabaseConfig {
    let var = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.to_string());

    DatabaseConfig {
        host: var("TEST_DB_HOST", "127.0.0.1"),
        port: var("TEST_DB_PORT", "3306").parse().unwrap_or(3306),
        name: var("TEST_DB_NAME", "table_page_test"),
        user: var("TEST_DB_USER", "root"),
        password: var("TEST_DB_PASS", ""),
        charset: "utf8mb4".to_string(),
        max_connections: 2,
        acquire_timeout_secs: 5,
    }
}

#[tokio::test]
#[ignore = "requires a running MySQL server"]
async fn test_fetches_seeded_rows_from_mysql() {
    let pool = setup_database(&test_database_config());

    sqlx::query("DROP TABLE IF EXISTS test")
        .execute(&pool)
        .await
        .expect("Failed to drop test table");
    sqlx::query("CREATE TABLE test (id INT PRIMARY KEY, name VARCHAR(255) NOT NULL)")
        .execute(&pool)
        .await
        .expect("Failed to create test table");
    sqlx::query(
        "INSERT INTO test (id, name) VALUES \
         (1, 'optimy'), (2, 'Social impact'), (3, 'Sustainability'), (4, 'Philanthropy')",
    )
    .execute(&pool)
    .await
    .expect("Failed to seed test table");

    let rows = MySqlTableSource::new(pool.clone())
        .fetch_rows()
        .await
        .expect("Failed to fetch rows");

    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["optimy", "Social impact", "Sustainability", "Philanthropy"]);
    assert_eq!(rows[0].id, 1);
}

#[tokio::test]
#[ignore = "requires a running MySQL server"]
async fn test_missing_table_is_unavailable() {
    let pool = setup_database(&test_database_config());
    sqlx::query("DROP TABLE IF EXISTS test")
        .execute(&pool)
        .await
        .expect("Failed to drop test table");

    let err = MySqlTableSource::new(pool).fetch_rows().await.unwrap_err();
    assert!(err.message().contains("test"));
}

#[tokio::test]
#[ignore = "requires a running MySQL server"]
async fn test_null_and_numeric_names_still_render() {
    let pool = setup_database(&test_database_config());

    sqlx::query("DROP TABLE IF EXISTS test")
        .execute(&pool)
        .await
        .expect("Failed to drop test table");
    sqlx::query("CREATE TABLE test (id INT PRIMARY KEY, name VARCHAR(255) NULL)")
        .execute(&pool)
        .await
        .expect("Failed to create test table");
    sqlx::query("INSERT INTO test (id, name) VALUES (1, 'optimy'), (2, NULL)")
        .execute(&pool)
        .await
        .expect("Failed to seed test table");

    let rows = MySqlTableSource::new(pool.clone())
        .fetch_rows()
        .await
        .expect("NULL name should not fail the page");
    assert_eq!(rows[0].name, "optimy");
    assert_eq!(rows[1].name, "");

    sqlx::query("DROP TABLE test")
        .execute(&pool)
        .await
        .expect("Failed to drop test table");
    sqlx::query("CREATE TABLE test (id INT PRIMARY KEY, name BIGINT)")
        .execute(&pool)
        .await
        .expect("Failed to create numeric test table");
    sqlx::query("INSERT INTO test (id, name) VALUES (7, 42)")
        .execute(&pool)
        .await
        .expect("Failed to seed numeric test table");

    let rows = MySqlTableSource::new(pool)
        .fetch_rows()
        .await
        .expect("numeric name should not fail the page");
    assert_eq!(rows[0].name, "42");
}
