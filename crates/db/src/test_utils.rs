//! Helpers for tests that talk to a real `PostgreSQL`.

use std::sync::Arc;

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::migrations::Migrator;

/// Tables truncated between tests.
const TABLES: [&str; 3] = ["post_like", "comment", "post"];

/// Test database configuration.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: std::env::var("TEST_DB_USER").unwrap_or_else(|_| "posts_test".to_string()),
            password: std::env::var("TEST_DB_PASSWORD")
                .unwrap_or_else(|_| "posts_test".to_string()),
            database: std::env::var("TEST_DB_NAME").unwrap_or_else(|_| "posts_test".to_string()),
        }
    }
}

impl TestDbConfig {
    /// Connection URL for the test database.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }
}

/// A migrated test database.
///
/// The connection is shared so repositories can hold it alongside the
/// fixture.
pub struct TestDatabase {
    pub conn: Arc<DatabaseConnection>,
    pub config: TestDbConfig,
}

impl TestDatabase {
    /// Connect with the default configuration and run migrations.
    pub async fn new() -> Result<Self, DbErr> {
        Self::with_config(TestDbConfig::default()).await
    }

    /// Connect with a custom configuration and run migrations.
    pub async fn with_config(config: TestDbConfig) -> Result<Self, DbErr> {
        let conn = Database::connect(&config.database_url()).await?;
        Migrator::up(&conn, None).await?;

        info!(database = %config.database, "Connected to test database");

        Ok(Self {
            conn: Arc::new(conn),
            config,
        })
    }

    /// Shared handle to the connection, ready to pass to a repository.
    #[must_use]
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Truncate every table owned by this crate.
    pub async fn cleanup(&self) -> Result<(), DbErr> {
        for table in TABLES {
            self.conn
                .execute(Statement::from_string(
                    DatabaseBackend::Postgres,
                    format!("TRUNCATE TABLE \"{table}\" RESTART IDENTITY"),
                ))
                .await?;
        }
        Ok(())
    }
}
