//! Helpers for tests that need a real `PostgreSQL` schema.
//!
//! Each [`TestDatabase`] gets its own throwaway database with every
//! accreditation migration applied.

use crate::migrations::Migrator;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use sea_orm_migration::MigratorTrait;
use tracing::info;

/// Tables in child-to-parent order, so truncation never trips a foreign key.
const TABLES: [&str; 6] = [
    "email_log",
    "accreditation",
    "email_template",
    "zone",
    "area",
    "event",
];

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}

/// Connection settings read from `TEST_DB_*`.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
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
            host: env_or("TEST_DB_HOST", "localhost"),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: env_or("TEST_DB_USER", "accreditation_test"),
            password: env_or("TEST_DB_PASSWORD", "accreditation_test"),
            database: env_or("TEST_DB_NAME", "accreditation_test"),
        }
    }
}

impl TestDbConfig {
    fn url_for(&self, database: &str) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{database}",
            self.username, self.password, self.host, self.port
        )
    }

    /// URL of the test database itself.
    #[must_use]
    pub fn database_url(&self) -> String {
        self.url_for(&self.database)
    }

    /// URL of the maintenance database used to create and drop test databases.
    #[must_use]
    pub fn postgres_url(&self) -> String {
        self.url_for("postgres")
    }
}

/// A migrated test database.
#[allow(missing_docs)]
pub struct TestDatabase {
    pub conn: DatabaseConnection,
    pub config: TestDbConfig,
}

impl TestDatabase {
    /// Connect to an existing database and run migrations.
    pub async fn with_config(config: TestDbConfig) -> Result<Self, DbErr> {
        let conn = Database::connect(&config.database_url()).await?;
        Migrator::up(&conn, None).await?;
        Ok(Self { conn, config })
    }

    /// Create a fresh database with a random suffix so tests can run in parallel.
    pub async fn create_unique() -> Result<Self, DbErr> {
        let mut config = TestDbConfig::default();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        config.database = format!("accreditation_test_{}", &suffix[..12]);

        let admin = Database::connect(&config.postgres_url()).await?;
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("CREATE DATABASE \"{}\"", config.database),
            ))
            .await?;
        admin.close().await?;

        info!(database = %config.database, "Created test database");
        Self::with_config(config).await
    }

    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Empty every accreditation table and reset identity sequences.
    pub async fn truncate(&self) -> Result<(), DbErr> {
        let sql = format!(
            "TRUNCATE TABLE {} RESTART IDENTITY CASCADE",
            TABLES
                .iter()
                .map(|t| format!("\"{t}\""))
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, sql))
            .await?;
        Ok(())
    }

    /// Close the connection and drop the database.
    pub async fn drop_database(self) -> Result<(), DbErr> {
        self.conn.close().await?;

        let admin = Database::connect(&self.config.postgres_url()).await?;
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!(
                    "DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)",
                    self.config.database
                ),
            ))
            .await?;
        admin.close().await?;

        info!(database = %self.config.database, "Dropped test database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_share_credentials() {
        let config = TestDbConfig {
            host: "db".to_string(),
            port: 5433,
            username: "user".to_string(),
            password: "pass".to_string(),
            database: "acc".to_string(),
        };
        assert_eq!(config.database_url(), "postgres://user:pass@db:5433/acc");
        assert_eq!(config.postgres_url(), "postgres://user:pass@db:5433/postgres");
    }

    #[test]
    fn test_truncate_order_ends_with_event() {
        assert_eq!(TABLES.first(), Some(&"email_log"));
        assert_eq!(TABLES.last(), Some(&"event"));
    }
}
