//! Database configuration module for the ledger.
//!
//! This module resolves which `SQLite` database to open, establishes the
//! `SeaORM` connection and creates the `records` table. The table is declared
//! with explicit SQL rather than generated from the entity because the id
//! column must be `INTEGER PRIMARY KEY AUTOINCREMENT`: ids are never reused
//! after a delete, and a full reset rewinds them through `sqlite_sequence`.

use crate::config::settings::Settings;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
use tracing::{debug, info};

/// Environment variable that overrides the configured database URL.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

const CREATE_RECORDS_TABLE: &str = "CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    amount INTEGER NOT NULL,
    meal_ticket INTEGER NOT NULL DEFAULT 0,
    category TEXT NOT NULL,
    note TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
)";

/// Gets the database URL from the `DATABASE_URL` environment variable,
/// falling back to the one in the settings file.
#[must_use]
pub fn resolve_database_url(settings: &Settings) -> String {
    std::env::var(DATABASE_URL_ENV).unwrap_or_else(|_| settings.database_url.clone())
}

/// Establishes a connection to the `SQLite` database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Opening ledger database at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates the `records` table if it does not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    db.execute_unprepared(CREATE_RECORDS_TABLE).await?;
    info!("Ledger table ensured.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Record, RecordModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let rows: Vec<RecordModel> = Record::find().limit(1).all(&db).await?;
        assert!(rows.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[test]
    fn test_resolve_database_url_falls_back_to_settings() {
        // Only meaningful when the variable is absent from the test environment
        if std::env::var(DATABASE_URL_ENV).is_err() {
            let settings = Settings::default();
            assert_eq!(resolve_database_url(&settings), settings.database_url);
        }
    }
}
