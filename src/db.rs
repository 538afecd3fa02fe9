// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

pub mod store;

pub use store::{KeyValueStore, SqliteStore};
#[cfg(test)]
pub use store::MemoryStore;

use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePool, Sqlite};

/// Open the favorites database at `db_url`, creating the file and the
/// `key_value_store` table on first use.
pub async fn create_db_pool(db_url: &str) -> Result<SqlitePool> {
    let exists = Sqlite::database_exists(db_url).await.unwrap_or(false);
    if !exists {
        log::info!("Creating favorites database at {}", db_url);
        Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePool::connect(db_url).await?;
    migrate(&pool).await?;
    Ok(pool)
}

async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!().run(pool).await?;
    Ok(())
}

/// In-memory database on a single long-lived connection, so every query
/// sees the same schema.
#[cfg(test)]
pub async fn create_test_pool() -> Result<SqlitePool> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<std::time::Duration>)
        .max_lifetime(None::<std::time::Duration>)
        .connect("sqlite::memory:")
        .await?;
    migrate(&pool).await?;
    Ok(pool)
}
