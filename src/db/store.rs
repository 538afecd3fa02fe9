// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;

use crate::error::CurrencyResult;

/// String values stored under string keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> CurrencyResult<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> CurrencyResult<()>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get_item(&self, key: &str) -> CurrencyResult<Option<String>> {
        self.as_ref().get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> CurrencyResult<()> {
        self.as_ref().set_item(key, value).await
    }
}

/// Key/value storage in the `key_value_store` table.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get_item(&self, key: &str) -> CurrencyResult<Option<String>> {
        let record = sqlx::query_as::<_, (String,)>(
            r#"
            SELECT value
            FROM key_value_store
            WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(|(value,)| value))
    }

    async fn set_item(&self, key: &str, value: &str) -> CurrencyResult<()> {
        sqlx::query(
            r#"
            INSERT INTO key_value_store (key, value)
            VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    items: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> CurrencyResult<Option<String>> {
        Ok(self.items.lock().unwrap().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> CurrencyResult<()> {
        self.items
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
