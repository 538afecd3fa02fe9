// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::currencies::CurrencyRecord;
use crate::db::KeyValueStore;
use crate::error::{CurrencyError, CurrencyResult};

/// Storage key holding the favorites document.
pub const FAVORITES_KEY: &str = "favoriteCurrencies";

/// How `add_favorite` decides that a record is already present.
///
/// `remove_favorite` always matches by code. With `WholeRecord` two records
/// sharing a code but differing in another field are both admitted, yet a
/// single removal drops both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    #[default]
    WholeRecord,
    Code,
}

/// What listing does when the stored document cannot be read or parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorruptReadPolicy {
    /// Log and behave as if nothing was stored. The next write replaces the
    /// unreadable document.
    #[default]
    FallbackToEmpty,
    Fail,
}

/// Favorite currencies persisted as one JSON array under [`FAVORITES_KEY`].
///
/// Every mutation reads the whole list and writes the whole list back with no
/// lock, so concurrent writers can lose updates.
pub struct FavoritesStore<S> {
    store: S,
    duplicates: DuplicatePolicy,
    on_corrupt: CorruptReadPolicy,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            duplicates: DuplicatePolicy::default(),
            on_corrupt: CorruptReadPolicy::default(),
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    pub fn with_corrupt_read_policy(mut self, policy: CorruptReadPolicy) -> Self {
        self.on_corrupt = policy;
        self
    }

    /// Read the stored list, surfacing storage and parse failures.
    pub async fn try_list_favorites(&self) -> CurrencyResult<Vec<CurrencyRecord>> {
        match self.store.get_item(FAVORITES_KEY).await? {
            None => Ok(Vec::new()),
            Some(document) => {
                serde_json::from_str(&document).map_err(CurrencyError::CorruptFavorites)
            }
        }
    }

    /// Read the stored list, applying the corrupt-read policy to failures.
    pub async fn list_favorites(&self) -> CurrencyResult<Vec<CurrencyRecord>> {
        match self.try_list_favorites().await {
            Ok(favorites) => Ok(favorites),
            Err(e) if self.on_corrupt == CorruptReadPolicy::FallbackToEmpty => {
                warn!("Error getting favorite currencies, using an empty list: {}", e);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn add_favorite(&self, record: &CurrencyRecord) -> CurrencyResult<()> {
        let mut favorites = self.list_favorites().await?;
        if favorites.iter().any(|favorite| self.is_duplicate(favorite, record)) {
            debug!("{} is already a favorite", record.code);
            return Ok(());
        }
        favorites.push(record.clone());
        self.save(&favorites).await
    }

    /// Remove every favorite with `code`, returning how many were dropped
    pub async fn remove_favorite(&self, code: &str) -> CurrencyResult<usize> {
        let mut favorites = self.list_favorites().await?;
        let before = favorites.len();
        favorites.retain(|favorite| favorite.code != code);
        self.save(&favorites).await?;
        Ok(before - favorites.len())
    }

    pub async fn is_favorite(&self, code: &str) -> CurrencyResult<bool> {
        let favorites = self.list_favorites().await?;
        Ok(favorites.iter().any(|favorite| favorite.code == code))
    }

    /// Remove `record` if its code is a favorite, add it otherwise.
    /// Returns whether it is a favorite afterwards.
    pub async fn toggle_favorite(&self, record: &CurrencyRecord) -> CurrencyResult<bool> {
        if self.is_favorite(&record.code).await? {
            self.remove_favorite(&record.code).await?;
            Ok(false)
        } else {
            self.add_favorite(record).await?;
            Ok(true)
        }
    }

    fn is_duplicate(&self, existing: &CurrencyRecord, candidate: &CurrencyRecord) -> bool {
        match self.duplicates {
            DuplicatePolicy::WholeRecord => existing == candidate,
            DuplicatePolicy::Code => existing.code == candidate.code,
        }
    }

    async fn save(&self, favorites: &[CurrencyRecord]) -> CurrencyResult<()> {
        let document = serde_json::to_string(favorites).map_err(CurrencyError::Encode)?;
        self.store.set_item(FAVORITES_KEY, &document).await
    }
}
