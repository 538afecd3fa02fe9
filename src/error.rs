// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use thiserror::Error;

/// Why a rate table could not be obtained from the provider.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse rates response: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CurrencyError {
    #[error("failed to fetch exchange rates for {base}: {source}")]
    Fetch {
        base: String,
        #[source]
        source: FetchError,
    },

    #[error("no rate available for {base}/{target}")]
    RateUnavailable { base: String, target: String },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// The stored favorites document is not a JSON array of currency records.
    #[error("stored favorites are not a valid currency list: {0}")]
    CorruptFavorites(#[source] serde_json::Error),

    #[error("failed to encode favorites: {0}")]
    Encode(#[source] serde_json::Error),
}

pub type CurrencyResult<T> = Result<T, CurrencyError>;

impl CurrencyError {
    pub fn fetch(base: &str, source: impl Into<FetchError>) -> Self {
        CurrencyError::Fetch {
            base: base.to_string(),
            source: source.into(),
        }
    }
}
