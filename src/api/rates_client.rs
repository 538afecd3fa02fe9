// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;

use crate::config::ApiConfig;
use crate::error::{CurrencyError, CurrencyResult, FetchError};
use crate::models::RateTable;

/// Anything that can produce a rate table for a base currency.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self, base: &str) -> CurrencyResult<RateTable>;
}

/// HTTP client for `GET {base_url}/{code}` rate endpoints.
///
/// Every call is a new round trip. There is no retry and no timeout.
#[derive(Clone)]
pub struct ExchangeRateClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ExchangeRateClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(&config.base_url, config.api_key())
    }

    fn rates_url(&self, base: &str) -> String {
        format!("{}/{}", self.base_url, base)
    }
}

#[async_trait]
impl RateSource for ExchangeRateClient {
    async fn fetch_rates(&self, base: &str) -> CurrencyResult<RateTable> {
        let url = self.rates_url(base);
        debug!("Fetching exchange rates from {}", url);

        let mut request = self.client.get(&url);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CurrencyError::fetch(base, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CurrencyError::fetch(base, e))?;

        if !status.is_success() {
            warn!("Rate request for {} failed with {}", base, status);
            return Err(CurrencyError::fetch(
                base,
                FetchError::Status {
                    status: status.as_u16(),
                    body: text,
                },
            ));
        }

        serde_json::from_str::<RateTable>(&text).map_err(|e| {
            warn!("Failed to parse rates for {}: {}", base, e);
            debug!("Raw response: {}", text);
            CurrencyError::fetch(base, e)
        })
    }
}
