// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::{bail, Context, Result};
use chrono::Local;
use csv::Writer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::RateSource;
use crate::error::{CurrencyError, CurrencyResult};

/// One provider response: multipliers from `base` to every listed code.
///
/// Built fresh on every fetch and never cached. Only `base` and `rates` are
/// typed; `date` and `time_last_updated` are kept as whatever JSON the
/// provider sent, and anything else ends up in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub base: String,
    pub rates: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_last_updated: Option<Value>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl RateTable {
    #[cfg(test)]
    pub fn new(base: &str, rates: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            base: base.to_string(),
            rates: rates.into_iter().collect(),
            date: None,
            time_last_updated: None,
            extra: HashMap::new(),
        }
    }

    /// Provider date when it was sent as a string
    pub fn date(&self) -> Option<&str> {
        self.date.as_ref().and_then(Value::as_str)
    }

    /// Rate from the base currency to `code`
    pub fn rate(&self, code: &str) -> CurrencyResult<f64> {
        self.rates
            .get(code)
            .copied()
            .ok_or_else(|| CurrencyError::RateUnavailable {
                base: self.base.clone(),
                target: code.to_string(),
            })
    }
}

/// Convert `amount` of `from` into `to` using a freshly fetched table.
///
/// No rounding is applied here.
pub async fn convert<S>(source: &S, amount: f64, from: &str, to: &str) -> CurrencyResult<f64>
where
    S: RateSource + ?Sized,
{
    let table = source.fetch_rates(from).await?;
    let rate = table.rate(to)?;
    Ok(amount * rate)
}

/// Export a rate table to a timestamped CSV file inside `output_dir`.
///
/// The file is named after `code`, the currency the rates were requested
/// for, with anything but ASCII letters and digits dropped.
pub fn export_rates_csv(table: &RateTable, code: &str, output_dir: &Path) -> Result<PathBuf> {
    let code: String = code.chars().filter(char::is_ascii_alphanumeric).collect();
    if code.is_empty() {
        bail!("Cannot name an export without a currency code");
    }
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = output_dir.join(format!("rates_{}_{}.csv", code, timestamp));
    let mut writer = Writer::from_path(&path)?;

    writer.write_record(["Base Currency", "Quote Currency", "Rate", "Date"])?;

    let date = table.date().unwrap_or_default();
    for (code, rate) in &table.rates {
        writer.write_record([
            table.base.as_str(),
            code.as_str(),
            rate.to_string().as_str(),
            date,
        ])?;
    }

    writer.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves one fixed table for every base and counts fetches.
    struct StubRates {
        table: RateTable,
        calls: AtomicUsize,
    }

    impl StubRates {
        fn new(base: &str, rates: &[(&str, f64)]) -> Self {
            Self {
                table: RateTable::new(base, rates.iter().map(|(c, r)| (c.to_string(), *r))),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RateSource for StubRates {
        async fn fetch_rates(&self, _base: &str) -> CurrencyResult<RateTable> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.table.clone())
        }
    }

    #[tokio::test]
    async fn test_convert_usd_to_eur() -> Result<()> {
        let stub = StubRates::new("USD", &[("EUR", 0.9)]);

        let result = convert(&stub, 10.0, "USD", "EUR").await?;
        assert_relative_eq!(result, 9.0, epsilon = 1e-12);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_convert_same_currency_uses_self_rate() -> Result<()> {
        let stub = StubRates::new("USD", &[("USD", 1.0), ("EUR", 0.9)]);

        let result = convert(&stub, 42.5, "USD", "USD").await?;
        assert_eq!(result, 42.5);

        Ok(())
    }

    #[tokio::test]
    async fn test_convert_does_not_round() -> Result<()> {
        let stub = StubRates::new("USD", &[("JPY", 151.234567)]);

        let result = convert(&stub, 3.0, "USD", "JPY").await?;
        assert_relative_eq!(result, 453.703701, epsilon = 1e-9);

        Ok(())
    }

    #[tokio::test]
    async fn test_convert_missing_target_is_rate_unavailable() {
        let stub = StubRates::new("USD", &[("EUR", 0.9)]);

        let err = convert(&stub, 10.0, "USD", "XYZ").await.unwrap_err();
        match err {
            CurrencyError::RateUnavailable { base, target } => {
                assert_eq!(base, "USD");
                assert_eq!(target, "XYZ");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_every_conversion_refetches() -> Result<()> {
        let stub = StubRates::new("USD", &[("EUR", 0.9), ("GBP", 0.8)]);

        convert(&stub, 1.0, "USD", "EUR").await?;
        convert(&stub, 1.0, "USD", "EUR").await?;
        convert(&stub, 1.0, "USD", "GBP").await?;
        assert_eq!(stub.calls.load(Ordering::SeqCst), 3);

        Ok(())
    }

    #[test]
    fn test_rate_table_keeps_provider_fields() {
        let body = r#"{
            "provider": "https://www.exchangerate-api.com",
            "base": "USD",
            "date": "2025-01-10",
            "time_last_updated": 1736467201,
            "rates": {"USD": 1, "EUR": 0.971, "GBP": 0.813}
        }"#;

        let table: RateTable = serde_json::from_str(body).unwrap();
        assert_eq!(table.base, "USD");
        assert_eq!(table.date(), Some("2025-01-10"));
        assert_eq!(table.time_last_updated, Some(Value::from(1736467201)));
        assert_eq!(table.rates.len(), 3);
        assert_relative_eq!(table.rate("EUR").unwrap(), 0.971);
        assert_eq!(
            table.extra.get("provider").and_then(|v| v.as_str()),
            Some("https://www.exchangerate-api.com")
        );
    }

    #[test]
    fn test_rate_table_accepts_loosely_typed_timestamps() {
        let textual = r#"{"base":"USD","rates":{"EUR":0.9},"time_last_updated":"Fri, 10 Jan 2025 00:00:01 +0000"}"#;
        let table: RateTable = serde_json::from_str(textual).unwrap();
        assert_relative_eq!(table.rate("EUR").unwrap(), 0.9);
        assert_eq!(
            table.time_last_updated.as_ref().and_then(Value::as_str),
            Some("Fri, 10 Jan 2025 00:00:01 +0000")
        );

        let fractional = r#"{"base":"USD","rates":{"EUR":0.9},"time_last_updated":1736467201.5,"date":20250110}"#;
        let table: RateTable = serde_json::from_str(fractional).unwrap();
        assert_relative_eq!(table.rate("EUR").unwrap(), 0.9);
        assert_eq!(
            table.time_last_updated.as_ref().and_then(Value::as_f64),
            Some(1736467201.5)
        );
        // A non-string date is kept but not shown as one
        assert_eq!(table.date(), None);
    }

    #[test]
    fn test_export_rates_csv() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut table = RateTable::new(
            "EUR",
            [("USD".to_string(), 1.08), ("GBP".to_string(), 0.85)],
        );
        table.date = Some(Value::from("2025-01-10"));

        let path = export_rates_csv(&table, "EUR", dir.path())?;
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("rates_EUR_"));

        let mut reader = csv::Reader::from_path(&path)?;
        let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
        assert_eq!(rows.len(), 2);
        // BTreeMap keeps quote codes sorted
        assert_eq!(&rows[0][1], "GBP");
        assert_eq!(&rows[1][1], "USD");
        assert_eq!(&rows[1][2], "1.08");
        assert_eq!(&rows[1][3], "2025-01-10");

        Ok(())
    }

    #[test]
    fn test_export_name_ignores_provider_base() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let output = dir.path().join("output");
        let table = RateTable::new("../../etc/x", [("USD".to_string(), 1.0)]);

        let path = export_rates_csv(&table, "EUR", &output)?;
        assert_eq!(path.parent(), Some(output.as_path()));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("rates_EUR_"));

        let path = export_rates_csv(&table, "../G/B\\P", &output)?;
        assert_eq!(path.parent(), Some(output.as_path()));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("rates_GBP_"));

        assert!(export_rates_csv(&table, "../", &output).is_err());
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_convert_is_amount_times_rate(amount in 0.000_001f64..1.0e12, rate in 0.000_001f64..1.0e6) {
            let stub = StubRates::new("AAA", &[("BBB", rate)]);
            let result = futures::executor::block_on(convert(&stub, amount, "AAA", "BBB")).unwrap();
            prop_assert_eq!(result, amount * rate);
        }
    }
}
