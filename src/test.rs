//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::ledger::Ledger;
use crate::model::Category::{Food, Other};
use crate::model::TransactionType::{Expense, Income};
use crate::model::{Category, Transaction, TransactionEntry, TransactionType};
use crate::Config;
use chrono::{DateTime, NaiveDate, Utc};
use tempfile::TempDir;

/// Test environment that sets up a finman home directory with a Config.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with an API key in its config and an empty ledger.
    pub async fn new() -> Self {
        Self::create(Some("test-key")).await
    }

    /// Creates a test environment whose config has no API key.
    pub async fn without_api_key() -> Self {
        Self::create(None).await
    }

    /// Creates a test environment whose ledger holds `sample_transactions()`.
    pub async fn with_sample_ledger() -> Self {
        let env = Self::new().await;
        env.config
            .ledger()
            .persist(&Ledger::new(sample_transactions()))
            .await
            .unwrap();
        env
    }

    async fn create(api_key: Option<&str>) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("finman");
        let config = Config::create(&root, api_key).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Builds a transaction whose timestamp is `id` milliseconds after the epoch.
pub fn transaction(
    id: i64,
    amount: &str,
    kind: TransactionType,
    category: Category,
    day: &str,
) -> Transaction {
    let entry = TransactionEntry::new(amount.parse().unwrap(), date(day))
        .kind(kind)
        .category(category);
    let timestamp = DateTime::<Utc>::from_timestamp_millis(id).unwrap();
    Transaction::new(id, entry, timestamp)
}

/// An income of 100 on 2024-01-05 followed by a Food expense of 40 on 2024-01-10.
pub fn sample_transactions() -> Vec<Transaction> {
    vec![
        transaction(1, "100", Income, Other, "2024-01-05"),
        transaction(2, "40", Expense, Food, "2024-01-10"),
    ]
}
