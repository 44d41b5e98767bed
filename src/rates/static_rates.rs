//! Implements the `RateSource` trait with a fixed table of rates.
//!
//! Note: this is compiled even in the "production" version of this app so that the converter can
//! be run top-to-bottom without a network connection or an API key.

use crate::rates::{FetchError, RateSnapshot, RateSource};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// A `RateSource` that always answers with the same rates, stamped with the current time.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StaticRates {
    rates: BTreeMap<String, Decimal>,
}

impl StaticRates {
    pub fn new<S>(rates: impl IntoIterator<Item = (S, Decimal)>) -> Self
    where
        S: Into<String>,
    {
        Self {
            rates: rates
                .into_iter()
                .map(|(code, rate)| (code.into(), rate))
                .collect(),
        }
    }
}

impl Default for StaticRates {
    /// Seed rates for the default display currencies.
    fn default() -> Self {
        Self::new([
            ("USD", Decimal::new(1, 0)),
            ("EUR", Decimal::new(92, 2)),
            ("UZS", Decimal::new(1285000, 2)),
            ("RUB", Decimal::new(9250, 2)),
        ])
    }
}

#[async_trait::async_trait]
impl RateSource for StaticRates {
    async fn fetch(&self) -> Result<RateSnapshot, FetchError> {
        Ok(RateSnapshot::new(
            self.rates.iter().map(|(code, rate)| (code, *rate)),
            Utc::now(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_rates_default() {
        let snapshot = StaticRates::default().fetch().await.unwrap();
        assert_eq!(snapshot.rate("USD"), Some(Decimal::ONE));
        assert_eq!(snapshot.rate("EUR"), Some(Decimal::new(92, 2)));
        assert_eq!(snapshot.len(), 4);
    }
}
