//! Exchange rates: fetching them, keeping the latest snapshot, polling, and converting amounts.
//!
//! All rates are relative to USD, so converting between any two currencies goes through USD:
//! `(amount / rate[from]) * rate[to]`.

mod exchange_rate_api;
mod poller;
mod static_rates;

use crate::error::Res;
use anyhow::bail;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};

pub use exchange_rate_api::ExchangeRateApi;
pub use poller::{start_polling, PollHandle, PollState};
pub use static_rates::StaticRates;

/// The currency every rate in a snapshot is relative to.
pub const BASE_CURRENCY: &str = "USD";

/// The currencies shown in the rates table unless the configuration says otherwise.
pub const DEFAULT_CURRENCIES: [&str; 4] = ["USD", "EUR", "UZS", "RUB"];

/// When this environment variable is set and non-empty, built-in rates are used instead of the
/// network.
pub const OFFLINE_ENV: &str = "FINMAN_OFFLINE_RATES";

/// The most recently fetched table of rates.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    rates: BTreeMap<String, Decimal>,
    fetched_at: DateTime<Utc>,
}

impl RateSnapshot {
    pub fn new<S>(rates: impl IntoIterator<Item = (S, Decimal)>, fetched_at: DateTime<Utc>) -> Self
    where
        S: AsRef<str>,
    {
        Self {
            rates: rates
                .into_iter()
                .map(|(code, rate)| (code.as_ref().to_ascii_uppercase(), rate))
                .collect(),
            fetched_at,
        }
    }

    /// The rate of `code` against USD, if the snapshot has one.
    pub fn rate(&self, code: &str) -> Option<Decimal> {
        self.rates.get(&code.trim().to_ascii_uppercase()).copied()
    }

    pub fn rates(&self) -> &BTreeMap<String, Decimal> {
        &self.rates
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Converts `amount` of `from` into `to`. Returns `None` when either rate is missing from the
/// snapshot, or when the `from` rate is zero.
pub fn convert(amount: Decimal, from: &str, to: &str, snapshot: &RateSnapshot) -> Option<Decimal> {
    let from_rate = snapshot.rate(from)?;
    let to_rate = snapshot.rate(to)?;
    amount.checked_div(from_rate)?.checked_mul(to_rate)
}

/// Why a fetch of the rate table failed. The previous snapshot is always kept when this happens.
#[derive(Clone, Eq, PartialEq)]
pub enum FetchError {
    /// The request could not be sent or the response could not be read.
    Transport(String),
    /// The response body was not the expected JSON shape.
    Malformed(String),
    /// The service answered, but with something other than `"result": "success"`.
    Rejected(String),
}

impl Debug for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Transport(e) => write!(f, "Error fetching exchange rates: {e}"),
            FetchError::Malformed(e) => {
                write!(f, "Failed to fetch exchange rates: unexpected response ({e})")
            }
            FetchError::Rejected(reason) => write!(f, "Failed to fetch exchange rates: {reason}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Something that can produce a fresh `RateSnapshot`.
#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self) -> Result<RateSnapshot, FetchError>;
}

/// Holds the latest snapshot from a `RateSource`.
pub struct RateProvider {
    source: Box<dyn RateSource>,
    snapshot: Option<RateSnapshot>,
}

impl RateProvider {
    pub fn new(source: Box<dyn RateSource>) -> Self {
        Self {
            source,
            snapshot: None,
        }
    }

    /// The latest successfully fetched snapshot, if any.
    pub fn snapshot(&self) -> Option<&RateSnapshot> {
        self.snapshot.as_ref()
    }

    /// Fetches a new snapshot and replaces the current one with it. On failure the current
    /// snapshot is left as it was.
    pub async fn refresh(&mut self) -> Result<&RateSnapshot, FetchError> {
        let fresh = self.source.fetch().await?;
        Ok(&*self.snapshot.insert(fresh))
    }

    /// Converts using the latest snapshot. `None` until a fetch has succeeded.
    pub fn convert(&self, amount: Decimal, from: &str, to: &str) -> Option<Decimal> {
        convert(amount, from, to, self.snapshot()?)
    }
}

/// Where rates come from.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    /// The exchangerate-api.com service.
    Live,
    /// The built-in `StaticRates`.
    Offline,
}

impl Mode {
    /// `Mode::Offline` when `FINMAN_OFFLINE_RATES` is set and non-empty, otherwise `Mode::Live`.
    pub fn from_env() -> Self {
        match std::env::var(OFFLINE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Offline,
            _ => Mode::Live,
        }
    }
}

/// Creates the `RateSource` for `mode`. Live rates need an API key.
pub fn rate_source(mode: Mode, api_key: Option<&str>) -> Res<Box<dyn RateSource>> {
    match mode {
        Mode::Offline => Ok(Box::new(StaticRates::default())),
        Mode::Live => match api_key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => Ok(Box::new(ExchangeRateApi::new(key)?)),
            None => bail!(
                "No exchange rate API key is configured. Pass --api-key, set FINMAN_API_KEY, or \
                add \"api_key\" to config.json"
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn snapshot(rates: &[(&str, &str)]) -> RateSnapshot {
        RateSnapshot::new(rates.iter().map(|(c, r)| (*c, dec(r))), Utc::now())
    }

    #[test]
    fn test_convert_usd_to_eur() {
        let s = snapshot(&[("USD", "1"), ("EUR", "0.9")]);
        assert_eq!(convert(dec("100"), "USD", "EUR", &s), Some(dec("90")));
    }

    #[test]
    fn test_convert_cross_rate() {
        let s = snapshot(&[("USD", "1"), ("EUR", "0.5"), ("RUB", "90")]);
        assert_eq!(convert(dec("10"), "EUR", "RUB", &s), Some(dec("1800")));
        assert_eq!(convert(dec("10"), "eur", "rub", &s), Some(dec("1800")));
    }

    #[test]
    fn test_convert_missing_rate() {
        let s = snapshot(&[("USD", "1")]);
        assert_eq!(convert(dec("100"), "USD", "XYZ", &s), None);
        assert_eq!(convert(dec("100"), "XYZ", "USD", &s), None);
    }

    #[test]
    fn test_convert_zero_rate() {
        let s = snapshot(&[("USD", "1"), ("BAD", "0")]);
        assert_eq!(convert(dec("100"), "BAD", "USD", &s), None);
    }

    #[tokio::test]
    async fn test_provider_keeps_snapshot_on_failure() {
        struct Flaky(std::sync::atomic::AtomicUsize);

        #[async_trait::async_trait]
        impl RateSource for Flaky {
            async fn fetch(&self) -> Result<RateSnapshot, FetchError> {
                let n = self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                if n == 0 {
                    Ok(RateSnapshot::new([("USD", Decimal::ONE)], Utc::now()))
                } else {
                    Err(FetchError::Transport("connection reset".into()))
                }
            }
        }

        let mut provider = RateProvider::new(Box::new(Flaky(0.into())));
        assert!(provider.snapshot().is_none());
        assert_eq!(provider.convert(Decimal::ONE, "USD", "USD"), None);

        provider.refresh().await.unwrap();
        let first = provider.snapshot().cloned().unwrap();

        let err = provider.refresh().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error fetching exchange rates: connection reset"
        );
        assert_eq!(provider.snapshot(), Some(&first));
        assert_eq!(
            provider.convert(dec("3"), "USD", "USD"),
            Some(dec("3"))
        );
    }

    #[test]
    fn test_rate_source_requires_key() {
        assert!(rate_source(Mode::Live, None).is_err());
        assert!(rate_source(Mode::Live, Some("  ")).is_err());
        assert!(rate_source(Mode::Live, Some("abc123")).is_ok());
        assert!(rate_source(Mode::Offline, None).is_ok());
    }
}
