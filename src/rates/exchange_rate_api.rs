//! Implements the `RateSource` trait against the exchangerate-api.com v6 "latest" endpoint.

use crate::error::Res;
use crate::rates::{FetchError, RateSnapshot, RateSource, BASE_CURRENCY};
use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{trace, warn};
use url::Url;

const API_ROOT: &str = "https://v6.exchangerate-api.com/v6";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const SUCCESS: &str = "success";

/// Fetches USD-based rates from `GET {API_ROOT}/{api_key}/latest/USD`.
pub struct ExchangeRateApi {
    client: reqwest::Client,
    url: Url,
}

impl ExchangeRateApi {
    pub fn new(api_key: &str) -> Res<Self> {
        let url = latest_url(api_key)?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Unable to create the HTTP client")?;
        Ok(Self { client, url })
    }
}

#[async_trait::async_trait]
impl RateSource for ExchangeRateApi {
    async fn fetch(&self) -> Result<RateSnapshot, FetchError> {
        // The API key is part of the URL, so reqwest errors are stripped of it before display.
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;
        trace!("Rate feed answered {status} with {} bytes", body.len());
        parse_latest(&body, Utc::now())
    }
}

/// Builds the endpoint URL, percent-encoding the key as a path segment.
fn latest_url(api_key: &str) -> Res<Url> {
    let mut url = Url::parse(API_ROOT).context("Invalid exchange rate API root")?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("The exchange rate API root cannot have path segments"))?
        .pop_if_empty()
        .extend([api_key, "latest", BASE_CURRENCY]);
    Ok(url)
}

/// The parts of the "latest" response body that are used.
///
/// Success:
/// ```json
/// { "result": "success", "base_code": "USD", "conversion_rates": { "USD": 1, "EUR": 0.9013 } }
/// ```
///
/// Failure:
/// ```json
/// { "result": "error", "error-type": "invalid-key" }
/// ```
#[derive(Debug, Deserialize)]
struct LatestResponse {
    result: String,
    #[serde(default, rename = "error-type")]
    error_type: Option<String>,
    #[serde(default)]
    conversion_rates: Option<BTreeMap<String, f64>>,
}

/// Turns a response body into a snapshot stamped with `fetched_at`.
fn parse_latest(body: &str, fetched_at: DateTime<Utc>) -> Result<RateSnapshot, FetchError> {
    let response: LatestResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    if response.result != SUCCESS {
        let reason = response
            .error_type
            .unwrap_or_else(|| format!("result was '{}'", response.result));
        return Err(FetchError::Rejected(reason));
    }

    let raw = response
        .conversion_rates
        .ok_or_else(|| FetchError::Malformed("missing conversion_rates".to_string()))?;

    let mut rates = Vec::with_capacity(raw.len());
    for (code, value) in raw {
        match Decimal::from_f64(value) {
            Some(rate) if rate > Decimal::ZERO => rates.push((code, rate)),
            _ => warn!("Ignoring unusable rate {value} for {code}"),
        }
    }
    if rates.is_empty() {
        return Err(FetchError::Malformed("no usable conversion rates".to_string()));
    }
    Ok(RateSnapshot::new(rates, fetched_at))
}
