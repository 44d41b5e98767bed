//! Exchange rate command handlers: `rates`, `convert` and `watch`.

use crate::args::{ConvertArgs, RateArgs, WatchArgs};
use crate::commands::{render_table, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::Amount;
use crate::rates::{
    self, rate_source, start_polling, Mode, PollState, RateProvider, RateSnapshot, RateSource,
};
use crate::{Config, Result};
use anyhow::anyhow;
use chrono::{DateTime, Local, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// The outcome of a currency conversion.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Conversion {
    pub amount: Decimal,
    pub from: String,
    pub to: String,
    pub result: Decimal,
    pub fetched_at: DateTime<Utc>,
}

/// Fetches the rates once and shows the configured currencies against USD.
///
/// # Errors
///
/// - `ErrorType::Config` if live rates are requested and no API key is available.
/// - `ErrorType::Fetch` if the rates cannot be fetched.
pub async fn rates(config: Config, mode: Mode, args: RateArgs) -> Result<Out<RateSnapshot>> {
    let snapshot = fetch_once(&config, mode, &args).await?;
    let message = rate_table(&snapshot, config.currencies());
    Ok(Out::new(message, snapshot))
}

/// Fetches the rates once and converts `args.amount()` from one currency to another.
///
/// # Errors
///
/// - `ErrorType::InvalidAmount` if the amount is empty, not a number, negative or too large.
/// - `ErrorType::Config` if live rates are requested and no API key is available.
/// - `ErrorType::Fetch` if the rates cannot be fetched.
/// - `ErrorType::Request` if either currency is missing from the fetched rates.
pub async fn convert(config: Config, mode: Mode, args: ConvertArgs) -> Result<Out<Conversion>> {
    let amount: Amount = args.amount().parse().pub_result(ErrorType::InvalidAmount)?;
    let from = args.from().trim().to_ascii_uppercase();
    let to = args.to().trim().to_ascii_uppercase();

    let snapshot = fetch_once(&config, mode, args.rates()).await?;
    let result = rates::convert(amount.value(), &from, &to, &snapshot)
        .ok_or_else(|| anyhow!("There is no exchange rate to convert {from} to {to}"))
        .pub_result(ErrorType::Request)?;

    let message = format!("{} = {}", money(amount.value(), &from), money(result, &to));
    Ok(Out::new(
        message,
        Conversion {
            amount: amount.value(),
            from,
            to,
            result,
            fetched_at: snapshot.fetched_at(),
        },
    ))
}

/// Polls the rates and prints the table after every successful fetch. Stops on Ctrl-C, or after
/// `args.ticks()` fetches when given. Failed fetches are logged and the previous rates are kept.
///
/// # Errors
///
/// - `ErrorType::Config` if live rates are requested and no API key is available.
pub async fn watch(config: Config, mode: Mode, args: WatchArgs) -> Result<Out<PollState>> {
    let source = source(&config, mode, args.rates())?;
    let period = args
        .interval()
        .map(|secs| Duration::from_secs(secs.max(1)))
        .unwrap_or_else(|| config.poll_interval());

    let mut handle = start_polling(source, period);
    let mut seen = 0u64;
    loop {
        let state = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted");
                break;
            }
            state = handle.changed() => match state {
                Some(state) => state,
                None => break,
            },
        };
        seen += 1;
        if let (None, Some(snapshot)) = (&state.error, &state.snapshot) {
            info!("{}", rate_table(snapshot, config.currencies()));
        }
        if args.ticks().is_some_and(|ticks| seen >= ticks) {
            break;
        }
    }

    let last = handle.latest();
    handle.cancel().await;
    let message = format!(
        "Stopped watching exchange rates after {} fetch{}",
        last.attempts,
        if last.attempts == 1 { "" } else { "es" }
    );
    Ok(Out::new(message, last))
}

/// The key given on the command line or in the environment wins over the one in `config.json`.
fn source(config: &Config, mode: Mode, args: &RateArgs) -> Result<Box<dyn RateSource>> {
    let api_key = args.api_key().or(config.api_key());
    rate_source(mode, api_key).pub_result(ErrorType::Config)
}

async fn fetch_once(config: &Config, mode: Mode, args: &RateArgs) -> Result<RateSnapshot> {
    let mut provider = RateProvider::new(source(config, mode, args)?);
    let snapshot = provider.refresh().await.pub_result(ErrorType::Fetch)?;
    Ok(snapshot.clone())
}

fn rate_table(snapshot: &RateSnapshot, currencies: &[String]) -> String {
    let rows: Vec<Vec<String>> = currencies
        .iter()
        .map(|code| {
            let rate = match snapshot.rate(code) {
                Some(rate) => format!(
                    "{:.4}",
                    rate.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
                ),
                None => "n/a".to_string(),
            };
            vec![code.to_ascii_uppercase(), rate]
        })
        .collect();
    let updated = snapshot
        .fetched_at()
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S");
    format!(
        "{}\n\nLast updated: {updated}",
        render_table(&["Currency", "Rate (per USD)"], &rows)
    )
}

fn money(value: Decimal, code: &str) -> String {
    format!(
        "{:.2} {code}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_rates_offline() {
        let env = TestEnv::new().await;
        let out = rates(env.config(), Mode::Offline, RateArgs::default())
            .await
            .unwrap();
        let lines: Vec<&str> = out.message().lines().collect();
        assert!(lines[0].starts_with("Currency"));
        assert_eq!(lines[2], "USD       1.0000");
        assert_eq!(lines[3], "EUR       0.9200");
        assert_eq!(lines[4], "UZS       12850.0000");
        assert!(out.message().contains("Last updated: "));
    }

    #[tokio::test]
    async fn test_convert_offline() {
        let env = TestEnv::new().await;
        let args = ConvertArgs::new("100", "usd", "EUR", RateArgs::default());
        let out = convert(env.config(), Mode::Offline, args).await.unwrap();
        assert_eq!(out.message(), "100.00 USD = 92.00 EUR");
        assert_eq!(out.structure().unwrap().result, Decimal::new(92, 0));
    }

    #[tokio::test]
    async fn test_convert_unknown_currency() {
        let env = TestEnv::new().await;
        let args = ConvertArgs::new("100", "USD", "XYZ", RateArgs::default());
        let err = convert(env.config(), Mode::Offline, args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
    }

    #[tokio::test]
    async fn test_convert_bad_amount() {
        let env = TestEnv::new().await;
        let args = ConvertArgs::new("lots", "USD", "EUR", RateArgs::default());
        let err = convert(env.config(), Mode::Offline, args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::InvalidAmount);
    }

    #[tokio::test]
    async fn test_live_rates_need_a_key() {
        let env = TestEnv::without_api_key().await;
        let err = rates(env.config(), Mode::Live, RateArgs::default())
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }

    #[tokio::test]
    async fn test_watch_stops_after_ticks() {
        let env = TestEnv::new().await;
        let args = WatchArgs::new(Some(1), Some(2), RateArgs::default());
        let out = watch(env.config(), Mode::Offline, args).await.unwrap();
        let last = out.structure().unwrap();
        assert_eq!(last.attempts, 2);
        assert!(last.error.is_none());
        assert_eq!(
            out.message(),
            "Stopped watching exchange rates after 2 fetches"
        );
    }
}
