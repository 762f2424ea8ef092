//! Binance daily kline client

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use crate::{
    config::Config,
    errors::{AnalyzerError, AnalyzerResult},
    network::retry::{retry_with_backoff, RetryPolicy},
    types::PriceObservation,
};

/// Binance caps `limit` on the klines endpoint.
pub const MAX_KLINES_LIMIT: u32 = 1000;

const KLINES_PATH: &str = "/api/v3/klines";
const OPEN_TIME_INDEX: usize = 0;
const CLOSE_INDEX: usize = 4;

pub struct BinanceClient {
    client: reqwest::Client,
    base_url: String,
    quote_asset: String,
    retry: RetryPolicy,
}

impl BinanceClient {
    pub fn new(base_url: &str, quote_asset: &str, timeout: Duration) -> AnalyzerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                warn!("⚠️ Failed to initialize HTTP client: {}", e);
                AnalyzerError::Network {
                    message: "Failed to build HTTP client".to_string(),
                    source: Some(e.into()),
                    retry_count: 0,
                }
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            quote_asset: quote_asset.to_uppercase(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn from_config(config: &Config) -> AnalyzerResult<Self> {
        Self::new(
            &config.binance_base_url,
            &config.quote_asset,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Trading pair for a base symbol, e.g. `BTC` -> `BTCEUR`.
    pub fn pair(&self, symbol: &str) -> String {
        format!("{}{}", symbol.to_uppercase(), self.quote_asset)
    }

    /// The last `days` daily closes for `symbol`, oldest first. Observations
    /// are stamped with the kline open time and keep the base symbol.
    pub async fn fetch_daily_closes(&self, symbol: &str, days: u32) -> AnalyzerResult<Vec<PriceObservation>> {
        let pair = self.pair(symbol);
        let limit = days.clamp(1, MAX_KLINES_LIMIT).to_string();
        let url = format!("{}{}", self.base_url, KLINES_PATH);

        let operation = || async {
            let response = self
                .client
                .get(&url)
                .query(&[("symbol", pair.as_str()), ("interval", "1d"), ("limit", limit.as_str())])
                .send()
                .await
                .context("HTTP request failed")?;

            let status = response.status();
            let body = response.text().await.context("Failed to read response body")?;
            if is_transient(status) {
                warn!("⚠️ Binance API returned error status {}: {}", status, body);
                return Err(anyhow!("Binance API error: {} - {}", status, body));
            }

            Ok((status, body))
        };

        let (status, body) = retry_with_backoff(
            operation,
            &self.retry,
            &format!("Binance klines fetch for {}", pair),
        )
        .await?;

        let json = serde_json::from_str::<Value>(&body);
        if let Some(message) = json.as_ref().ok().and_then(api_error_message) {
            return Err(AnalyzerError::price_source(symbol, message));
        }
        if !status.is_success() {
            return Err(AnalyzerError::price_source(symbol, format!("HTTP {}", status)));
        }
        let json = json.map_err(|e| AnalyzerError::parsing(format!("klines response for {}", pair), e))?;

        let observations = parse_klines(symbol, &json)?;
        info!(symbol, pair = %pair, quotes = observations.len(), "Fetched daily closes");
        Ok(observations)
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::IM_A_TEAPOT
}

/// Binance reports failures as `{"code": -1121, "msg": "Invalid symbol."}`.
fn api_error_message(json: &Value) -> Option<String> {
    let obj = json.as_object()?;
    obj.get("code")?;
    Some(
        obj.get("msg")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| json.to_string()),
    )
}

/// Maps a klines array to observations. Klines with an unreadable open time
/// are skipped; an unreadable close price fails the whole batch.
pub fn parse_klines(symbol: &str, json: &Value) -> AnalyzerResult<Vec<PriceObservation>> {
    let klines = json.as_array().ok_or_else(|| {
        AnalyzerError::parsing(
            format!("klines response for {}", symbol),
            anyhow!("expected an array, got {}", json),
        )
    })?;

    let mut observations = Vec::with_capacity(klines.len());
    for kline in klines {
        let Some(timestamp) = kline
            .get(OPEN_TIME_INDEX)
            .and_then(Value::as_i64)
            .and_then(DateTime::<Utc>::from_timestamp_millis)
        else {
            debug!(symbol, kline = %kline, "Skipping kline without open time");
            continue;
        };

        let price = kline
            .get(CLOSE_INDEX)
            .and_then(lenient_f64)
            .ok_or_else(|| {
                AnalyzerError::parsing(
                    format!("close price for {}", symbol),
                    anyhow!("unreadable kline {}", kline),
                )
            })?;

        observations.push(PriceObservation::new(symbol.to_uppercase(), price, timestamp));
    }

    Ok(observations)
}

/// Binance sends prices as strings; accept plain numbers too.
fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
