// =============================================================================
// Exchange REST Client — public kline endpoint
// =============================================================================
//
// Only unauthenticated market data is used, so no API key or request signing
// is involved.  Every fetched series is validated before it is handed to the
// signal engine.
// =============================================================================

use anyhow::{Context, Result};
use tracing::{debug, instrument, warn};

use super::{market_symbol, Exchange};
use crate::market_data::{validate_series, Candle};
use crate::types::Timeframe;

/// Candles requested per fetch.
pub const DEFAULT_LIMIT: u32 = 200;

/// REST client for one exchange's public market-data endpoints.
#[derive(Clone)]
pub struct ExchangeClient {
    exchange: Exchange,
    base_url: String,
    client: reqwest::Client,
}

impl ExchangeClient {
    /// Create a client for `exchange` with a 10 s request timeout.
    pub fn new(exchange: Exchange) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build reqwest client")?;

        debug!(exchange = %exchange, base_url = exchange.rest_base_url(), "ExchangeClient initialised");

        Ok(Self {
            exchange,
            base_url: exchange.rest_base_url().to_string(),
            client,
        })
    }

    /// GET /api/v3/klines.
    ///
    /// `pair` may be given as `BTC/USDT` or `BTCUSDT`.  Returns the candles
    /// oldest-first.
    #[instrument(skip(self), fields(exchange = %self.exchange), name = "exchange::get_klines")]
    pub async fn get_klines(&self, pair: &str, timeframe: Timeframe, limit: u32) -> Result<Vec<Candle>> {
        let interval = self.exchange.kline_interval(timeframe).with_context(|| {
            format!("{} does not offer a {} interval", self.exchange, timeframe)
        })?;
        let symbol = market_symbol(pair);
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url, symbol, interval, limit
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("GET /api/v3/klines request failed")?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse klines response")?;

        if !status.is_success() {
            anyhow::bail!(
                "{} GET /api/v3/klines returned {}: {}",
                self.exchange,
                status,
                body
            );
        }

        let candles = parse_klines(&body)?;
        validate_series(&candles)
            .with_context(|| format!("{} returned an invalid series for {symbol}", self.exchange))?;

        debug!(symbol = %symbol, interval, count = candles.len(), "klines fetched");
        Ok(candles)
    }
}

impl std::fmt::Debug for ExchangeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeClient")
            .field("exchange", &self.exchange)
            .field("base_url", &self.base_url)
            .finish()
    }
}

// -------------------------------------------------------------------------
// Payload parsing
// -------------------------------------------------------------------------

/// Parse the kline array-of-arrays payload.
///
/// Array indices used:
///   [0] openTime, [1] open, [2] high, [3] low, [4] close, [5] volume
///
/// Binance sends 12 elements per entry and MEXC 8; anything shorter than 6 is
/// skipped with a warning.
pub fn parse_klines(body: &serde_json::Value) -> Result<Vec<Candle>> {
    let raw = body.as_array().context("klines response is not an array")?;

    let mut candles = Vec::with_capacity(raw.len());
    for entry in raw {
        let arr = entry.as_array().context("kline entry is not an array")?;

        if arr.len() < 6 {
            warn!("skipping malformed kline entry with {} elements", arr.len());
            continue;
        }

        let open_time = arr[0]
            .as_i64()
            .with_context(|| format!("kline open time is not an integer: {}", arr[0]))?;
        let open = parse_str_f64(&arr[1])?;
        let high = parse_str_f64(&arr[2])?;
        let low = parse_str_f64(&arr[3])?;
        let close = parse_str_f64(&arr[4])?;
        let volume = parse_str_f64(&arr[5])?;

        candles.push(Candle::new(open_time, open, high, low, close, volume));
    }

    Ok(candles)
}

/// Parse a JSON value that may be either a string or a number into `f64`.
fn parse_str_f64(val: &serde_json::Value) -> Result<f64> {
    if let Some(s) = val.as_str() {
        s.parse::<f64>()
            .with_context(|| format!("failed to parse '{s}' as f64"))
    } else if let Some(n) = val.as_f64() {
        Ok(n)
    } else {
        anyhow::bail!("expected string or number, got: {val}")
    }
}
