// =============================================================================
// Exchange Market Data
// =============================================================================
//
// Spot OHLCV over public REST endpoints.  Binance and MEXC both expose
// `/api/v3/klines` with the same array-of-arrays payload, so a single client
// serves both; only the base URL and interval names differ.

pub mod client;
pub mod retry;

pub use client::ExchangeClient;
pub use retry::{retry_with_backoff, RetryPolicy};

use std::str::FromStr;

use crate::types::Timeframe;

/// Exchanges the bot can pull candles from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exchange {
    Binance,
    Mexc,
}

impl Exchange {
    /// Upper-case name, also used as the TradingView ticker prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Binance => "BINANCE",
            Self::Mexc => "MEXC",
        }
    }

    pub fn rest_base_url(self) -> &'static str {
        match self {
            Self::Binance => "https://api.binance.com",
            Self::Mexc => "https://api.mexc.com",
        }
    }

    /// Kline interval name, `None` when the exchange has no such interval.
    pub fn kline_interval(self, timeframe: Timeframe) -> Option<&'static str> {
        match (self, timeframe) {
            (Self::Binance, Timeframe::H1) => Some("1h"),
            (Self::Binance, Timeframe::H4) => Some("4h"),
            (Self::Binance, Timeframe::H12) => Some("12h"),
            (Self::Binance, Timeframe::D1) => Some("1d"),
            (Self::Binance, Timeframe::W1) => Some("1w"),
            (Self::Mexc, Timeframe::H1) => Some("60m"),
            (Self::Mexc, Timeframe::H4) => Some("4h"),
            (Self::Mexc, Timeframe::H12) => None,
            (Self::Mexc, Timeframe::D1) => Some("1d"),
            (Self::Mexc, Timeframe::W1) => Some("1W"),
        }
    }
}

impl FromStr for Exchange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BINANCE" => Ok(Self::Binance),
            "MEXC" => Ok(Self::Mexc),
            other => anyhow::bail!("unsupported exchange '{other}' (expected BINANCE or MEXC)"),
        }
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `BTC/USDT` -> `BTCUSDT`.
pub fn market_symbol(pair: &str) -> String {
    pair.trim().replace('/', "").to_uppercase()
}
