// =============================================================================
// TradingView Technical-Analysis Snapshot
// =============================================================================
//
// Queries the public TradingView crypto scanner for one ticker and a handful of
// columns on a given interval:
//
//   Recommend.All|<tf>  — aggregate score in [-1, 1]  => Recommendation label
//   RSI|<tf>            — RSI(14) as computed by TradingView
//   volume|<tf>         — last bar volume
//
// Daily columns carry no suffix.  The scanner answers with the values in
// column order, any of which may be null.
// =============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::exchange::{market_symbol, Exchange};
use crate::types::{Recommendation, Timeframe};

const SCAN_URL: &str = "https://scanner.tradingview.com/crypto/scan";

/// Columns requested, in response order.
const COLUMNS: [&str; 3] = ["Recommend.All", "RSI", "volume"];

/// Values read from the scanner for one symbol/interval.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TaSnapshot {
    pub rsi: Option<f64>,
    pub volume: Option<f64>,
    pub recommendation: Recommendation,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ScanRequest {
    symbols: ScanSymbols,
    columns: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ScanSymbols {
    tickers: Vec<String>,
    query: ScanQuery,
}

#[derive(Debug, Serialize)]
struct ScanQuery {
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ScanResponse {
    #[serde(default)]
    data: Vec<ScanRow>,
}

#[derive(Debug, Deserialize)]
struct ScanRow {
    s: String,
    d: Vec<Option<f64>>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the TradingView scanner endpoint.
pub struct TradingViewClient {
    client: reqwest::Client,
}

impl TradingViewClient {
    /// Create a client with a 10 s request timeout.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build reqwest client for TradingViewClient")?;
        Ok(Self { client })
    }

    /// Fetch the snapshot for `pair` on `exchange` at `timeframe`.
    #[instrument(skip(self), name = "tradingview::fetch")]
    pub async fn fetch(&self, exchange: Exchange, pair: &str, timeframe: Timeframe) -> Result<TaSnapshot> {
        let request = scan_request(exchange, pair, timeframe);

        let resp = self
            .client
            .post(SCAN_URL)
            .json(&request)
            .send()
            .await
            .context("POST tradingview scan request failed")?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse tradingview scan response")?;

        if !status.is_success() {
            anyhow::bail!("tradingview scanner returned {}: {}", status, body);
        }

        let snapshot = parse_scan(body)?;
        debug!(
            rsi = ?snapshot.rsi,
            recommendation = %snapshot.recommendation,
            "tradingview snapshot retrieved"
        );
        Ok(snapshot)
    }

    /// Like [`fetch`](Self::fetch) but never fails: errors are logged and an
    /// empty snapshot (no RSI, NEUTRAL) is returned.
    pub async fn fetch_or_default(&self, exchange: Exchange, pair: &str, timeframe: Timeframe) -> TaSnapshot {
        match self.fetch(exchange, pair, timeframe).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(
                    exchange = %exchange,
                    pair,
                    timeframe = %timeframe,
                    error = %e,
                    "tradingview snapshot unavailable, using neutral defaults"
                );
                TaSnapshot::default()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Request / response mapping
// ---------------------------------------------------------------------------

fn scan_request(exchange: Exchange, pair: &str, timeframe: Timeframe) -> ScanRequest {
    let columns = COLUMNS
        .iter()
        .map(|name| match timeframe.tradingview_suffix() {
            Some(suffix) => format!("{name}|{suffix}"),
            None => (*name).to_string(),
        })
        .collect();

    ScanRequest {
        symbols: ScanSymbols {
            tickers: vec![format!("{}:{}", exchange.as_str(), market_symbol(pair))],
            query: ScanQuery { types: Vec::new() },
        },
        columns,
    }
}

fn parse_scan(body: serde_json::Value) -> Result<TaSnapshot> {
    let response: ScanResponse =
        serde_json::from_value(body).context("unexpected tradingview scan payload")?;
    let row = response
        .data
        .into_iter()
        .next()
        .context("tradingview scan returned no rows (unknown ticker?)")?;

    let column = |i: usize| row.d.get(i).copied().flatten().filter(|v| v.is_finite());
    let recommendation = column(0)
        .map(Recommendation::from_score)
        .unwrap_or_default();

    debug!(ticker = %row.s, "tradingview row parsed");
    Ok(TaSnapshot {
        recommendation,
        rsi: column(1),
        volume: column(2),
    })
}
