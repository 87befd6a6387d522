// =============================================================================
// Evaluation Cycle — one pass per trading pair
// =============================================================================
//
// For each pair, sequentially:
//   1. TradingView snapshot on the primary timeframe   (RSI)
//   2. TradingView snapshot on the weekly timeframe    (trend veto)
//   3. Candles from the exchange, retried with backoff
//   4. Signal engine
//   5. Discord notification (best-effort)
//
// TradingView failures degrade to a neutral snapshot; candle fetch failures
// are returned once the retry budget is spent.
// =============================================================================

use anyhow::Result;
use tracing::{info, instrument};

use crate::analysis::{TaSnapshot, TradingViewClient};
use crate::config::BotConfig;
use crate::exchange::client::DEFAULT_LIMIT;
use crate::exchange::{retry_with_backoff, ExchangeClient, RetryPolicy};
use crate::indicators::rsi::{current_rsi, DEFAULT_LENGTH};
use crate::market_data::{closes, Candle};
use crate::notify::{message, DiscordNotifier};
use crate::strategy::{self, Signal};
use crate::types::Timeframe;

/// Long-lived collaborators shared by every pair in a run.
pub struct Runner {
    config: BotConfig,
    exchange: ExchangeClient,
    tradingview: TradingViewClient,
    notifier: DiscordNotifier,
    retry: RetryPolicy,
}

impl Runner {
    pub fn new(config: BotConfig) -> Result<Self> {
        Ok(Self {
            exchange: ExchangeClient::new(config.exchange)?,
            tradingview: TradingViewClient::new()?,
            notifier: DiscordNotifier::new(config.webhook_url.clone())?,
            retry: RetryPolicy::default(),
            config,
        })
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Run one evaluation cycle for `pair` and notify the result.
    #[instrument(skip(self), name = "runner::run_once")]
    pub async fn run_once(&self, pair: &str) -> Result<Signal> {
        let cfg = &self.config;

        let primary = self
            .tradingview
            .fetch_or_default(cfg.exchange, pair, cfg.timeframe)
            .await;
        let weekly = self
            .tradingview
            .fetch_or_default(cfg.exchange, pair, Timeframe::W1)
            .await;

        let candles = retry_with_backoff(&self.retry, "fetch klines", || {
            self.exchange.get_klines(pair, cfg.timeframe, DEFAULT_LIMIT)
        })
        .await?;

        let momentum = momentum_for(cfg.local_rsi, &primary, &candles);
        let signal = strategy::evaluate(
            &candles,
            momentum,
            weekly.recommendation,
            cfg.volume_lookback,
            cfg.volume_multiplier,
        );

        info!(
            pair,
            action = %signal.action,
            reason = %signal.reason,
            entry = ?signal.entry_price,
            momentum = ?momentum,
            weekly = %weekly.recommendation,
            candle_volume = ?candles.last().map(|c| c.volume),
            ta_volume = ?primary.volume,
            last_candle = ?candles.last().and_then(Candle::opened_at),
            "signal generated"
        );

        let title = message::title(pair, cfg.timeframe, &signal);
        let description = message::describe(pair, cfg.timeframe, &signal, weekly.recommendation);
        self.notifier
            .send(&title, &description, message::color(signal.action))
            .await;

        Ok(signal)
    }
}

/// Momentum fed to the signal engine: RSI(14) from the candles when
/// `local_rsi` is set, TradingView's reading otherwise.
pub fn momentum_for(local_rsi: bool, snapshot: &TaSnapshot, candles: &[Candle]) -> Option<f64> {
    if local_rsi {
        current_rsi(&closes(candles), DEFAULT_LENGTH)
    } else {
        snapshot.rsi
    }
}
