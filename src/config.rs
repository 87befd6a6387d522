// =============================================================================
// Settings — environment defaults overridden by command-line flags
// =============================================================================
//
// `.env` is loaded first (see main.rs), then every setting is read from the
// process environment with a built-in fallback.  Command-line flags win over
// both.  Numeric variables that are present but unparseable are an error
// naming the variable rather than a silent fallback.
// =============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::exchange::Exchange;
use crate::indicators::volume::{DEFAULT_LOOKBACK, DEFAULT_MULTIPLIER};
use crate::types::Timeframe;

// =============================================================================
// Default-value helpers
// =============================================================================

fn default_exchange() -> String {
    "BINANCE".to_string()
}

fn default_symbol() -> String {
    "BTC/USDT".to_string()
}

fn default_timeframe() -> String {
    "12h".to_string()
}

// =============================================================================
// Settings (environment)
// =============================================================================

/// Values sourced from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Discord webhook; empty disables notifications.
    pub discord_webhook_url: String,
    pub default_exchange: String,
    pub default_symbol: String,
    pub default_timeframe: String,
    pub volume_lookback: usize,
    pub volume_multiplier: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            discord_webhook_url: String::new(),
            default_exchange: default_exchange(),
            default_symbol: default_symbol(),
            default_timeframe: default_timeframe(),
            volume_lookback: DEFAULT_LOOKBACK,
            volume_multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for missing
    /// keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let text = |key: &str, fallback: String| lookup(key).unwrap_or(fallback);

        let volume_lookback = match lookup("VOLUME_LOOKBACK") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("VOLUME_LOOKBACK is not a non-negative integer: '{raw}'"))?,
            None => defaults.volume_lookback,
        };
        let volume_multiplier = match lookup("VOLUME_MULTIPLIER") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("VOLUME_MULTIPLIER is not a number: '{raw}'"))?,
            None => defaults.volume_multiplier,
        };

        Ok(Self {
            discord_webhook_url: text("DISCORD_WEBHOOK_URL", defaults.discord_webhook_url),
            default_exchange: text("DEFAULT_EXCHANGE", defaults.default_exchange),
            default_symbol: text("DEFAULT_SYMBOL", defaults.default_symbol),
            default_timeframe: text("DEFAULT_TIMEFRAME", defaults.default_timeframe),
            volume_lookback,
            volume_multiplier,
        })
    }
}

// =============================================================================
// Command line
// =============================================================================

/// RSI reversal bot (Discord alerts).
#[derive(Parser, Debug, Default)]
#[command(name = "rsi-reversal-bot")]
#[command(about = "RSI Reversal Bot (Discord Alerts)")]
pub struct Args {
    /// Exchange to pull candles from (BINANCE, MEXC)
    #[arg(long)]
    pub exchange: Option<String>,

    /// Trading pair, e.g. BTC/USDT
    #[arg(long)]
    pub symbol: Option<String>,

    /// Comma-separated list of pairs; overrides --symbol
    #[arg(long)]
    pub symbols: Option<String>,

    /// Candle timeframe (1h, 4h, 12h, 1d, 1w)
    #[arg(long)]
    pub timeframe: Option<String>,

    /// Candles averaged for the volume spike check
    #[arg(long)]
    pub volume_lookback: Option<usize>,

    /// Spike threshold as a multiple of the average volume
    #[arg(long)]
    pub volume_multiplier: Option<f64>,

    /// Compute RSI(14) from the fetched candles instead of using TradingView
    #[arg(long)]
    pub local_rsi: bool,
}

// =============================================================================
// Resolved configuration
// =============================================================================

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    pub exchange: Exchange,
    pub pairs: Vec<String>,
    pub timeframe: Timeframe,
    pub volume_lookback: usize,
    pub volume_multiplier: f64,
    pub local_rsi: bool,
    pub webhook_url: String,
}

impl BotConfig {
    /// Merge `args` over `settings` and validate the result.
    pub fn resolve(settings: Settings, args: Args) -> Result<Self> {
        let exchange: Exchange = args
            .exchange
            .unwrap_or(settings.default_exchange)
            .parse()?;
        let timeframe: Timeframe = args
            .timeframe
            .unwrap_or(settings.default_timeframe)
            .parse()?;

        let raw_pairs = args
            .symbols
            .or(args.symbol)
            .unwrap_or(settings.default_symbol);
        let pairs = split_pairs(&raw_pairs);
        if pairs.is_empty() {
            anyhow::bail!("no trading pair configured (got '{raw_pairs}')");
        }

        if exchange.kline_interval(timeframe).is_none() {
            anyhow::bail!("{exchange} does not offer a {timeframe} interval");
        }

        let volume_multiplier = args.volume_multiplier.unwrap_or(settings.volume_multiplier);
        if !volume_multiplier.is_finite() || volume_multiplier < 0.0 {
            anyhow::bail!("volume multiplier must be a non-negative number, got {volume_multiplier}");
        }

        let config = Self {
            exchange,
            pairs,
            timeframe,
            volume_lookback: args.volume_lookback.unwrap_or(settings.volume_lookback),
            volume_multiplier,
            local_rsi: args.local_rsi,
            webhook_url: settings.discord_webhook_url,
        };

        info!(
            exchange = %config.exchange,
            pairs = ?config.pairs,
            timeframe = %config.timeframe,
            volume_lookback = config.volume_lookback,
            volume_multiplier = config.volume_multiplier,
            local_rsi = config.local_rsi,
            "configuration resolved"
        );
        Ok(config)
    }
}

/// Split a comma-separated pair list, trimming and dropping empty entries.
pub fn split_pairs(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_env_uses_defaults() {
        let s = Settings::from_lookup(env(&[])).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.default_exchange, "BINANCE");
        assert_eq!(s.default_symbol, "BTC/USDT");
        assert_eq!(s.default_timeframe, "12h");
        assert_eq!(s.volume_lookback, 20);
        assert!((s.volume_multiplier - 1.2).abs() < f64::EPSILON);
        assert!(s.discord_webhook_url.is_empty());
    }

    #[test]
    fn env_values_are_read() {
        let s = Settings::from_lookup(env(&[
            ("DISCORD_WEBHOOK_URL", "https://hook"),
            ("DEFAULT_EXCHANGE", "MEXC"),
            ("VOLUME_LOOKBACK", " 30 "),
            ("VOLUME_MULTIPLIER", "1.5"),
        ]))
        .unwrap();
        assert_eq!(s.discord_webhook_url, "https://hook");
        assert_eq!(s.default_exchange, "MEXC");
        assert_eq!(s.volume_lookback, 30);
        assert!((s.volume_multiplier - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn bad_numeric_env_is_error() {
        let err = Settings::from_lookup(env(&[("VOLUME_LOOKBACK", "twenty")])).unwrap_err();
        assert!(err.to_string().contains("VOLUME_LOOKBACK"));
        assert!(Settings::from_lookup(env(&[("VOLUME_MULTIPLIER", "x")])).is_err());
    }

    #[test]
    fn resolve_with_defaults() {
        let cfg = BotConfig::resolve(Settings::default(), Args::default()).unwrap();
        assert_eq!(cfg.exchange, Exchange::Binance);
        assert_eq!(cfg.pairs, vec!["BTC/USDT"]);
        assert_eq!(cfg.timeframe, Timeframe::H12);
        assert_eq!(cfg.volume_lookback, 20);
        assert!(!cfg.local_rsi);
    }

    #[test]
    fn cli_overrides_env() {
        let args = Args {
            exchange: Some("mexc".into()),
            symbol: Some("ETH/USDT".into()),
            timeframe: Some("4h".into()),
            volume_lookback: Some(10),
            volume_multiplier: Some(2.0),
            local_rsi: true,
            ..Args::default()
        };
        let cfg = BotConfig::resolve(Settings::default(), args).unwrap();
        assert_eq!(cfg.exchange, Exchange::Mexc);
        assert_eq!(cfg.pairs, vec!["ETH/USDT"]);
        assert_eq!(cfg.timeframe, Timeframe::H4);
        assert_eq!(cfg.volume_lookback, 10);
        assert!((cfg.volume_multiplier - 2.0).abs() < f64::EPSILON);
        assert!(cfg.local_rsi);
    }

    #[test]
    fn symbols_list_overrides_symbol() {
        let args = Args {
            symbol: Some("ETH/USDT".into()),
            symbols: Some(" BTC/USDT, ,SOL/USDT ,".into()),
            ..Args::default()
        };
        let cfg = BotConfig::resolve(Settings::default(), args).unwrap();
        assert_eq!(cfg.pairs, vec!["BTC/USDT", "SOL/USDT"]);
    }

    #[test]
    fn empty_symbol_list_is_error() {
        let args = Args {
            symbols: Some(" , ".into()),
            ..Args::default()
        };
        assert!(BotConfig::resolve(Settings::default(), args).is_err());
    }

    #[test]
    fn unsupported_interval_is_error() {
        // MEXC has no 12h klines and 12h is the default timeframe.
        let args = Args {
            exchange: Some("MEXC".into()),
            ..Args::default()
        };
        assert!(BotConfig::resolve(Settings::default(), args).is_err());
    }

    #[test]
    fn negative_multiplier_is_error() {
        let args = Args {
            volume_multiplier: Some(-1.0),
            ..Args::default()
        };
        assert!(BotConfig::resolve(Settings::default(), args).is_err());
    }

    #[test]
    fn cli_parses_flags() {
        let args = Args::try_parse_from([
            "rsi-reversal-bot",
            "--symbols",
            "BTC/USDT,ETH/USDT",
            "--volume-lookback",
            "15",
            "--volume-multiplier",
            "1.4",
            "--local-rsi",
        ])
        .unwrap();
        assert_eq!(args.symbols.as_deref(), Some("BTC/USDT,ETH/USDT"));
        assert_eq!(args.volume_lookback, Some(15));
        assert!(args.local_rsi);
    }
}
