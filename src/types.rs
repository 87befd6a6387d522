// =============================================================================
// Shared types used across the reversal bot
// =============================================================================

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Trading action carried by a [`crate::strategy::Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
    None,
}

impl std::fmt::Display for SignalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::None => write!(f, "NONE"),
        }
    }
}

/// Higher-timeframe recommendation label published by TradingView.
///
/// Unknown labels collapse to `Neutral`, which never vetoes an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    #[default]
    Neutral,
    Sell,
    StrongSell,
}

impl Recommendation {
    /// Lenient parse: case-insensitive, `-` and spaces accepted in place of
    /// `_`.  Never fails.
    pub fn parse_lenient(label: &str) -> Self {
        let normalised = label.trim().to_uppercase().replace(['-', ' '], "_");
        match normalised.as_str() {
            "STRONG_BUY" => Self::StrongBuy,
            "BUY" => Self::Buy,
            "SELL" => Self::Sell,
            "STRONG_SELL" => Self::StrongSell,
            _ => Self::Neutral,
        }
    }

    /// Map TradingView's aggregate `Recommend.All` score in [-1, 1] to a label.
    pub fn from_score(score: f64) -> Self {
        if !score.is_finite() || !(-1.0..=1.0).contains(&score) {
            return Self::Neutral;
        }
        if score < -0.5 {
            Self::StrongSell
        } else if score < -0.1 {
            Self::Sell
        } else if score <= 0.1 {
            Self::Neutral
        } else if score <= 0.5 {
            Self::Buy
        } else {
            Self::StrongBuy
        }
    }

    /// `true` for the labels that veto a long entry.
    pub fn is_bearish(self) -> bool {
        matches!(self, Self::Sell | Self::StrongSell)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrongBuy => "STRONG_BUY",
            Self::Buy => "BUY",
            Self::Neutral => "NEUTRAL",
            Self::Sell => "SELL",
            Self::StrongSell => "STRONG_SELL",
        }
    }
}

impl FromStr for Recommendation {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candle timeframes the bot knows how to fetch and analyse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    H1,
    H4,
    H12,
    D1,
    W1,
}

impl Timeframe {
    /// Canonical lowercase label (`12h`, `1d`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::H1 => "1h",
            Self::H4 => "4h",
            Self::H12 => "12h",
            Self::D1 => "1d",
            Self::W1 => "1w",
        }
    }

    /// Column suffix understood by the TradingView scanner.  Daily values are
    /// the unsuffixed columns.
    pub fn tradingview_suffix(self) -> Option<&'static str> {
        match self {
            Self::H1 => Some("60"),
            Self::H4 => Some("240"),
            Self::H12 => Some("720"),
            Self::D1 => None,
            Self::W1 => Some("1W"),
        }
    }
}

impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1h" | "1H" => Ok(Self::H1),
            "4h" | "4H" => Ok(Self::H4),
            "12h" | "12H" => Ok(Self::H12),
            "1d" | "1D" => Ok(Self::D1),
            "1w" | "1W" => Ok(Self::W1),
            other => anyhow::bail!("unsupported timeframe '{other}' (expected 1h, 4h, 12h, 1d or 1w)"),
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
