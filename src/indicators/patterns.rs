// =============================================================================
// Candlestick Reversal Patterns
// =============================================================================
//
// Two bullish reversal formations, both read from the end of the series:
//
//   Bullish engulfing — prior candle bearish, last candle bullish with a larger
//                       body whose open-to-close range covers the prior one.
//   Hammer            — last candle has a non-zero body, a lower shadow of at
//                       least 2x the body and an upper shadow of at most 0.5x.
//
// Detection order is fixed: engulfing first, hammer second.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::market_data::Candle;

/// Minimum lower-shadow / body ratio for a hammer.
const HAMMER_LOWER_SHADOW_RATIO: f64 = 2.0;
/// Maximum upper-shadow / body ratio for a hammer.
const HAMMER_UPPER_SHADOW_RATIO: f64 = 0.5;

/// A detected bullish reversal formation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReversalPattern {
    BullishEngulfing,
    Hammer,
}

impl ReversalPattern {
    /// Machine label (`bullish_engulfing`, `hammer`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BullishEngulfing => "bullish_engulfing",
            Self::Hammer => "hammer",
        }
    }

    /// Lowercase words, e.g. `bullish engulfing`.
    pub fn words(self) -> String {
        self.as_str().replace('_', " ")
    }

    /// Title-cased words, e.g. `Bullish Engulfing`.
    pub fn title(self) -> String {
        self.as_str()
            .split('_')
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for ReversalPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `true` when the last two candles form a bullish engulfing.
pub fn is_bullish_engulfing(candles: &[Candle]) -> bool {
    let [.., prev, curr] = candles else {
        return false;
    };
    if !(prev.is_bearish() && curr.is_bullish()) {
        return false;
    }
    let engulfs = curr.open <= prev.close && curr.close >= prev.open;
    curr.body() > prev.body() && engulfs
}

/// `true` when the last candle is a hammer.
pub fn is_hammer(candles: &[Candle]) -> bool {
    let Some(c) = candles.last() else {
        return false;
    };
    let body = c.body();
    if body == 0.0 {
        return false;
    }
    c.lower_shadow() >= HAMMER_LOWER_SHADOW_RATIO * body
        && c.upper_shadow() <= HAMMER_UPPER_SHADOW_RATIO * body
}

/// First matching reversal pattern at the end of the series, if any.
pub fn detect_reversal_pattern(candles: &[Candle]) -> Option<ReversalPattern> {
    if is_bullish_engulfing(candles) {
        Some(ReversalPattern::BullishEngulfing)
    } else if is_hammer(candles) {
        Some(ReversalPattern::Hammer)
    } else {
        None
    }
}
