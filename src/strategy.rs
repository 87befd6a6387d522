// =============================================================================
// Signal Engine — RSI Reversal Rule Chain
// =============================================================================
//
// Long-only mean-reversion entry with an overbought exit.  Rules are evaluated
// in order and the first match decides the signal:
//
//   1. Empty series                         => NONE  (no data)
//   2. RSI >= 70                            => SELL  (exit, entry = last close)
//   3. RSI undefined or > 30                => NONE
//   4. No reversal pattern on the last bars => NONE
//   5. Weekly trend SELL / STRONG_SELL      => NONE  (trend veto)
//   6. No volume spike                      => NONE
//   7. No swing low                         => NONE
//   8. Otherwise                            => BUY
//        SL  = swing low (10 bars, latest excluded)
//        TP1 = min(entry * 1.05, swing high)  when swing high > entry
//        TP2 = entry * 1.10
//
// Pure computation over already-fetched data: no I/O, no retries.
// =============================================================================

use serde::Serialize;
use tracing::debug;

use crate::indicators::patterns::{detect_reversal_pattern, ReversalPattern};
use crate::indicators::swing::{find_swing_high, find_swing_low, DEFAULT_WINDOW};
use crate::indicators::volume::volume_spike;
use crate::market_data::Candle;
use crate::types::{Recommendation, SignalAction};

/// RSI level at or above which an exit is signalled.
pub const RSI_OVERBOUGHT: f64 = 70.0;
/// RSI level at or below which entries are considered.
pub const RSI_OVERSOLD: f64 = 30.0;
/// TP1 distance as a multiple of entry.
const TP1_FACTOR: f64 = 1.05;
/// TP2 distance as a multiple of entry.
const TP2_FACTOR: f64 = 1.10;

// =============================================================================
// Signal
// =============================================================================

/// Confirmation details attached to a BUY.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalExtras {
    pub pattern: ReversalPattern,
    pub volume: f64,
    pub volume_avg: f64,
}

/// Output of one evaluation.
///
/// Only built through [`Signal::none`], [`Signal::sell`] and [`Signal::buy`],
/// which keeps the price fields consistent with the action: NONE carries no
/// price, SELL carries only the entry, BUY carries everything.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub action: SignalAction,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit_1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit_2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<SignalExtras>,
}

impl Signal {
    pub fn none(reason: impl Into<String>) -> Self {
        Self {
            action: SignalAction::None,
            reason: reason.into(),
            entry_price: None,
            stop_loss: None,
            take_profit_1: None,
            take_profit_2: None,
            extras: None,
        }
    }

    pub fn sell(reason: impl Into<String>, entry_price: f64) -> Self {
        Self {
            action: SignalAction::Sell,
            entry_price: Some(entry_price),
            ..Self::none(reason)
        }
    }

    pub fn buy(
        reason: impl Into<String>,
        entry_price: f64,
        stop_loss: f64,
        take_profit_1: f64,
        take_profit_2: f64,
        extras: SignalExtras,
    ) -> Self {
        Self {
            action: SignalAction::Buy,
            reason: reason.into(),
            entry_price: Some(entry_price),
            stop_loss: Some(stop_loss),
            take_profit_1: Some(take_profit_1),
            take_profit_2: Some(take_profit_2),
            extras: Some(extras),
        }
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Evaluate the rule chain over `candles` (oldest first).
///
/// `momentum` is the RSI reading for the same symbol/timeframe; a non-finite
/// value is treated as absent.  `weekly_trend` is the higher-timeframe
/// recommendation used as a veto.
pub fn evaluate(
    candles: &[Candle],
    momentum: Option<f64>,
    weekly_trend: Recommendation,
    volume_lookback: usize,
    volume_multiplier: f64,
) -> Signal {
    let signal = decide(candles, momentum, weekly_trend, volume_lookback, volume_multiplier);
    debug!(
        action = %signal.action,
        reason = %signal.reason,
        candles = candles.len(),
        momentum = ?momentum,
        weekly_trend = %weekly_trend,
        "signal evaluated"
    );
    signal
}

fn decide(
    candles: &[Candle],
    momentum: Option<f64>,
    weekly_trend: Recommendation,
    volume_lookback: usize,
    volume_multiplier: f64,
) -> Signal {
    // ── 1. Data ──────────────────────────────────────────────────────────
    let Some(last) = candles.last() else {
        return Signal::none("no data");
    };
    let last_close = last.close;
    let momentum = momentum.filter(|m| m.is_finite());

    // ── 2. Exit check takes priority ─────────────────────────────────────
    if let Some(rsi) = momentum {
        if rsi >= RSI_OVERBOUGHT {
            return Signal::sell("momentum overbought", last_close);
        }
    }

    // ── 3. Oversold gate ─────────────────────────────────────────────────
    match momentum {
        Some(rsi) if rsi <= RSI_OVERSOLD => {}
        _ => return Signal::none("momentum not oversold"),
    }

    // ── 4. Reversal candle ───────────────────────────────────────────────
    let Some(pattern) = detect_reversal_pattern(candles) else {
        return Signal::none("no reversal pattern");
    };

    // ── 5. Weekly trend veto ─────────────────────────────────────────────
    if weekly_trend.is_bearish() {
        return Signal::none("weekly trend bearish");
    }

    // ── 6. Participation ─────────────────────────────────────────────────
    let spike = volume_spike(candles, volume_lookback, volume_multiplier);
    let (true, Some(volume), Some(volume_avg)) = (spike.is_spike, spike.volume, spike.average)
    else {
        return Signal::none("no volume spike");
    };

    // ── 7. Stop reference ────────────────────────────────────────────────
    let Some(stop_loss) = find_swing_low(candles, DEFAULT_WINDOW) else {
        return Signal::none("no swing low");
    };

    // ── 8. Targets ───────────────────────────────────────────────────────
    let entry = last_close;
    let mut take_profit_1 = entry * TP1_FACTOR;
    let take_profit_2 = entry * TP2_FACTOR;
    if let Some(resistance) = find_swing_high(candles, DEFAULT_WINDOW) {
        if resistance > entry {
            take_profit_1 = take_profit_1.min(resistance);
        }
    }

    Signal::buy(
        format!(
            "RSI <= 30, {}, weekly trend ok, volume spike",
            pattern.words()
        ),
        entry,
        stop_loss,
        take_profit_1,
        take_profit_2,
        SignalExtras {
            pattern,
            volume,
            volume_avg,
        },
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn flat(i: i64, high: f64) -> Candle {
        Candle::new(i * 60_000, 10.0, high, 9.5, 10.0, 100.0)
    }

    /// 20 flat candles, then a bearish bar and a bullish engulfing bar with
    /// 130 volume.  Swing low = 8.9, entry = 10.5.
    fn engulfing_setup(flat_high: f64) -> Vec<Candle> {
        let mut series: Vec<Candle> = (0..20).map(|i| flat(i, flat_high)).collect();
        series.push(Candle::new(20 * 60_000, 10.0, 10.1, 8.9, 9.0, 100.0));
        series.push(Candle::new(21 * 60_000, 8.8, 10.6, 8.7, 10.5, 130.0));
        series
    }

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn empty_series_is_none() {
        let signal = evaluate(&[], Some(25.0), Recommendation::Neutral, 20, 1.2);
        assert_eq!(signal.action, SignalAction::None);
        assert_eq!(signal.reason, "no data");
        assert!(signal.entry_price.is_none());
        assert!(signal.stop_loss.is_none());
        assert!(signal.take_profit_1.is_none());
        assert!(signal.take_profit_2.is_none());
        assert!(signal.extras.is_none());
    }

    #[test]
    fn overbought_sells_at_last_close() {
        let series = engulfing_setup(10.5);
        for trend in [Recommendation::StrongBuy, Recommendation::Neutral, Recommendation::StrongSell] {
            let signal = evaluate(&series, Some(75.0), trend, 20, 1.2);
            assert_eq!(signal.action, SignalAction::Sell);
            assert_eq!(signal.reason, "momentum overbought");
            assert!(approx(signal.entry_price, 10.5));
            assert!(signal.stop_loss.is_none());
            assert!(signal.take_profit_1.is_none());
            assert!(signal.extras.is_none());
        }
    }

    #[test]
    fn overbought_short_circuits_on_any_series() {
        // A single candle with no pattern, no volume history, no swing low.
        let series = vec![Candle::new(0, 5.0, 5.0, 5.0, 5.0, 0.0)];
        let signal = evaluate(&series, Some(70.0), Recommendation::StrongSell, 0, 0.0);
        assert_eq!(signal.action, SignalAction::Sell);
        assert!(approx(signal.entry_price, 5.0));
    }

    #[test]
    fn missing_momentum_is_none() {
        let signal = evaluate(&engulfing_setup(10.5), None, Recommendation::Neutral, 20, 1.2);
        assert_eq!(signal.action, SignalAction::None);
        assert_eq!(signal.reason, "momentum not oversold");
    }

    #[test]
    fn nan_momentum_is_treated_as_missing() {
        let signal = evaluate(&engulfing_setup(10.5), Some(f64::NAN), Recommendation::Neutral, 20, 1.2);
        assert_eq!(signal.reason, "momentum not oversold");
    }

    #[test]
    fn neutral_momentum_is_none() {
        let signal = evaluate(&engulfing_setup(10.5), Some(30.01), Recommendation::Neutral, 20, 1.2);
        assert_eq!(signal.action, SignalAction::None);
        assert_eq!(signal.reason, "momentum not oversold");
    }

    #[test]
    fn no_pattern_is_none() {
        let series: Vec<Candle> = (0..25).map(|i| flat(i, 10.5)).collect();
        let signal = evaluate(&series, Some(25.0), Recommendation::Neutral, 20, 1.2);
        assert_eq!(signal.reason, "no reversal pattern");
    }

    #[test]
    fn bearish_weekly_trend_vetoes() {
        for trend in [Recommendation::Sell, Recommendation::StrongSell] {
            let signal = evaluate(&engulfing_setup(10.5), Some(25.0), trend, 20, 1.2);
            assert_eq!(signal.action, SignalAction::None);
            assert!(signal.reason.contains("weekly trend"));
            assert!(signal.entry_price.is_none());
        }
    }

    #[test]
    fn weak_volume_is_none() {
        let mut series = engulfing_setup(10.5);
        if let Some(last) = series.last_mut() {
            last.volume = 110.0;
        }
        let signal = evaluate(&series, Some(25.0), Recommendation::Neutral, 20, 1.2);
        assert_eq!(signal.reason, "no volume spike");
    }

    #[test]
    fn oversized_volume_lookback_is_none() {
        let signal = evaluate(&engulfing_setup(10.5), Some(25.0), Recommendation::Neutral, usize::MAX, 1.2);
        assert_eq!(signal.action, SignalAction::None);
        assert_eq!(signal.reason, "no volume spike");
        assert!(signal.entry_price.is_none());
    }

    #[test]
    fn short_volume_history_is_none() {
        // Exactly 20 candles with a lookback of 20: one short.
        let series: Vec<Candle> = engulfing_setup(10.5).split_off(2);
        assert_eq!(series.len(), 20);
        let signal = evaluate(&series, Some(25.0), Recommendation::Neutral, 20, 1.2);
        assert_eq!(signal.action, SignalAction::None);
        assert_eq!(signal.reason, "no volume spike");
    }

    #[test]
    fn missing_swing_low_is_none() {
        // Lookback 5 passes with 11 candles, but the swing window needs 12.
        let series: Vec<Candle> = engulfing_setup(10.5).split_off(11);
        assert_eq!(series.len(), 11);
        let signal = evaluate(&series, Some(25.0), Recommendation::Neutral, 5, 1.2);
        assert_eq!(signal.reason, "no swing low");
    }

    #[test]
    fn buy_with_default_targets() {
        let signal = evaluate(&engulfing_setup(10.5), Some(25.0), Recommendation::Neutral, 20, 1.2);
        assert_eq!(signal.action, SignalAction::Buy);
        assert!(approx(signal.entry_price, 10.5));
        assert!(approx(signal.stop_loss, 8.9));
        // Swing high (10.5) does not exceed entry: plain 5%.
        assert!(approx(signal.take_profit_1, 10.5 * 1.05));
        assert!(approx(signal.take_profit_2, 10.5 * 1.10));
        assert_eq!(
            signal.reason,
            "RSI <= 30, bullish engulfing, weekly trend ok, volume spike"
        );
        let extras = signal.extras.unwrap();
        assert_eq!(extras.pattern, ReversalPattern::BullishEngulfing);
        assert!((extras.volume - 130.0).abs() < 1e-9);
        assert!((extras.volume_avg - 100.0).abs() < 1e-9);
    }

    #[test]
    fn buy_caps_tp1_at_resistance() {
        let signal = evaluate(&engulfing_setup(10.8), Some(25.0), Recommendation::Buy, 20, 1.2);
        assert_eq!(signal.action, SignalAction::Buy);
        assert!(approx(signal.take_profit_1, 10.8));
        assert!(approx(signal.take_profit_2, 10.5 * 1.10));
    }

    #[test]
    fn resistance_above_five_percent_keeps_default_tp1() {
        let signal = evaluate(&engulfing_setup(12.0), Some(25.0), Recommendation::Neutral, 20, 1.2);
        assert!(approx(signal.take_profit_1, 10.5 * 1.05));
    }

    #[test]
    fn oversold_boundary_is_inclusive() {
        let signal = evaluate(&engulfing_setup(10.5), Some(30.0), Recommendation::Neutral, 20, 1.2);
        assert_eq!(signal.action, SignalAction::Buy);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let series = engulfing_setup(10.5);
        let a = evaluate(&series, Some(25.0), Recommendation::Neutral, 20, 1.2);
        let b = evaluate(&series, Some(25.0), Recommendation::Neutral, 20, 1.2);
        assert_eq!(a, b);
    }

    #[test]
    fn signal_serialises_without_absent_fields() {
        let json = serde_json::to_value(Signal::none("no data")).unwrap();
        assert_eq!(json["action"], "NONE");
        assert!(json.get("entry_price").is_none());
    }
}
