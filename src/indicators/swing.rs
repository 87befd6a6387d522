// =============================================================================
// Swing Levels
// =============================================================================
//
// Recent support / resistance taken from the `window` candles that end one
// before the latest candle (the latest candle is excluded):
//
//   swing_low  = min(low)  over that window
//   swing_high = max(high) over that window
//
// Both need `window + 2` candles.  The window holds exactly `window` bars,
// so the default looks back 10 bars, not the 11 a `[-(window+2):-1]` slice
// would give.
// =============================================================================

use crate::market_data::Candle;

/// Window used by the signal engine for stop-loss / target references.
pub const DEFAULT_WINDOW: usize = 10;

/// The `window` candles ending one before the latest, or `None` when the
/// series holds fewer than `window + 2` candles.
fn swing_window(candles: &[Candle], window: usize) -> Option<&[Candle]> {
    if window == 0 || candles.len() < window.saturating_add(2) {
        return None;
    }
    let end = candles.len() - 1;
    Some(&candles[end - window..end])
}

/// Lowest low of the swing window.
pub fn find_swing_low(candles: &[Candle], window: usize) -> Option<f64> {
    swing_window(candles, window)?
        .iter()
        .map(|c| c.low)
        .reduce(f64::min)
}

/// Highest high of the swing window.
pub fn find_swing_high(candles: &[Candle], window: usize) -> Option<f64> {
    swing_window(candles, window)?
        .iter()
        .map(|c| c.high)
        .reduce(f64::max)
}
