// =============================================================================
// Relative Strength Index (RSI) — Simple Rolling Mean
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — gain = rolling mean of positive deltas over `length` periods
//          loss = rolling mean of |negative deltas| over `length` periods
// Step 3 — RS  = gain / loss   (loss == 0 is replaced by 1e-9)
//          RSI = 100 - 100 / (1 + RS)
//
// Thresholds:  RSI >= 70 => OVERBOUGHT,  RSI <= 30 => OVERSOLD.
// =============================================================================

/// Default look-back length.
pub const DEFAULT_LENGTH: usize = 14;

/// Stand-in denominator when the average loss is exactly zero.
const ZERO_LOSS_DENOMINATOR: f64 = 1e-9;

/// Compute the RSI series for `closes`.
///
/// The output is aligned with the input: one entry per close.  Entry `i` is
/// `Some` once `length` deltas are available (i.e. `i >= length`), `None`
/// before that.
///
/// # Edge cases
/// - `length == 0` => every entry is `None`
/// - `closes.len() <= length` => every entry is `None`
/// - No movement at all (gain == loss == 0) yields 0.0, since the zero loss is
///   replaced rather than special-cased.
pub fn calculate_rsi(closes: &[f64], length: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if length == 0 || closes.len() <= length {
        return result;
    }

    // --- Compute price deltas ------------------------------------------------
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let length_f = length as f64;

    // deltas[k] is the change into closes[k + 1], so the window ending at
    // delta k produces the value for close k + 1.
    for (start, window) in deltas.windows(length).enumerate() {
        let (sum_gain, sum_loss) = window.iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
            if d > 0.0 {
                (g + d, l)
            } else {
                (g, l - d)
            }
        });
        result[start + length] = rsi_from_averages(sum_gain / length_f, sum_loss / length_f);
    }

    result
}

/// Most recent RSI value, `None` when there is insufficient data.
pub fn current_rsi(closes: &[f64], length: usize) -> Option<f64> {
    calculate_rsi(closes, length).last().copied().flatten()
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
/// Returns `None` when the result is non-finite (NaN input).
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let denominator = if avg_loss == 0.0 {
        ZERO_LOSS_DENOMINATOR
    } else {
        avg_loss
    };
    let rs = avg_gain / denominator;
    let rsi = 100.0 - 100.0 / (1.0 + rs);

    if rsi.is_finite() {
        Some(rsi)
    } else {
        None
    }
}
