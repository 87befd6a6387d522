// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators used by the signal
// engine.  Insufficient data is always reported explicitly (`None`, or an
// empty `VolumeSpike`) rather than approximated.

pub mod patterns;
pub mod rsi;
pub mod swing;
pub mod volume;

pub use patterns::{detect_reversal_pattern, is_bullish_engulfing, is_hammer, ReversalPattern};
pub use rsi::{calculate_rsi, current_rsi};
pub use swing::{find_swing_high, find_swing_low};
pub use volume::{volume_spike, VolumeSpike};
