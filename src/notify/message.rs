// =============================================================================
// Signal Message Formatting
// =============================================================================
//
// Renders a Signal into the title / description / colour of a Discord embed.
// Prices are shown with 2 decimals and volumes with none.
// =============================================================================

use crate::strategy::Signal;
use crate::types::{Recommendation, SignalAction, Timeframe};

const COLOR_BUY: u32 = 0x2ecc71;
const COLOR_SELL: u32 = 0xe74c3c;
const COLOR_NONE: u32 = 0x95a5a6;

/// Embed title: `BUY - BTC/USDT (12h)`, or `Info - ...` when there is no
/// actionable signal.
pub fn title(pair: &str, timeframe: Timeframe, signal: &Signal) -> String {
    match signal.action {
        SignalAction::None => format!("Info - {pair} ({timeframe})"),
        action => format!("{action} - {pair} ({timeframe})"),
    }
}

/// Embed side colour.
pub fn color(action: SignalAction) -> u32 {
    match action {
        SignalAction::Buy => COLOR_BUY,
        SignalAction::Sell => COLOR_SELL,
        SignalAction::None => COLOR_NONE,
    }
}

/// `STRONG_BUY` -> `strong buy`.
fn trend_words(weekly: Recommendation) -> String {
    weekly.as_str().to_lowercase().replace('_', " ")
}

/// Embed body for `signal`.
pub fn describe(pair: &str, timeframe: Timeframe, signal: &Signal, weekly: Recommendation) -> String {
    let mut lines: Vec<String> = Vec::new();

    match signal.action {
        SignalAction::Buy => {
            lines.push(format!("RSI Signal - {pair} ({timeframe})"));
            lines.push(String::new());
            if let Some(entry) = signal.entry_price {
                lines.push(format!("📈 Entrée : {entry:.2}"));
            }
            if let Some(stop) = signal.stop_loss {
                lines.push(format!("⛔ Stop : {stop:.2}"));
            }
            if let Some(tp1) = signal.take_profit_1 {
                lines.push(format!("🎯 TP1 : {tp1:.2}"));
            }
            if let Some(tp2) = signal.take_profit_2 {
                lines.push(format!(" | TP2 : {tp2:.2}"));
            }
            if let Some(extras) = &signal.extras {
                lines.push(String::new());
                lines.push(format!(
                    "✅ Confirmation : {} + Volume ↑ ({:.0} vs avg {:.0})",
                    extras.pattern.title(),
                    extras.volume,
                    extras.volume_avg
                ));
            }
            lines.push(format!("⏳ Tendance Weekly {}", trend_words(weekly)));
        }
        SignalAction::Sell => {
            lines.push(format!("RSI Exit - {pair} ({timeframe})"));
            lines.push(String::new());
            if let Some(exit) = signal.entry_price {
                lines.push(format!("💸 Sortie : RSI ≥ 70 @ {exit:.2}"));
            }
            lines.push(format!("⏳ Tendance Weekly {}", trend_words(weekly)));
        }
        SignalAction::None => {
            lines.push(format!("No signal - {pair} ({timeframe}) : {}", signal.reason));
        }
    }

    lines.join("\n")
}
