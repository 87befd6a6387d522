// =============================================================================
// RSI Reversal Bot — library root
// =============================================================================
//
// The decision core (`indicators`, `strategy`) is pure and synchronous; the
// remaining modules are the I/O shell used by the binary.

pub mod analysis;
pub mod config;
pub mod exchange;
pub mod indicators;
pub mod market_data;
pub mod notify;
pub mod runner;
pub mod strategy;
pub mod types;

pub use market_data::Candle;
pub use strategy::{evaluate, Signal, SignalExtras};
pub use types::{Recommendation, SignalAction, Timeframe};
