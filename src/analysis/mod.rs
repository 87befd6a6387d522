// =============================================================================
// External Technical Analysis
// =============================================================================
//
// Momentum and higher-timeframe trend readings sourced from TradingView rather
// than computed from the fetched candles.

pub mod tradingview;

pub use tradingview::{TaSnapshot, TradingViewClient};
