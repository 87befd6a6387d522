// =============================================================================
// Volume Spike Detection
// =============================================================================
//
// Compares the latest candle's volume to the simple mean of the `lookback`
// candles immediately before it (the latest candle is excluded):
//
//   spike = latest_volume >= mean(prev lookback volumes) * multiplier
//
// Needs `lookback + 1` candles.
// =============================================================================

use serde::Serialize;

use crate::market_data::Candle;

/// Default trailing window for the volume mean.
pub const DEFAULT_LOOKBACK: usize = 20;
/// Default spike multiplier.
pub const DEFAULT_MULTIPLIER: f64 = 1.2;

/// Result of a volume-spike check.
///
/// `volume` and `average` are `None` when the series was too short.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeSpike {
    pub is_spike: bool,
    pub volume: Option<f64>,
    pub average: Option<f64>,
}

impl VolumeSpike {
    fn insufficient() -> Self {
        Self {
            is_spike: false,
            volume: None,
            average: None,
        }
    }
}

/// Check whether the latest candle's volume is a spike relative to the
/// trailing `lookback` candles.
///
/// # Edge cases
/// - `lookback == 0` => insufficient (an empty mean is undefined)
/// - `candles.len() <= lookback` => insufficient, including a lookback too
///   large for any series
pub fn volume_spike(candles: &[Candle], lookback: usize, multiplier: f64) -> VolumeSpike {
    if lookback == 0 || candles.len() <= lookback {
        return VolumeSpike::insufficient();
    }

    let Some((latest, history)) = candles.split_last() else {
        return VolumeSpike::insufficient();
    };
    let window = &history[history.len() - lookback..];
    let average = window.iter().map(|c| c.volume).sum::<f64>() / lookback as f64;

    VolumeSpike {
        is_spike: latest.volume >= average * multiplier,
        volume: Some(latest.volume),
        average: Some(average),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn with_volumes(volumes: &[f64]) -> Vec<Candle> {
        volumes
            .iter()
            .enumerate()
            .map(|(i, &v)| Candle::new(i as i64 * 60_000, 10.0, 11.0, 9.0, 10.0, v))
            .collect()
    }

    #[test]
    fn spike_detected() {
        let mut volumes = vec![100.0; 20];
        volumes.push(120.0);
        let result = volume_spike(&with_volumes(&volumes), 20, 1.2);
        assert!(result.is_spike);
        assert_eq!(result.volume, Some(120.0));
        assert_eq!(result.average, Some(100.0));
    }

    #[test]
    fn below_threshold_is_not_spike() {
        let mut volumes = vec![100.0; 20];
        volumes.push(119.0);
        let result = volume_spike(&with_volumes(&volumes), 20, 1.2);
        assert!(!result.is_spike);
        assert_eq!(result.volume, Some(119.0));
    }

    #[test]
    fn only_trailing_window_is_averaged() {
        // Old huge volumes fall outside the 3-candle window.
        let volumes = [10_000.0, 10_000.0, 10.0, 20.0, 30.0, 30.0];
        let result = volume_spike(&with_volumes(&volumes), 3, 1.2);
        let avg = result.average.unwrap();
        assert!((avg - 20.0).abs() < 1e-12);
        assert!(result.is_spike);
    }

    #[test]
    fn insufficient_data() {
        let result = volume_spike(&with_volumes(&[100.0; 20]), 20, 1.2);
        assert_eq!(
            result,
            VolumeSpike {
                is_spike: false,
                volume: None,
                average: None
            }
        );
    }

    #[test]
    fn zero_lookback_is_insufficient() {
        let result = volume_spike(&with_volumes(&[100.0; 5]), 0, 1.2);
        assert!(!result.is_spike);
        assert!(result.volume.is_none());
    }

    #[test]
    fn oversized_lookback_is_insufficient() {
        let result = volume_spike(&with_volumes(&[100.0; 5]), usize::MAX, 1.2);
        assert_eq!(result, VolumeSpike::insufficient());
    }

    #[test]
    fn empty_series() {
        assert!(!volume_spike(&[], 20, 1.2).is_spike);
    }
}
