//! White-balance calibration and linear scaling.
//!
//! The TCS3200 output frequency is directly proportional to the irradiance
//! on the selected photodiodes. A white reference therefore produces the
//! highest frequency each channel is expected to see, and a sample is scaled
//! as `raw / baseline * 255`, truncated and clamped to `0..=255`.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{Filter, RawFrequencies, Rgb};

/// Upper bound of a scaled channel.
pub const RGB_CEILING: f64 = 255.0;

/// Smallest baseline ever stored. Substituted for zero (or invalid) white readings.
pub const MIN_BASELINE_HZ: f64 = 1.0;

/// Per-channel white baseline in Hz.
///
/// Every stored baseline is at least [`MIN_BASELINE_HZ`], so scaling never
/// divides by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReference {
    red: f64,
    green: f64,
    blue: f64,
}

impl CalibrationReference {
    /// Build a reference from frequencies measured under a white card.
    pub fn from_white(white: RawFrequencies) -> Self {
        Self {
            red: safe_baseline(Filter::Red, white.red),
            green: safe_baseline(Filter::Green, white.green),
            blue: safe_baseline(Filter::Blue, white.blue),
        }
    }

    pub fn red(&self) -> f64 {
        self.red
    }

    pub fn green(&self) -> f64 {
        self.green
    }

    pub fn blue(&self) -> f64 {
        self.blue
    }

    /// Baseline for a color filter. `Clear` has no baseline and reports the minimum.
    pub fn baseline(&self, filter: Filter) -> f64 {
        match filter {
            Filter::Red => self.red,
            Filter::Green => self.green,
            Filter::Blue => self.blue,
            Filter::Clear => MIN_BASELINE_HZ,
        }
    }

    /// Scale a raw sample against the white baselines.
    pub fn scale(&self, raw: RawFrequencies) -> Rgb {
        Rgb {
            r: scale_channel(raw.red, self.red),
            g: scale_channel(raw.green, self.green),
            b: scale_channel(raw.blue, self.blue),
        }
    }
}

fn safe_baseline(filter: Filter, hz: f64) -> f64 {
    if hz.is_finite() && hz >= MIN_BASELINE_HZ {
        hz
    } else {
        warn!(
            "White baseline for {} channel measured {} Hz, using {} Hz",
            filter, hz, MIN_BASELINE_HZ
        );
        MIN_BASELINE_HZ
    }
}

/// Scale one channel to `0..=255`.
///
/// Negative and non-finite inputs map to 0. The divisor is floored at
/// [`MIN_BASELINE_HZ`] even when called with an unchecked baseline.
pub fn scale_channel(raw_hz: f64, baseline_hz: f64) -> u8 {
    if !raw_hz.is_finite() || raw_hz <= 0.0 {
        return 0;
    }
    let divisor = if baseline_hz.is_finite() {
        baseline_hz.max(MIN_BASELINE_HZ)
    } else {
        MIN_BASELINE_HZ
    };
    let scaled = (raw_hz / divisor * RGB_CEILING).clamp(0.0, RGB_CEILING);
    scaled as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reference_scenario() {
        let cal = CalibrationReference::from_white(RawFrequencies::new(1000.0, 1100.0, 900.0));
        let rgb = cal.scale(RawFrequencies::new(500.0, 1100.0, 900.0));
        assert_eq!(rgb, Rgb::new(127, 255, 255));
    }

    #[test]
    fn test_zero_baseline_is_substituted() {
        let cal = CalibrationReference::from_white(RawFrequencies::new(0.0, 1200.0, 0.0));
        assert_eq!(cal.red(), MIN_BASELINE_HZ);
        assert_eq!(cal.green(), 1200.0);
        assert_eq!(cal.blue(), MIN_BASELINE_HZ);

        // Zero baseline must still give a usable divisor.
        let rgb = cal.scale(RawFrequencies::new(0.5, 600.0, 0.0));
        assert_eq!(rgb, Rgb::new(127, 127, 0));
    }

    #[test]
    fn test_nan_baseline_is_substituted() {
        let cal = CalibrationReference::from_white(RawFrequencies::new(f64::NAN, f64::INFINITY, -5.0));
        assert_eq!(cal.red(), MIN_BASELINE_HZ);
        assert_eq!(cal.green(), MIN_BASELINE_HZ);
        assert_eq!(cal.blue(), MIN_BASELINE_HZ);
    }

    #[test]
    fn test_scale_is_bounded() {
        let baselines = [1.0, 3.0, 250.0, 1000.0, 12_345.0];
        let samples = [0.0, 1.0, 10.0, 500.0, 999.0, 1000.0, 50_000.0, 1e9];

        for &baseline in &baselines {
            for &sample in &samples {
                let value = scale_channel(sample, baseline);
                let expected = (sample / baseline * 255.0).min(255.0) as u8;
                assert_eq!(value, expected, "sample {} baseline {}", sample, baseline);
            }
        }
    }

    #[test]
    fn test_scale_brighter_than_white_saturates() {
        assert_eq!(scale_channel(2000.0, 1000.0), 255);
    }

    #[test]
    fn test_scale_handles_invalid_input() {
        assert_eq!(scale_channel(-10.0, 1000.0), 0);
        assert_eq!(scale_channel(f64::NAN, 1000.0), 0);
        assert_eq!(scale_channel(10.0, 0.0), 255);
        assert_eq!(scale_channel(10.0, f64::NAN), 255);
    }

    #[test]
    fn test_scale_is_deterministic() {
        let cal = CalibrationReference::from_white(RawFrequencies::new(830.0, 910.0, 1020.0));
        let raw = RawFrequencies::new(412.0, 77.0, 1019.0);
        assert_eq!(cal.scale(raw), cal.scale(raw));
    }
}
