//! TCS3200 data model types.
//!
//! These types describe what the sensor produces:
//! - Filter and frequency-scaling selections and their pin levels
//! - Raw per-channel frequencies
//! - Calibrated RGB triples and the classified color label
//! - The `ColorReading` snapshot published on every polling cycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Photodiode group selected through the S2/S3 lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Filter {
    Red,
    Green,
    Blue,
    /// No filter.
    Clear,
}

impl Filter {
    /// The color filters in measurement order.
    pub const RGB: [Filter; 3] = [Filter::Red, Filter::Green, Filter::Blue];

    /// Logic levels for (S2, S3), `true` meaning high.
    pub fn select_levels(self) -> (bool, bool) {
        match self {
            Filter::Red => (false, false),
            Filter::Blue => (false, true),
            Filter::Clear => (true, false),
            Filter::Green => (true, true),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Filter::Red => "red",
            Filter::Green => "green",
            Filter::Blue => "blue",
            Filter::Clear => "clear",
        };
        f.write_str(name)
    }
}

/// Output frequency scaling selected through the S0/S1 lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrequencyScaling {
    PowerDown,
    TwoPercent,
    #[default]
    TwentyPercent,
    Full,
}

impl FrequencyScaling {
    /// Logic levels for (S0, S1), `true` meaning high.
    pub fn scaling_levels(self) -> (bool, bool) {
        match self {
            FrequencyScaling::PowerDown => (false, false),
            FrequencyScaling::TwoPercent => (false, true),
            FrequencyScaling::TwentyPercent => (true, false),
            FrequencyScaling::Full => (true, true),
        }
    }
}

/// Measured frequency per color channel, in Hz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFrequencies {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl RawFrequencies {
    pub fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    /// Frequency for a single color filter. `Clear` is not tracked and reads as zero.
    pub fn get(&self, filter: Filter) -> f64 {
        match filter {
            Filter::Red => self.red,
            Filter::Green => self.green,
            Filter::Blue => self.blue,
            Filter::Clear => 0.0,
        }
    }

    /// Store the frequency for a color filter. Writes for `Clear` are ignored.
    pub fn set(&mut self, filter: Filter, hz: f64) {
        match filter {
            Filter::Red => self.red = hz,
            Filter::Green => self.green = hz,
            Filter::Blue => self.blue = hz,
            Filter::Clear => {}
        }
    }
}

/// Calibrated color triple, each channel in `0..=255`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS-style `#rrggbb` string.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn get(&self, filter: Filter) -> u8 {
        match filter {
            Filter::Red => self.r,
            Filter::Green => self.g,
            Filter::Blue => self.b,
            Filter::Clear => 0,
        }
    }
}

/// Dominant color of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorLabel {
    Red,
    Green,
    Blue,
    /// No single channel clearly dominates.
    Ambiguous,
}

impl ColorLabel {
    pub fn from_filter(filter: Filter) -> Self {
        match filter {
            Filter::Red => ColorLabel::Red,
            Filter::Green => ColorLabel::Green,
            Filter::Blue => ColorLabel::Blue,
            Filter::Clear => ColorLabel::Ambiguous,
        }
    }
}

impl fmt::Display for ColorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColorLabel::Red => "Red",
            ColorLabel::Green => "Green",
            ColorLabel::Blue => "Blue",
            ColorLabel::Ambiguous => "None/Ambiguous",
        };
        f.write_str(name)
    }
}

/// Neutral shade reported for ambiguous readings with balanced channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tone {
    Black,
    Gray,
    White,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tone::Black => "Black",
            Tone::Gray => "Gray",
            Tone::White => "White",
        };
        f.write_str(name)
    }
}

/// One polling cycle's result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorReading {
    /// Frequencies as measured, before calibration.
    pub raw: RawFrequencies,
    /// Calibrated channels.
    pub rgb: Rgb,
    pub label: ColorLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
    /// Capture time (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ColorReading {
    pub fn hex(&self) -> String {
        self.rgb.hex()
    }

    /// Age of the reading relative to `now`. Readings from the future count as fresh.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        (now - self.timestamp).max(chrono::Duration::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_levels_match_datasheet() {
        assert_eq!(Filter::Red.select_levels(), (false, false));
        assert_eq!(Filter::Blue.select_levels(), (false, true));
        assert_eq!(Filter::Clear.select_levels(), (true, false));
        assert_eq!(Filter::Green.select_levels(), (true, true));
    }

    #[test]
    fn test_default_scaling_is_twenty_percent() {
        let scaling = FrequencyScaling::default();
        assert_eq!(scaling, FrequencyScaling::TwentyPercent);
        assert_eq!(scaling.scaling_levels(), (true, false));
    }

    #[test]
    fn test_hex_formatting() {
        assert_eq!(Rgb::new(127, 255, 0).hex(), "#7fff00");
        assert_eq!(Rgb::default().hex(), "#000000");
    }

    #[test]
    fn test_reading_serializes_camel_case() {
        let reading = ColorReading {
            raw: RawFrequencies::new(500.0, 1100.0, 900.0),
            rgb: Rgb::new(127, 255, 255),
            label: ColorLabel::Ambiguous,
            tone: None,
            timestamp: "2024-01-17T10:30:00Z".parse().unwrap(),
        };

        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["label"], "ambiguous");
        assert_eq!(json["rgb"]["g"], 255);
        assert_eq!(json["raw"]["red"], 500.0);
        assert!(json.get("tone").is_none());
    }

    #[test]
    fn test_age_never_negative() {
        let reading = ColorReading {
            raw: RawFrequencies::default(),
            rgb: Rgb::default(),
            label: ColorLabel::Ambiguous,
            tone: None,
            timestamp: "2024-01-17T10:30:05Z".parse().unwrap(),
        };
        let earlier: DateTime<Utc> = "2024-01-17T10:30:00Z".parse().unwrap();
        assert_eq!(reading.age(earlier), chrono::Duration::zero());

        let later: DateTime<Utc> = "2024-01-17T10:30:08Z".parse().unwrap();
        assert_eq!(reading.age(later), chrono::Duration::seconds(3));
    }
}
