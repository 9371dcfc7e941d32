//! Dominant color classification.
//!
//! Scaled values grow with the light reaching each channel, so the dominant
//! color is the largest channel, provided it leads the runner-up by at least
//! `margin`. Anything closer is ambiguous; ties always are.

use serde::{Deserialize, Serialize};

use crate::model::{ColorLabel, Filter, Rgb, Tone};

/// Thresholds used to label a scaled reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Classifier {
    /// Lead the brightest channel needs over the runner-up. Treated as at least 1.
    pub margin: u8,
    /// Balanced readings whose brightest channel is below this are black.
    pub dark_below: u8,
    /// Balanced readings whose dimmest channel is above this are white.
    pub bright_above: u8,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            margin: 20,
            dark_below: 50,
            bright_above: 200,
        }
    }
}

impl Classifier {
    /// Label a reading and, for balanced ambiguous readings, name its shade.
    pub fn classify(&self, rgb: Rgb) -> (ColorLabel, Option<Tone>) {
        let margin = self.margin.max(1);

        let mut ranked = Filter::RGB.map(|filter| (filter, rgb.get(filter)));
        // Stable sort keeps measurement order among ties; ties are ambiguous anyway.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        let (top_filter, top) = ranked[0];
        let (_, second) = ranked[1];
        let (_, bottom) = ranked[2];

        if top - second >= margin {
            return (ColorLabel::from_filter(top_filter), None);
        }

        let tone = if top - bottom < margin {
            Some(if top < self.dark_below {
                Tone::Black
            } else if bottom > self.bright_above {
                Tone::White
            } else {
                Tone::Gray
            })
        } else {
            None
        };

        (ColorLabel::Ambiguous, tone)
    }
}
