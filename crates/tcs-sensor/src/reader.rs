//! Calibration phase and polling loop.
//!
//! A `Reader` only exists once calibration has completed: `Reader::calibrate`
//! consumes the frequency source and returns the calibrated reader, so the
//! white-balance step runs exactly once per reader. There is no way to build
//! a reader from a calibration stored by an earlier process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use tcs_core::{CalibrationReference, Classifier, ColorReading, ReadingStore};

use crate::calibrate::{Confirm, WHITE_CARD_PROMPT};
use crate::device::FrequencySource;
use crate::error::SensorError;

/// Longest uninterrupted sleep between stop-flag checks.
const STOP_POLL: Duration = Duration::from_millis(100);

pub struct Reader<S> {
    source: S,
    calibration: CalibrationReference,
    classifier: Classifier,
}

impl<S: FrequencySource> Reader<S> {
    /// Run the interactive white-balance phase and return a calibrated reader.
    ///
    /// Blocks on `confirm` until the operator has placed the white reference.
    pub fn calibrate<P: Confirm + ?Sized>(
        mut source: S,
        confirm: &mut P,
        classifier: Classifier,
    ) -> Result<Self, SensorError> {
        info!("Waiting for white reference confirmation");
        confirm.confirm(WHITE_CARD_PROMPT)?;

        let white = source.measure_rgb()?;
        let calibration = CalibrationReference::from_white(white);
        info!(
            "Calibration complete: red {:.2} Hz, green {:.2} Hz, blue {:.2} Hz",
            calibration.red(),
            calibration.green(),
            calibration.blue()
        );

        Ok(Self::with_calibration(source, calibration, classifier))
    }

    /// Build a reader around a calibration obtained some other way (tests, fixtures).
    pub fn with_calibration(source: S, calibration: CalibrationReference, classifier: Classifier) -> Self {
        Self {
            source,
            calibration,
            classifier,
        }
    }

    pub fn calibration(&self) -> &CalibrationReference {
        &self.calibration
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Measure all channels once and classify the result.
    pub fn read_cycle(&mut self) -> Result<ColorReading, SensorError> {
        let raw = self.source.measure_rgb()?;
        let rgb = self.calibration.scale(raw);
        let (label, tone) = self.classifier.classify(rgb);

        Ok(ColorReading {
            raw,
            rgb,
            label,
            tone,
            timestamp: Utc::now(),
        })
    }

    /// Poll until `stop` is raised, publishing each reading to `store`.
    ///
    /// Publish failures are logged and the loop carries on; the server shows
    /// its placeholder until the next successful publish. Returns the number
    /// of completed cycles.
    pub fn run<St: ReadingStore + ?Sized>(
        &mut self,
        store: &St,
        interval: Duration,
        stop: &AtomicBool,
    ) -> Result<u64, SensorError> {
        info!("Starting sensor loop, polling every {:?}", interval);
        let mut cycles = 0u64;

        while !stop.load(Ordering::Relaxed) {
            let reading = self.read_cycle()?;
            debug!(
                "R={} G={} B={} hex={} label={}{}",
                reading.rgb.r,
                reading.rgb.g,
                reading.rgb.b,
                reading.hex(),
                reading.label,
                reading.tone.map(|t| format!(" ({})", t)).unwrap_or_default()
            );

            if let Err(e) = store.publish(&reading) {
                warn!("Failed to publish reading: {}", e);
            }
            cycles += 1;

            sleep_unless_stopped(interval, stop);
        }

        info!("Sensor loop stopped after {} cycles", cycles);
        Ok(cycles)
    }

    /// Give back the frequency source, e.g. to release the pins.
    pub fn into_source(self) -> S {
        self.source
    }

    /// End the session: withdraw the published reading and give back the source.
    ///
    /// A failure to clear the store is logged, not fatal.
    pub fn finish<St: ReadingStore + ?Sized>(self, store: &St) -> S {
        if let Err(e) = store.clear() {
            warn!("Failed to clear published reading: {}", e);
        }
        self.source
    }
}

/// Clear any reading left by a previous process, then calibrate.
///
/// This is the reader process's startup sequence. A failure to clear the
/// store is logged, not fatal.
pub fn start_session<S, P, St>(
    source: S,
    confirm: &mut P,
    store: &St,
    classifier: Classifier,
) -> Result<Reader<S>, SensorError>
where
    S: FrequencySource,
    P: Confirm + ?Sized,
    St: ReadingStore + ?Sized,
{
    if let Err(e) = store.clear() {
        warn!("Failed to clear previous reading: {}", e);
    }
    Reader::calibrate(source, confirm, classifier)
}

fn sleep_unless_stopped(total: Duration, stop: &AtomicBool) {
    let deadline = Instant::now() + total;
    loop {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return;
        }
        std::thread::sleep(remaining.min(STOP_POLL));
    }
}
