//! TCS3200 device context.
//!
//! `Tcs3200` owns every handle the sensor needs: the four select outputs,
//! the frequency input, a delay provider for settling and a clock for the
//! sampling window. All sensor operations go through it, so there is no
//! process-wide pin state.

use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use tracing::{debug, trace};

use tcs_core::config::SensorSettings;
use tcs_core::{Filter, FrequencyScaling, RawFrequencies};

use crate::error::{pin_error, SensorError};
use crate::frequency::{count_falling_edges, frequency_hz, Clock};

/// Anything that can report the output frequency for a filter.
///
/// `Tcs3200` is the hardware implementation; tests substitute scripted sources.
pub trait FrequencySource {
    /// Select `filter` and measure its frequency in Hz.
    fn measure(&mut self, filter: Filter) -> Result<f64, SensorError>;

    /// Measure red, green and blue, in that order.
    fn measure_rgb(&mut self) -> Result<RawFrequencies, SensorError> {
        let mut raw = RawFrequencies::default();
        for filter in Filter::RGB {
            raw.set(filter, self.measure(filter)?);
        }
        Ok(raw)
    }
}

/// Pin handles wired to the sensor.
pub struct Tcs3200Pins<O, I> {
    pub s0: O,
    pub s1: O,
    pub s2: O,
    pub s3: O,
    /// Frequency output.
    pub out: I,
}

/// Sampling window and filter settle delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub window: Duration,
    pub settle: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(100),
            settle: Duration::from_millis(100),
        }
    }
}

impl From<&SensorSettings> for Timing {
    fn from(settings: &SensorSettings) -> Self {
        Self {
            window: settings.sample_window(),
            settle: settings.settle(),
        }
    }
}

pub struct Tcs3200<O, I, D, C> {
    pins: Tcs3200Pins<O, I>,
    delay: D,
    clock: C,
    timing: Timing,
    scaling: FrequencyScaling,
    filter: Option<Filter>,
}

impl<O, I, D, C> Tcs3200<O, I, D, C>
where
    O: OutputPin,
    I: InputPin,
    D: DelayNs,
    C: Clock,
{
    /// Take ownership of the pins and apply the frequency scaling.
    ///
    /// No filter is selected until the first measurement.
    pub fn new(
        pins: Tcs3200Pins<O, I>,
        delay: D,
        clock: C,
        timing: Timing,
        scaling: FrequencyScaling,
    ) -> Result<Self, SensorError> {
        let mut device = Self {
            pins,
            delay,
            clock,
            timing,
            scaling,
            filter: None,
        };
        device.set_scaling(scaling)?;
        Ok(device)
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn scaling(&self) -> FrequencyScaling {
        self.scaling
    }

    /// Currently selected filter, `None` before the first selection.
    pub fn selected(&self) -> Option<Filter> {
        self.filter
    }

    /// Drive S0/S1 for the requested output scaling.
    pub fn set_scaling(&mut self, scaling: FrequencyScaling) -> Result<(), SensorError> {
        let (s0, s1) = scaling.scaling_levels();
        drive(&mut self.pins.s0, s0)?;
        drive(&mut self.pins.s1, s1)?;
        self.scaling = scaling;
        debug!("Frequency scaling set to {:?}", scaling);
        Ok(())
    }

    /// Drive S2/S3 for `filter` and wait for the multiplexer to settle.
    ///
    /// Re-selecting the active filter skips the settle delay.
    pub fn select(&mut self, filter: Filter) -> Result<(), SensorError> {
        if self.filter == Some(filter) {
            return Ok(());
        }
        let (s2, s3) = filter.select_levels();
        drive(&mut self.pins.s2, s2)?;
        drive(&mut self.pins.s3, s3)?;
        self.filter = Some(filter);

        let settle_us = u32::try_from(self.timing.settle.as_micros()).unwrap_or(u32::MAX);
        if settle_us > 0 {
            self.delay.delay_us(settle_us);
        }
        trace!("Selected {} filter", filter);
        Ok(())
    }

    /// Count output pulses over one sampling window on the active filter.
    pub fn count_pulses(&mut self) -> Result<u32, SensorError> {
        count_falling_edges(&mut self.pins.out, &mut self.clock, self.timing.window).map_err(pin_error)
    }

    /// Put the sensor in power-down and hand the pins back.
    pub fn release(mut self) -> Result<Tcs3200Pins<O, I>, SensorError> {
        self.set_scaling(FrequencyScaling::PowerDown)?;
        Ok(self.pins)
    }
}

impl<O, I, D, C> FrequencySource for Tcs3200<O, I, D, C>
where
    O: OutputPin,
    I: InputPin,
    D: DelayNs,
    C: Clock,
{
    fn measure(&mut self, filter: Filter) -> Result<f64, SensorError> {
        self.select(filter)?;
        let count = self.count_pulses()?;
        let hz = frequency_hz(count, self.timing.window);
        trace!("{} filter: {} pulses, {:.1} Hz", filter, count, hz);
        Ok(hz)
    }
}

fn drive<O: OutputPin>(pin: &mut O, high: bool) -> Result<(), SensorError> {
    if high {
        pin.set_high().map_err(pin_error)
    } else {
        pin.set_low().map_err(pin_error)
    }
}
