//! Raspberry Pi GPIO backend.
//!
//! Pins are addressed by BCM number. The frequency output uses the internal
//! pull-up so a disconnected sensor reads as a steady high level (zero Hz)
//! instead of floating.

use rppal::gpio::{Gpio, InputPin, OutputPin};
use rppal::hal::Delay;
use tracing::info;

use tcs_core::config::SensorSettings;

use crate::device::{Tcs3200, Tcs3200Pins, Timing};
use crate::error::SensorError;
use crate::frequency::MonotonicClock;

pub type RpiTcs3200 = Tcs3200<OutputPin, InputPin, Delay, MonotonicClock>;

/// Claim the configured pins and bring the sensor up.
///
/// Fails when `/dev/gpiomem` is unavailable (not a Pi, or missing
/// permissions) or when a pin is already in use.
pub fn open(settings: &SensorSettings) -> Result<RpiTcs3200, SensorError> {
    let gpio = Gpio::new()?;
    let bcm = settings.pins;

    let output = |pin: u8| -> Result<OutputPin, SensorError> { Ok(gpio.get(pin)?.into_output_low()) };

    let pins = Tcs3200Pins {
        s0: output(bcm.s0)?,
        s1: output(bcm.s1)?,
        s2: output(bcm.s2)?,
        s3: output(bcm.s3)?,
        out: gpio.get(bcm.out)?.into_input_pullup(),
    };

    let device = Tcs3200::new(
        pins,
        Delay::new(),
        MonotonicClock::new(),
        Timing::from(settings),
        settings.scaling,
    )?;
    info!(
        "GPIO ready: S0={} S1={} S2={} S3={} OUT={}",
        bcm.s0, bcm.s1, bcm.s2, bcm.s3, bcm.out
    );
    Ok(device)
}
