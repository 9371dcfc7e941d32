//! Sensor error type.

use embedded_hal::digital::{Error as DigitalError, ErrorKind};
use thiserror::Error;

/// Errors raised by the sensor side.
///
/// Zero-frequency readings are not errors: they are absorbed by the
/// calibration's safe divisor.
#[derive(Debug, Error)]
pub enum SensorError {
    /// The GPIO controller could not be opened or a pin could not be claimed.
    #[cfg(feature = "rpi")]
    #[error("GPIO initialization failed: {0}")]
    Gpio(#[from] rppal::gpio::Error),

    /// Driving or reading an already configured pin failed.
    #[error("GPIO pin access failed: {0:?}")]
    Pin(ErrorKind),

    /// The operator confirmation for calibration could not be read.
    #[error("Calibration confirmation failed: {0}")]
    Confirm(#[from] std::io::Error),
}

pub(crate) fn pin_error<E: DigitalError>(err: E) -> SensorError {
    SensorError::Pin(err.kind())
}
