//! # tcs-sensor
//!
//! Sensor side of the TCS3200 color service.
//!
//! This crate provides:
//! - Filter selection and pulse-frequency measurement over `embedded-hal` pins
//! - The `Tcs3200` device context owning pins, delay and clock
//! - The one-shot white-balance calibration phase
//! - The polling loop that publishes readings to a `ReadingStore`
//!
//! ## Features
//!
//! - `rpi` (default) - Raspberry Pi GPIO backend built on `rppal`

pub mod calibrate;
pub mod device;
pub mod error;
pub mod frequency;
pub mod reader;

#[cfg(feature = "rpi")]
pub mod rpi;

pub use calibrate::{Confirm, StdinConfirm, WHITE_CARD_PROMPT};
pub use device::{FrequencySource, Tcs3200, Tcs3200Pins, Timing};
pub use error::SensorError;
pub use frequency::{count_falling_edges, frequency_hz, Clock, MonotonicClock};
pub use reader::{start_session, Reader};
