//! # tcs-core
//!
//! Core data model for the TCS3200 color sensor service.
//!
//! This crate provides:
//! - Reading types (raw frequencies, scaled RGB, color label)
//! - White-balance calibration and linear scaling
//! - Dominant color classification
//! - The latest-reading store shared between reader and web server
//! - Configuration file loading
//!
//! This crate is intentionally free of GPIO and async code, so the web
//! server can depend on it without ever linking hardware access.

pub mod calibration;
pub mod classify;
pub mod config;
pub mod model;
pub mod store;

pub use calibration::{CalibrationReference, MIN_BASELINE_HZ, RGB_CEILING};
pub use classify::Classifier;
pub use config::{AppConfig, ConfigError};
pub use model::*;
pub use store::{FileReadingStore, MemoryReadingStore, ReadingStore, StoreError};
