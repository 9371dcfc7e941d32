//! Pulse-frequency measurement.
//!
//! The TCS3200 emits a 50 % duty-cycle square wave whose frequency tracks the
//! light on the selected photodiodes. We poll the output pin for a fixed
//! window and count high-to-low transitions. Polling never waits on an edge,
//! so a dark sensor or a floating pin simply yields zero pulses.

use std::time::{Duration, Instant};

use embedded_hal::digital::InputPin;

/// Monotonic time source used to bound the sampling window.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&mut self) -> Duration;
}

/// `Clock` backed by `std::time::Instant`.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }
}

/// Count falling edges on `pin` until `window` has elapsed on `clock`.
pub fn count_falling_edges<I, C>(pin: &mut I, clock: &mut C, window: Duration) -> Result<u32, I::Error>
where
    I: InputPin,
    C: Clock,
{
    let start = clock.now();
    let mut was_high = pin.is_high()?;
    let mut count: u32 = 0;

    while clock.now().saturating_sub(start) < window {
        let high = pin.is_high()?;
        if was_high && !high {
            count = count.saturating_add(1);
        }
        was_high = high;
    }

    Ok(count)
}

/// Convert a pulse count over `window` into Hz.
///
/// Zero pulses or an empty window give `0.0`.
pub fn frequency_hz(count: u32, window: Duration) -> f64 {
    let secs = window.as_secs_f64();
    if count == 0 || secs <= 0.0 {
        return 0.0;
    }
    f64::from(count) / secs
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;
    use std::convert::Infallible;
    use std::rc::Rc;

    use embedded_hal::digital::ErrorType;

    /// Clock that advances a shared timeline by `step` on every read.
    pub(crate) struct StepClock {
        pub(crate) time: Rc<Cell<Duration>>,
        pub(crate) step: Duration,
    }

    impl Clock for StepClock {
        fn now(&mut self) -> Duration {
            let now = self.time.get();
            self.time.set(now + self.step);
            now
        }
    }

    /// Square wave sampled from the shared timeline.
    struct SquareWave {
        time: Rc<Cell<Duration>>,
        hz: u64,
    }

    impl ErrorType for SquareWave {
        type Error = Infallible;
    }

    impl InputPin for SquareWave {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            if self.hz == 0 {
                return Ok(true);
            }
            let half_period_us = 500_000 / self.hz;
            let t = self.time.get().as_micros() as u64;
            Ok((t / half_period_us) % 2 == 0)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            self.is_high().map(|h| !h)
        }
    }

    fn measure(hz: u64, window: Duration) -> u32 {
        let time = Rc::new(Cell::new(Duration::ZERO));
        let mut clock = StepClock {
            time: time.clone(),
            step: Duration::from_micros(10),
        };
        let mut pin = SquareWave { time, hz };
        count_falling_edges(&mut pin, &mut clock, window).unwrap()
    }

    #[test]
    fn test_counts_falling_edges_in_window() {
        assert_eq!(measure(1000, Duration::from_millis(100)), 100);
        assert_eq!(measure(2500, Duration::from_millis(100)), 250);
    }

    #[test]
    fn test_dark_pin_yields_zero() {
        assert_eq!(measure(0, Duration::from_millis(100)), 0);
    }

    #[test]
    fn test_zero_window_yields_zero() {
        assert_eq!(measure(1000, Duration::ZERO), 0);
    }

    #[test]
    fn test_frequency_conversion() {
        assert_eq!(frequency_hz(100, Duration::from_millis(100)), 1000.0);
        assert_eq!(frequency_hz(0, Duration::from_millis(100)), 0.0);
        assert_eq!(frequency_hz(42, Duration::ZERO), 0.0);
    }
}
