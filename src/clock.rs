//! Wall-clock time for stamping readings.
//!
//! The decoder itself never reads the time; [`Dht`](crate::Dht) asks its
//! [`Clock`] once per reading, after the checksum has passed.

use chrono::NaiveDateTime;

/// Source of local wall-clock time used to stamp readings.
pub trait Clock {
    /// Current local date and time, without a zone.
    fn now(&mut self) -> NaiveDateTime;
}

/// Local time of the host operating system.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now(&mut self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}
