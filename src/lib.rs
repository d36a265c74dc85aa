//! DHT11/DHT22 Protocol Decoder
//!
//! This crate decodes the single-wire timing protocol of the DHT11 and DHT22
//! (AM2302) temperature and humidity sensors, built on top of the
//! [`embedded-hal`] traits.
//!
//! One acquisition attempt wakes the sensor, records how long the line holds
//! each level, rebuilds the 40 payload bits from those durations, checks the
//! checksum and converts the bytes into a timestamped [`Reading`]. Attempts
//! can be retried a bounded number of times with [`Dht::acquire`].
//!
//! # Features
//! - Blocking synchronous API using `embedded-hal` traits
//! - Designed for `no_std` environments
//! - Optional logging support via `defmt` or `log`
//!
//! # Dependencies
//! This driver depends on the following `embedded-hal` traits:
//! - [`InputPin`] and [`OutputPin`] for GPIO access, through [`DataLine`]
//! - [`DelayNs`] for accurate timing
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` and logs through `defmt`
//! - `log`: Logs through the `log` facade
//! - `std`: Host clock ([`clock::SystemClock`]) and logger configuration
//! - `rpi`: The `dht-logger` binary for Raspberry Pi style hosts
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//! [`InputPin`]: embedded_hal::digital::InputPin
//! [`OutputPin`]: embedded_hal::digital::OutputPin
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[macro_use]
mod fmt;

pub mod clock;
#[cfg(any(test, feature = "std"))]
pub mod config;
pub mod dht;
pub mod error;
pub mod line;
pub mod payload;
pub mod reading;
pub mod retry;
pub mod sampler;

#[cfg(test)]
mod testing;

pub use clock::Clock;
pub use dht::Dht;
pub use error::DhtError;
pub use line::{DataLine, Direction, OpenDrain};
pub use payload::Payload;
pub use reading::{Model, Reading};
pub use retry::{DhtSensor, RetryPolicy, acquire_with_retries};
pub use sampler::RawTrace;
