use embedded_hal::delay::DelayNs;

use crate::clock::Clock;
use crate::error::DhtError;
use crate::line::DataLine;
use crate::payload;
use crate::reading::{Model, Reading};
use crate::retry::{self, DhtSensor, RetryPolicy};
use crate::sampler;

/// Driver for a DHT11 or DHT22 sensor on a single data line.
pub struct Dht<PIN, DELAY, CLOCK> {
    pin: PIN,
    delay: DELAY,
    clock: CLOCK,
    model: Model,
}

impl<PIN, DELAY, CLOCK, E> Dht<PIN, DELAY, CLOCK>
where
    PIN: DataLine<Error = E>,
    DELAY: DelayNs,
    CLOCK: Clock,
{
    /// Creates a new instance of the driver.
    ///
    /// # Arguments
    ///
    /// * `pin` - The GPIO line connected to the sensor's data pin.
    /// * `delay` - A delay provider implementing the `DelayNs` trait.
    /// * `clock` - Wall-clock source used to stamp readings.
    /// * `model` - How the sensor encodes its data bytes.
    pub fn new(pin: PIN, delay: DELAY, clock: CLOCK, model: Model) -> Self {
        Dht {
            pin,
            delay,
            clock,
            model,
        }
    }

    /// Makes one acquisition attempt.
    ///
    /// Wakes the sensor, records the timing of its transmission, rebuilds
    /// the five payload bytes and validates the checksum. The reading is
    /// stamped as soon as the checksum has passed.
    ///
    /// Blocks the calling thread for the whole transmission, so it must not
    /// share a thread with latency-sensitive work.
    ///
    /// # Returns
    ///
    /// * `Ok(Reading)` if the read is successful and the checksum is valid.
    /// * `Err(DhtError)` if a communication or checksum error occurs.
    pub fn read(&mut self) -> Result<Reading, DhtError<E>> {
        let trace = sampler::sample(&mut self.pin, &mut self.delay)?;
        debug!(
            "scan captured {} edges, timed out: {}",
            trace.len(),
            trace.timed_out()
        );
        #[cfg(feature = "log")]
        log::trace!("{}", trace);

        let payload = payload::decode(&trace)?;
        Ok(Reading::assemble(&payload, self.model, self.clock.now()))
    }

    /// Reads the sensor, retrying failed attempts per `policy`.
    ///
    /// Returns `None` when every attempt failed.
    pub fn acquire(&mut self, policy: RetryPolicy) -> Option<Reading> {
        retry::acquire_with_retries(self, policy)
    }

    /// Consumes the driver and returns its parts.
    pub fn release(self) -> (PIN, DELAY, CLOCK) {
        (self.pin, self.delay, self.clock)
    }
}

impl<PIN, DELAY, CLOCK, E> DhtSensor for Dht<PIN, DELAY, CLOCK>
where
    PIN: DataLine<Error = E>,
    DELAY: DelayNs,
    CLOCK: Clock,
{
    type Error = E;

    fn read(&mut self) -> Result<Reading, DhtError<E>> {
        Dht::read(self)
    }

    fn pause_ms(&mut self, ms: u16) {
        self.delay.delay_ms(u32::from(ms));
    }
}
