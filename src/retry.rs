//! Bounded retries around single acquisition attempts.
//!
//! [`RetryController`] holds the retry policy as a pure state machine:
//! it is fed the outcome of each attempt and answers with what to do next.
//! [`acquire_with_retries`] drives it against any [`DhtSensor`], which is
//! where the attempts and the pauses actually happen.

use crate::error::DhtError;
use crate::reading::Reading;

/// Number of retries per cycle when none is configured.
pub const DEFAULT_RETRIES: u8 = 3;

/// Pause between attempts when none is configured, in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u16 = 500;

/// How often, and how far apart, a failed acquisition is retried.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts made after the first one fails.
    pub retries: u8,
    /// Pause before each retry.
    pub retry_delay_ms: u16,
}

impl RetryPolicy {
    pub fn new(retries: u8, retry_delay_ms: u16) -> Self {
        Self {
            retries,
            retry_delay_ms,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRIES, DEFAULT_RETRY_DELAY_MS)
    }
}

/// State of one acquisition cycle.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryState {
    /// An attempt is due.
    Attempting,
    /// The last attempt failed and the retry delay is pending.
    Retrying,
    /// A validated reading was obtained.
    Success,
    /// Every attempt failed.
    Exhausted,
}

/// What the caller must do after reporting an attempt's outcome.
#[derive(Debug, PartialEq)]
pub enum Transition<E> {
    /// Hand this reading to the caller; the cycle is over.
    Success(Reading),
    /// Pause for `delay_ms`, call [`RetryController::resume`] and attempt again.
    Retry { delay_ms: u16, error: DhtError<E> },
    /// Give up; `error` is the last attempt's failure.
    Exhausted(DhtError<E>),
}

/// Retry state machine for one acquisition cycle.
#[derive(Clone, Debug)]
pub struct RetryController {
    policy: RetryPolicy,
    remaining: u8,
    attempts: u16,
    state: RetryState,
}

impl RetryController {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            remaining: policy.retries,
            attempts: 0,
            state: RetryState::Attempting,
        }
    }

    pub fn state(&self) -> RetryState {
        self.state
    }

    /// Attempts reported so far.
    pub fn attempts(&self) -> u16 {
        self.attempts
    }

    /// Retries still available.
    pub fn remaining(&self) -> u8 {
        self.remaining
    }

    /// Records the outcome of the attempt just made.
    ///
    /// An outcome reported while still [`RetryState::Retrying`] resumes
    /// implicitly. Once the cycle has ended, further outcomes are not
    /// counted: a failure answers [`Transition::Exhausted`] and a reading is
    /// passed through, without touching the remaining retries.
    pub fn advance<E>(&mut self, outcome: Result<Reading, DhtError<E>>) -> Transition<E> {
        match (self.state, outcome) {
            (RetryState::Success | RetryState::Exhausted, Ok(reading)) => Transition::Success(reading),
            (RetryState::Success | RetryState::Exhausted, Err(error)) => Transition::Exhausted(error),
            (_, outcome) => self.record(outcome),
        }
    }

    fn record<E>(&mut self, outcome: Result<Reading, DhtError<E>>) -> Transition<E> {
        self.attempts += 1;

        match outcome {
            Ok(reading) => {
                self.state = RetryState::Success;
                Transition::Success(reading)
            }
            Err(error) if self.remaining > 0 => {
                self.remaining -= 1;
                self.state = RetryState::Retrying;
                Transition::Retry {
                    delay_ms: self.policy.retry_delay_ms,
                    error,
                }
            }
            Err(error) => {
                self.state = RetryState::Exhausted;
                Transition::Exhausted(error)
            }
        }
    }

    /// Leaves [`RetryState::Retrying`] once the retry delay has elapsed.
    pub fn resume(&mut self) {
        if self.state == RetryState::Retrying {
            self.state = RetryState::Attempting;
        }
    }
}

/// A sensor that can make single acquisition attempts.
pub trait DhtSensor {
    /// Error type of the underlying pin.
    type Error;

    /// Makes one complete acquisition attempt.
    fn read(&mut self) -> Result<Reading, DhtError<Self::Error>>;

    /// Blocks the calling thread for `ms` milliseconds.
    fn pause_ms(&mut self, ms: u16);
}

/// Reads `sensor` until an attempt succeeds or the retries run out.
///
/// Every failure collapses to `None`; no partial reading is ever returned.
pub fn acquire_with_retries<S: DhtSensor>(sensor: &mut S, policy: RetryPolicy) -> Option<Reading> {
    let mut controller = RetryController::new(policy);
    loop {
        let outcome = sensor.read();
        match controller.advance(outcome) {
            Transition::Success(reading) => {
                debug!(
                    "reading after {} attempt(s): {} %RH, {} C",
                    controller.attempts(),
                    reading.humidity(),
                    reading.temperature()
                );
                return Some(reading);
            }
            Transition::Retry { delay_ms, error } => {
                debug!(
                    "attempt {} failed: {}, {} retries left",
                    controller.attempts(),
                    error.as_str(),
                    controller.remaining()
                );
                sensor.pause_ms(delay_ms);
                controller.resume();
            }
            Transition::Exhausted(error) => {
                warn!(
                    "no reading after {} attempt(s), last error: {}",
                    controller.attempts(),
                    error.as_str()
                );
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Payload;
    use crate::reading::Model;
    use chrono::NaiveDate;

    fn reading() -> Reading {
        let timestamp = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        Reading::assemble(&Payload([0x19, 0x00, 0x15, 0x03, 0x31]), Model::Dht11, timestamp)
    }

    /// Fails a fixed number of times, then succeeds.
    struct FlakySensor {
        failures: usize,
        attempts: usize,
        pauses: Vec<u16>,
    }

    impl FlakySensor {
        fn failing(failures: usize) -> Self {
            Self {
                failures,
                attempts: 0,
                pauses: Vec::new(),
            }
        }
    }

    impl DhtSensor for FlakySensor {
        type Error = ();

        fn read(&mut self) -> Result<Reading, DhtError<()>> {
            self.attempts += 1;
            if self.attempts <= self.failures {
                Err(DhtError::ChecksumMismatch {
                    expected: 0,
                    calculated: 1,
                })
            } else {
                Ok(reading())
            }
        }

        fn pause_ms(&mut self, ms: u16) {
            self.pauses.push(ms);
        }
    }

    #[test]
    fn test_no_retries_single_attempt() {
        let mut sensor = FlakySensor::failing(usize::MAX);
        assert_eq!(acquire_with_retries(&mut sensor, RetryPolicy::new(0, 500)), None);
        assert_eq!(sensor.attempts, 1);
        assert!(sensor.pauses.is_empty());
    }

    #[test]
    fn test_retries_exhausted() {
        let mut sensor = FlakySensor::failing(usize::MAX);
        assert_eq!(acquire_with_retries(&mut sensor, RetryPolicy::new(3, 500)), None);
        assert_eq!(sensor.attempts, 4);
        assert_eq!(sensor.pauses, [500, 500, 500]);
    }

    #[test]
    fn test_success_after_failures() {
        let mut sensor = FlakySensor::failing(2);
        let got = acquire_with_retries(&mut sensor, RetryPolicy::new(3, 250));
        assert_eq!(got, Some(reading()));
        assert_eq!(sensor.attempts, 3);
        assert_eq!(sensor.pauses, [250, 250]);
    }

    #[test]
    fn test_first_attempt_success_never_pauses() {
        let mut sensor = FlakySensor::failing(0);
        assert!(acquire_with_retries(&mut sensor, RetryPolicy::default()).is_some());
        assert!(sensor.pauses.is_empty());
    }

    #[test]
    fn test_controller_states() {
        let mut controller = RetryController::new(RetryPolicy::new(1, 100));
        assert_eq!(controller.state(), RetryState::Attempting);

        let transition = controller.advance::<()>(Err(DhtError::Timeout));
        assert_eq!(
            transition,
            Transition::Retry {
                delay_ms: 100,
                error: DhtError::Timeout
            }
        );
        assert_eq!(controller.state(), RetryState::Retrying);

        controller.resume();
        assert_eq!(controller.state(), RetryState::Attempting);

        let transition = controller.advance::<()>(Err(DhtError::StructuralInvalid { witnessed: 3 }));
        assert_eq!(
            transition,
            Transition::Exhausted(DhtError::StructuralInvalid { witnessed: 3 })
        );
        assert_eq!(controller.state(), RetryState::Exhausted);
        assert_eq!(controller.attempts(), 2);
    }

    #[test]
    fn test_controller_success() {
        let mut controller = RetryController::new(RetryPolicy::default());
        let transition = controller.advance::<()>(Ok(reading()));
        assert_eq!(transition, Transition::Success(reading()));
        assert_eq!(controller.state(), RetryState::Success);
        assert_eq!(controller.remaining(), DEFAULT_RETRIES);
    }

    #[test]
    fn test_controller_resumes_implicitly() {
        let mut controller = RetryController::new(RetryPolicy::new(2, 100));
        let _ = controller.advance::<()>(Err(DhtError::Timeout));
        assert_eq!(controller.state(), RetryState::Retrying);

        // No resume() between the two failures
        let transition = controller.advance::<()>(Err(DhtError::Timeout));
        assert_eq!(
            transition,
            Transition::Retry {
                delay_ms: 100,
                error: DhtError::Timeout
            }
        );
        assert_eq!(controller.attempts(), 2);
        assert_eq!(controller.remaining(), 0);
    }

    #[test]
    fn test_controller_terminal_states_are_sticky() {
        let mut controller = RetryController::new(RetryPolicy::new(0, 100));
        let _ = controller.advance::<()>(Err(DhtError::Timeout));
        assert_eq!(controller.state(), RetryState::Exhausted);

        let transition = controller.advance::<()>(Err(DhtError::StructuralInvalid { witnessed: 7 }));
        assert_eq!(
            transition,
            Transition::Exhausted(DhtError::StructuralInvalid { witnessed: 7 })
        );
        assert_eq!(controller.state(), RetryState::Exhausted);
        assert_eq!(controller.attempts(), 1);
        assert_eq!(controller.remaining(), 0);

        let mut controller = RetryController::new(RetryPolicy::new(3, 100));
        let _ = controller.advance::<()>(Ok(reading()));
        let transition = controller.advance::<()>(Err(DhtError::Timeout));
        assert_eq!(transition, Transition::Exhausted(DhtError::Timeout));
        assert_eq!(controller.state(), RetryState::Success);
        assert_eq!(controller.attempts(), 1);
        assert_eq!(controller.remaining(), 3);
    }
}
