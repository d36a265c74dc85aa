//! The single data line shared by host and sensor.

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// Direction of the data line.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Host listens, the pull-up or the sensor drives the line.
    Input,
    /// Host drives the line.
    Output,
}

/// A GPIO line the decoder can both drive and sample.
///
/// Pins whose direction must be switched explicitly (as on a Linux GPIO
/// character device) implement [`DataLine::set_direction`]. Open-drain pins
/// that can be read while driven can use [`OpenDrain`].
pub trait DataLine: InputPin + OutputPin {
    /// Switches the line between driving and listening.
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;
}

/// Adapts an open-drain pin to [`DataLine`].
///
/// Releasing the line high is enough for the sensor to take over, so the
/// direction switch is a no-op.
pub struct OpenDrain<P> {
    pin: P,
}

impl<P> OpenDrain<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Returns the wrapped pin.
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: ErrorType> ErrorType for OpenDrain<P> {
    type Error = P::Error;
}

impl<P: InputPin> InputPin for OpenDrain<P> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.pin.is_high()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.pin.is_low()
    }
}

impl<P: OutputPin> OutputPin for OpenDrain<P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.set_low()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high()
    }
}

impl<P: InputPin + OutputPin> DataLine for OpenDrain<P> {
    fn set_direction(&mut self, _direction: Direction) -> Result<(), Self::Error> {
        Ok(())
    }
}
