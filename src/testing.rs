//! Scripted data line for driving the decoder without hardware.

use std::collections::VecDeque;

use core::convert::Infallible;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};

use crate::line::{DataLine, Direction};

/// Ticks the sensor holds its response and separator levels.
pub(crate) const RESPONSE_TICKS: u8 = 80;
pub(crate) const SEPARATOR_TICKS: u8 = 50;
pub(crate) const ZERO_TICKS: u8 = 26;
pub(crate) const ONE_TICKS: u8 = 70;

/// Replays a sequence of held levels, one script per acquisition attempt.
///
/// A hold `(level, ticks)` makes the sampler count exactly `ticks` for that
/// level. After a script runs out, the line idles at its last level.
pub(crate) struct ScriptedLine {
    attempts: VecDeque<Vec<(PinState, u8)>>,
    reads: VecDeque<PinState>,
    idle: PinState,
    pub directions: Vec<Direction>,
    pub writes: Vec<PinState>,
}

impl ScriptedLine {
    pub fn new(holds: Vec<(PinState, u8)>) -> Self {
        Self::with_attempts(vec![holds])
    }

    pub fn with_attempts(attempts: Vec<Vec<(PinState, u8)>>) -> Self {
        Self {
            attempts: attempts.into(),
            reads: VecDeque::new(),
            idle: PinState::High,
            directions: Vec::new(),
            writes: Vec::new(),
        }
    }

    fn load_next(&mut self) {
        self.reads.clear();
        self.idle = PinState::High;
        let Some(holds) = self.attempts.pop_front() else {
            return;
        };
        for (i, &(level, ticks)) in holds.iter().enumerate() {
            // Every hold after the first also supplies the read that ended
            // the previous one.
            let count = if i == 0 { ticks as usize } else { ticks as usize + 1 };
            self.reads.extend(std::iter::repeat_n(level, count));
            self.idle = level;
        }
    }
}

impl ErrorType for ScriptedLine {
    type Error = Infallible;
}

impl InputPin for ScriptedLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let level = self.reads.pop_front().unwrap_or(self.idle);
        Ok(level == PinState::High)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.is_high()?)
    }
}

impl OutputPin for ScriptedLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.writes.push(PinState::Low);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.writes.push(PinState::High);
        Ok(())
    }
}

impl DataLine for ScriptedLine {
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        if direction == Direction::Output {
            self.load_next();
        }
        self.directions.push(direction);
        Ok(())
    }
}

/// Holds of a complete, well-formed transmission of `bytes`.
pub(crate) fn transmission(bytes: [u8; 5]) -> Vec<(PinState, u8)> {
    let mut holds = vec![
        (PinState::High, 20),
        (PinState::Low, RESPONSE_TICKS),
        (PinState::High, RESPONSE_TICKS),
    ];
    for byte in bytes {
        for shift in (0..8).rev() {
            let bit = (byte >> shift) & 1;
            holds.push((PinState::Low, SEPARATOR_TICKS));
            holds.push((PinState::High, if bit == 1 { ONE_TICKS } else { ZERO_TICKS }));
        }
    }
    holds.push((PinState::Low, SEPARATOR_TICKS));
    holds.push((PinState::High, 0));
    holds
}
