use core::fmt;

/// Possible errors from one acquisition attempt.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DhtError<E> {
    /// The line held one level past the tick ceiling before any bit was seen.
    Timeout,
    /// Too few data bits were witnessed for the payload to be interpreted.
    StructuralInvalid {
        /// Number of data bits reconstructed before the scan ended.
        witnessed: usize,
    },
    /// Checksum did not match the received data.
    ChecksumMismatch {
        /// Trailer byte sent by the sensor.
        expected: u8,
        /// Truncated sum of the four data bytes.
        calculated: u8,
    },
    /// Error from the GPIO pin (input/output).
    PinError(E),
}

impl<E> DhtError<E> {
    /// Short description of the failure, without the pin error payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            DhtError::Timeout => "timed out waiting for a level change",
            DhtError::StructuralInvalid { .. } => "too few bits witnessed",
            DhtError::ChecksumMismatch { .. } => "checksum mismatch",
            DhtError::PinError(_) => "pin error",
        }
    }
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::PinError(value)
    }
}

impl<E: fmt::Debug> fmt::Display for DhtError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DhtError::Timeout => f.write_str("Timed out waiting for the sensor"),
            DhtError::StructuralInvalid { witnessed } => {
                write!(f, "Only {witnessed} of 40 bits witnessed")
            }
            DhtError::ChecksumMismatch {
                expected,
                calculated,
            } => write!(
                f,
                "Data read was corrupt (expected checksum {expected:#04x}, calculated {calculated:#04x})"
            ),
            DhtError::PinError(err) => write!(f, "HAL pin error: {err:?}"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for DhtError<E> {}
