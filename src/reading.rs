use core::fmt;
use core::str::FromStr;

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::payload::Payload;

/// How the four data bytes encode humidity and temperature.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Model {
    /// Integer byte followed by a tenths byte, for each quantity.
    Dht11,
    /// Big-endian 16-bit tenths, for each quantity.
    #[default]
    Dht22,
}

impl Model {
    /// Converts the four data bytes to `(humidity, temperature)`.
    ///
    /// Bit 7 of the temperature byte marks a negative temperature.
    pub fn convert(self, data: [u8; 4]) -> (f32, f32) {
        let [hum_hi, hum_lo, temp_hi, temp_lo] = data;

        let is_temp_negative = (temp_hi >> 7) != 0;
        let temp_hi = temp_hi & 0b0111_1111;

        let (humidity, mut temperature) = match self {
            Model::Dht11 => (
                f32::from(hum_hi) + f32::from(hum_lo) / 10.0,
                f32::from(temp_hi) + f32::from(temp_lo) / 10.0,
            ),
            Model::Dht22 => (
                f32::from(u16::from_be_bytes([hum_hi, hum_lo])) / 10.0,
                f32::from(u16::from_be_bytes([temp_hi, temp_lo])) / 10.0,
            ),
        };
        if is_temp_negative {
            temperature = -temperature;
        }

        (humidity, temperature)
    }
}

/// Parses `dht11`, `dht22` or `am2302`, ignoring case.
impl FromStr for Model {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("dht11") {
            Ok(Model::Dht11)
        } else if s.eq_ignore_ascii_case("dht22") || s.eq_ignore_ascii_case("am2302") {
            Ok(Model::Dht22)
        } else {
            Err(())
        }
    }
}

/// A validated humidity and temperature measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    timestamp: NaiveDateTime,
    humidity: f32,
    temperature: f32,
}

impl Reading {
    /// Converts a checksum-validated payload into a reading taken at `timestamp`.
    pub fn assemble(payload: &Payload, model: Model, timestamp: NaiveDateTime) -> Self {
        let (humidity, temperature) = model.convert(payload.data());
        Self {
            timestamp,
            humidity,
            temperature,
        }
    }

    /// Local time at which the payload passed validation.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Relative humidity in percent.
    pub fn humidity(&self) -> f32 {
        self.humidity
    }

    /// Temperature in degrees Celsius.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// The log line for this reading: `YYYY-MM-DD;HH:MM:SS;humidity;temperature\n`.
    pub fn record(&self) -> Record<'_> {
        Record(self)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Reading {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Reading {{ humidity: {}, temperature: {} }}",
            self.humidity,
            self.temperature
        )
    }
}

/// Semicolon-delimited log line of a [`Reading`], newline included.
pub struct Record<'a>(&'a Reading);

impl fmt::Display for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts = self.0.timestamp;
        writeln!(
            f,
            "{:04}-{:02}-{:02};{:02}:{:02}:{:02};{:.1};{:.1}",
            ts.year(),
            ts.month(),
            ts.day(),
            ts.hour(),
            ts.minute(),
            ts.second(),
            self.0.humidity,
            self.0.temperature,
        )
    }
}
