//! Polls a DHT sensor on a Raspberry Pi and logs every valid reading.
//!
//! ## Usage
//!
//! ```bash
//! # Defaults: every 3 s, 3 retries 500 ms apart, stdout, BCM 17, DHT22 encoding
//! cargo run --features rpi --bin dht-logger
//!
//! # Every 10 s, 5 retries 250 ms apart, appended to a file
//! cargo run --features rpi --bin dht-logger -- 10000 5 250 /var/log/dht.csv
//! ```
//!
//! Each reading is one line `YYYY-MM-DD;HH:MM:SS;humidity;temperature`.
//! Cycles without a valid reading produce no line. Diagnostics go to
//! stderr, filtered by `RUST_LOG`.

use std::convert::Infallible;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use dht_decoder::clock::SystemClock;
use dht_decoder::config::{LoggerConfig, USAGE};
use dht_decoder::{DataLine, Dht, Direction};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use log::{info, warn};
use rppal::gpio::{Gpio, IoPin, Mode};

/// Data line on a Linux GPIO pin whose direction is switched explicitly.
struct GpioLine(IoPin);

impl ErrorType for GpioLine {
    type Error = Infallible;
}

impl InputPin for GpioLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_low())
    }
}

impl OutputPin for GpioLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_low();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_high();
        Ok(())
    }
}

impl DataLine for GpioLine {
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        self.0.set_mode(match direction {
            Direction::Input => Mode::Input,
            Direction::Output => Mode::Output,
        });
        Ok(())
    }
}

/// Busy-waits below a millisecond, sleeps the thread above.
///
/// `thread::sleep` overshoots by far more than the protocol's pulse widths.
struct HostDelay;

impl HostDelay {
    fn spin(duration: Duration) {
        let start = Instant::now();
        while start.elapsed() < duration {
            std::hint::spin_loop();
        }
    }
}

impl DelayNs for HostDelay {
    fn delay_ns(&mut self, ns: u32) {
        Self::spin(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        Self::spin(Duration::from_micros(u64::from(us)));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = LoggerConfig::from_args(std::env::args().skip(1))
        .with_context(|| format!("usage: dht-logger {USAGE}"))?;

    let gpio = Gpio::new().context("GPIO is unavailable")?;
    let pin = gpio
        .get(config.pin)
        .with_context(|| format!("cannot claim BCM pin {}", config.pin))?
        .into_io(Mode::Output);

    let mut sink: Box<dyn Write> = match &config.log_file {
        Some(path) => Box::new(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open {}", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };

    info!(
        "polling {:?} on BCM {} every {} ms, {} retries {} ms apart",
        config.model,
        config.pin,
        config.interval_ms,
        config.retry.retries,
        config.retry.retry_delay_ms
    );

    let mut dht = Dht::new(GpioLine(pin), HostDelay, SystemClock, config.model);
    loop {
        match dht.acquire(config.retry) {
            Some(reading) => {
                write!(sink, "{}", reading.record())?;
                sink.flush()?;
            }
            None => warn!("no reading this cycle"),
        }
        thread::sleep(Duration::from_millis(u64::from(config.interval_ms)));
    }
}
