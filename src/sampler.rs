use core::fmt;

use embedded_hal::{delay::DelayNs, digital::PinState};
use heapless::Vec;

use crate::error::DhtError;
use crate::line::{DataLine, Direction};

/// How long the host holds the line low to wake the sensor, in milliseconds.
pub const WAKE_LOW_MS: u32 = 18;

/// How long the host releases the line high before listening, in microseconds.
pub const WAKE_HIGH_US: u32 = 40;

/// Maximum number of edges recorded in one scan.
///
/// Two response edges, the first bit's separator, 80 data edges, the
/// trailing edge and one spare.
pub const MAX_EDGES: usize = 85;

/// Ticks after which a held level counts as a timeout.
pub const TICK_CEILING: u8 = 255;

/// One observed level change: the level the line switched to and how many
/// ticks the previous level was held.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub level: PinState,
    pub ticks: u8,
}

impl Edge {
    pub fn new(level: PinState, ticks: u8) -> Self {
        Self { level, ticks }
    }
}

/// Timing trace of one scan of the line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawTrace {
    edges: Vec<Edge, MAX_EDGES>,
    timed_out: bool,
}

impl RawTrace {
    /// Builds a trace from recorded edges, keeping at most [`MAX_EDGES`].
    pub fn from_edges(edges: &[Edge], timed_out: bool) -> Self {
        let mut trace = Self {
            edges: Vec::new(),
            timed_out,
        };
        for &edge in edges.iter().take(MAX_EDGES) {
            let _ = trace.edges.push(edge);
        }
        trace
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Whether the scan ended because a level was held past [`TICK_CEILING`].
    ///
    /// A complete transmission normally ends this way too: the sensor
    /// releases the line and it idles high.
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }
}

/// Renders the trace as `_n/¯` for rising and `¯n\_` for falling edges.
impl fmt::Display for RawTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for edge in &self.edges {
            match edge.level {
                PinState::High => write!(f, "_{}/¯", edge.ticks)?,
                PinState::Low => write!(f, "¯{}\\_", edge.ticks)?,
            }
        }
        if self.timed_out {
            f.write_str("…")?;
        }
        Ok(())
    }
}

/// Wakes the sensor and records how long each level is held.
///
/// Blocks for the whole transmission: the wake signal plus at most
/// [`MAX_EDGES`] holds of up to [`TICK_CEILING`] ticks each.
pub fn sample<L, D, E>(line: &mut L, delay: &mut D) -> Result<RawTrace, DhtError<E>>
where
    L: DataLine<Error = E>,
    D: DelayNs,
{
    wake(line, delay)?;

    let mut trace = RawTrace::default();
    let mut previous = PinState::High;
    for _ in 0..MAX_EDGES {
        match hold(line, delay, previous)? {
            Some(edge) => {
                previous = edge.level;
                // capacity matches the loop bound
                let _ = trace.edges.push(edge);
            }
            None => {
                trace.timed_out = true;
                break;
            }
        }
    }
    Ok(trace)
}

/// Sends the start signal: low for [`WAKE_LOW_MS`], high for [`WAKE_HIGH_US`],
/// then hands the line over to the sensor.
fn wake<L, D, E>(line: &mut L, delay: &mut D) -> Result<(), DhtError<E>>
where
    L: DataLine<Error = E>,
    D: DelayNs,
{
    line.set_direction(Direction::Output)?;
    line.set_low()?;
    delay.delay_ms(WAKE_LOW_MS);
    line.set_high()?;
    delay.delay_us(WAKE_HIGH_US);
    line.set_direction(Direction::Input)?;
    Ok(())
}

/// Polls the line once per microsecond until it leaves `previous`.
///
/// Returns `None` once the level has been held for [`TICK_CEILING`] ticks.
fn hold<L, D, E>(line: &mut L, delay: &mut D, previous: PinState) -> Result<Option<Edge>, E>
where
    L: DataLine<Error = E>,
    D: DelayNs,
{
    let mut ticks: u8 = 0;
    loop {
        let level = PinState::from(line.is_high()?);
        if level != previous {
            return Ok(Some(Edge::new(level, ticks)));
        }
        ticks += 1;
        delay.delay_us(1);
        if ticks == TICK_CEILING {
            return Ok(None);
        }
    }
}
