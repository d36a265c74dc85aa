use crate::error::DhtError;
use crate::sampler::RawTrace;

/// Edges of the sensor's response that precede the first data bit.
pub const HANDSHAKE_EDGES: usize = 4;

/// Pulses held longer than this many ticks decode as `1`.
pub const ONE_THRESHOLD: u8 = 60;

/// Bits in a complete payload.
pub const PAYLOAD_BITS: usize = 40;

/// Fewest witnessed bits for a payload to be interpreted at all.
pub const MIN_BITS: usize = 39;

/// The five bytes sent by the sensor.
///
/// `[humidity, humidity fraction, temperature, temperature fraction, checksum]`,
/// where bit 7 of the temperature byte is the sign flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Payload(pub [u8; 5]);

impl Payload {
    /// The four data bytes.
    pub fn data(&self) -> [u8; 4] {
        let [a, b, c, d, _] = self.0;
        [a, b, c, d]
    }

    /// The trailer byte sent by the sensor.
    pub fn checksum(&self) -> u8 {
        self.0[4]
    }

    pub fn is_valid(&self) -> bool {
        checksum(self.data()) == self.checksum()
    }
}

/// Truncated sum of the four data bytes.
pub fn checksum(data: [u8; 4]) -> u8 {
    let sum: u32 = data.iter().map(|&b| u32::from(b)).sum();
    (sum & 0xff) as u8
}

/// Rebuilds the payload from a trace.
///
/// Skips the handshake, then reads every other edge: each of those holds the
/// duration of a data pulse. Returns the payload and the number of bits
/// witnessed, which never exceeds [`PAYLOAD_BITS`].
pub fn reconstruct(trace: &RawTrace) -> (Payload, usize) {
    let mut bytes = [0u8; 5];
    let mut witnessed = 0;

    for edge in trace.edges().iter().skip(HANDSHAKE_EDGES).step_by(2) {
        if witnessed == PAYLOAD_BITS {
            break;
        }
        let byte = &mut bytes[witnessed / 8];
        *byte <<= 1;
        if edge.ticks > ONE_THRESHOLD {
            *byte |= 1;
        }
        witnessed += 1;
    }

    (Payload(bytes), witnessed)
}

/// Reconstructs and validates a payload.
///
/// A scan that timed out before any bit arrived is a [`DhtError::Timeout`];
/// any other scan with fewer than [`MIN_BITS`] bits is structurally invalid.
pub fn decode<E>(trace: &RawTrace) -> Result<Payload, DhtError<E>> {
    let (payload, witnessed) = reconstruct(trace);

    if witnessed < MIN_BITS {
        return Err(if trace.timed_out() && witnessed == 0 {
            DhtError::Timeout
        } else {
            DhtError::StructuralInvalid { witnessed }
        });
    }

    let calculated = checksum(payload.data());
    if calculated != payload.checksum() {
        return Err(DhtError::ChecksumMismatch {
            expected: payload.checksum(),
            calculated,
        });
    }

    Ok(payload)
}
