//! Threshold codec: the pure mapping between a message bit and its
//! randomized physical encoding.
//!
//! One message bit becomes `packets_per_bit` physical bits. The encoder
//! draws an integer uniformly from one of two sub-ranges of `[0, 2^P)`,
//! split at `bit_one_threshold`:
//!
//! ```text
//! [0 ......... T)  encodes message bit 0
//! [T ...... 2^P)   encodes message bit 1
//! ```
//!
//! The drawn value is rendered as a fixed-width P-bit binary expansion,
//! MSB first, one physical bit per packet. Decoding folds the P observed
//! bits back into an integer and compares it against the threshold; the
//! sub-ranges partition the value space exactly, so the comparison inverts
//! the draw for every possible value.
//!
//! # Determinism
//!
//! Encoding takes any `rand::Rng`. Callers that need reproducible sessions
//! seed a `ChaCha8Rng` (see [`crate::encoder::Encoder`]); decoding is a pure
//! function of the observed bits.

use crate::error::{ConfigError, DecodeError, Result};
use rand::Rng;

/// Upper bound on the group width so encoded values fit in u64 arithmetic.
pub const MAX_PACKETS_PER_BIT: u32 = 32;

/// Validated channel parameters shared by both roles.
///
/// Sender and receiver must agree on both fields for decoding to be
/// meaningful; a mismatch is not detectable from the wire.
///
/// # Invariants
/// - `2 <= packets_per_bit <= MAX_PACKETS_PER_BIT`
/// - `0 < bit_one_threshold < 2^packets_per_bit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelParams {
    packets_per_bit: u32,
    bit_one_threshold: u64,
}

impl ChannelParams {
    /// Validate and construct channel parameters.
    ///
    /// # Errors
    /// - `ConfigError::PacketsPerBitTooSmall` if `packets_per_bit < 2`
    /// - `ConfigError::PacketsPerBitTooLarge` if `packets_per_bit > 32`
    /// - `ConfigError::ThresholdOutOfRange` unless `0 < threshold < 2^P`
    pub fn new(packets_per_bit: u32, bit_one_threshold: u64) -> Result<Self> {
        if packets_per_bit < 2 {
            return Err(ConfigError::PacketsPerBitTooSmall {
                got: packets_per_bit,
            }
            .into());
        }
        if packets_per_bit > MAX_PACKETS_PER_BIT {
            return Err(ConfigError::PacketsPerBitTooLarge {
                got: packets_per_bit,
                max: MAX_PACKETS_PER_BIT,
            }
            .into());
        }

        let space = 1u64 << packets_per_bit;
        if bit_one_threshold == 0 || bit_one_threshold >= space {
            return Err(ConfigError::ThresholdOutOfRange {
                got: bit_one_threshold,
                space,
            }
            .into());
        }

        Ok(Self {
            packets_per_bit,
            bit_one_threshold,
        })
    }

    /// Number of physical bits (packets) per message bit.
    pub fn packets_per_bit(&self) -> u32 {
        self.packets_per_bit
    }

    /// Boundary value splitting the value space.
    pub fn bit_one_threshold(&self) -> u64 {
        self.bit_one_threshold
    }

    /// Size of the encoded value space, `2^packets_per_bit`.
    pub fn value_space(&self) -> u64 {
        1u64 << self.packets_per_bit
    }

    /// Draw an encoded value for one message bit.
    ///
    /// Bit 0 draws uniformly from `[0, threshold)`; bit 1 from
    /// `[threshold, 2^P)`. Both sub-ranges are non-empty by construction,
    /// so the draw cannot fail.
    pub fn encode_bit<R: Rng + ?Sized>(&self, bit: bool, rng: &mut R) -> u64 {
        if bit {
            rng.gen_range(self.bit_one_threshold..self.value_space())
        } else {
            rng.gen_range(0..self.bit_one_threshold)
        }
    }

    /// Render an encoded value as its fixed-width P-bit expansion, MSB first.
    ///
    /// Each element maps to one packet: `true` means the header flag is set.
    /// Bits of `value` above the group width are ignored.
    pub fn expand(&self, value: u64) -> Vec<bool> {
        (0..self.packets_per_bit)
            .rev()
            .map(|shift| (value >> shift) & 1 == 1)
            .collect()
    }

    /// Classify an encoded value: values below the threshold decode to 0,
    /// values at or above it decode to 1 (the threshold itself is the first
    /// value of the "1" range).
    pub fn decode_value(&self, value: u64) -> bool {
        value >= self.bit_one_threshold
    }

    /// Decode a complete group of physical bits back into a message bit.
    ///
    /// Folds the bits MSB-first into an integer and classifies it with
    /// [`Self::decode_value`]. This exactly inverts `encode_bit`'s
    /// partition boundary.
    ///
    /// # Errors
    /// Returns `DecodeError::GroupLength` if the slice does not hold exactly
    /// `packets_per_bit` bits.
    pub fn decode_group(&self, physical_bits: &[bool]) -> Result<bool> {
        if physical_bits.len() != self.packets_per_bit as usize {
            return Err(DecodeError::GroupLength {
                expected: self.packets_per_bit as usize,
                actual: physical_bits.len(),
            }
            .into());
        }

        let value = physical_bits
            .iter()
            .fold(0u64, |acc, &bit| (acc << 1) | bit as u64);

        Ok(self.decode_value(value))
    }
}
