//! Error types for the flagwire system.
//!
//! All operations return structured errors rather than panicking.
//! Configuration errors are rejected before any transmission or reception
//! begins; stream-level problems surface as final decoder status rather
//! than mid-stream failures.

use thiserror::Error;

/// Top-level error type for all operations in the system.
///
/// Each variant corresponds to a specific failure domain:
/// - Config: invalid channel parameters, fatal to the call
/// - Message: plaintext that cannot be framed for transmission
/// - Decode: a receive session that did not reach a complete message
/// - I/O: log file operations
#[derive(Debug, Error)]
pub enum Error {
    /// Channel parameters out of range (caller must supply valid values)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Message cannot be framed (missing sentinel, unencodable character)
    #[error("message error: {0}")]
    Message(#[from] MessageError),

    /// Receive-side failure (incomplete message, malformed group)
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// File I/O error (message logs)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Channel parameter validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Fewer than two packets per message bit leaves no room for a threshold
    #[error("packets_per_bit must be at least 2, got {got}")]
    PacketsPerBitTooSmall { got: u32 },

    /// Encoded values are held in 64-bit arithmetic; the group width is capped
    #[error("packets_per_bit must be at most {max}, got {got}")]
    PacketsPerBitTooLarge { got: u32, max: u32 },

    /// Threshold must split the value space into two non-empty sub-ranges
    #[error("bit_one_threshold must be in (0, {space}), got {got}")]
    ThresholdOutOfRange { got: u64, space: u64 },
}

/// Message framing errors.
#[derive(Debug, Error)]
pub enum MessageError {
    /// Every transmitted message must end with the sentinel character
    #[error("message does not contain the sentinel terminator")]
    MissingSentinel,

    /// Characters are framed as 8 bits; code points above 0xFF cannot be sent
    #[error("character {ch:?} (U+{code:04X}) does not fit in 8 bits")]
    UnencodableChar { ch: char, code: u32 },
}

/// Receive-side errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The packet stream ended (or was cut off) before the sentinel arrived
    #[error(
        "incomplete message: {chars_decoded} chars decoded, \
         {pending_byte_bits} bits into the current byte, \
         {pending_group_bits} bits into the current group"
    )]
    Incomplete {
        chars_decoded: usize,
        pending_byte_bits: usize,
        pending_group_bits: usize,
    },

    /// A group handed to the codec did not have exactly packets_per_bit bits
    #[error("group length mismatch: expected {expected} bits, got {actual}")]
    GroupLength { expected: usize, actual: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
