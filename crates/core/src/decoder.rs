//! Decoder state machine: demodulates a stream of observed packets back
//! into bits, bytes, and characters.
//!
//! The decoder owns three accumulators, each folded into the next level up
//! when it reaches its target length:
//!
//! - `bits`: physical bits, folded into one message bit per
//!   `packets_per_bit` packets
//! - `byte`: message bits, folded into one character per 8 bits
//! - `message`: decoded characters
//!
//! Decoding the sentinel character drives the Terminal state. Terminal is
//! absorbing: further packets are ignored. A stream that ends before the
//! sentinel leaves the decoder in a non-terminal state, surfaced as an
//! incomplete-message error rather than silently ignored.
//!
//! # Thread Safety
//!
//! Not thread-safe. The accumulators are exclusively owned by one decoding
//! session; the reception collaborator delivers packets on a single logical
//! thread of control, so no locking is needed.

use crate::codec::ChannelParams;
use crate::error::{DecodeError, Result};
use crate::message::{self, MessageSink, BITS_PER_CHAR, SENTINEL};
use crate::packet::PacketStream;
use std::time::{Duration, Instant};

/// What one pushed physical bit produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Accumulating; no character completed yet
    Pending,

    /// A non-sentinel character was decoded and appended
    Char(char),

    /// The sentinel was decoded; the message is complete
    Terminal,
}

/// Receive-side state machine. One instance per decoding session.
#[derive(Debug)]
pub struct Decoder {
    params: ChannelParams,

    /// Physical bits of the current group (up to packets_per_bit)
    bits: Vec<bool>,

    /// Message bits of the current character (up to 8)
    byte: Vec<bool>,

    /// Characters decoded so far
    message: String,

    terminal: bool,
}

impl Decoder {
    /// Create a decoder for one session.
    pub fn new(params: ChannelParams) -> Self {
        Self {
            params,
            bits: Vec::with_capacity(params.packets_per_bit() as usize),
            byte: Vec::with_capacity(BITS_PER_CHAR),
            message: String::new(),
            terminal: false,
        }
    }

    /// Feed one physical bit (the flag of one observed packet).
    ///
    /// After Terminal this is a no-op returning `Progress::Terminal`.
    pub fn push(&mut self, physical_bit: bool) -> Progress {
        if self.terminal {
            return Progress::Terminal;
        }

        self.bits.push(physical_bit);
        if self.bits.len() < self.params.packets_per_bit() as usize {
            return Progress::Pending;
        }

        // Group complete: fold into a value and classify against the threshold.
        let value = self
            .bits
            .iter()
            .fold(0u64, |acc, &bit| (acc << 1) | bit as u64);
        self.bits.clear();
        self.byte.push(self.params.decode_value(value));

        if self.byte.len() < BITS_PER_CHAR {
            return Progress::Pending;
        }

        // Byte complete: fold into a character.
        let mut byte = [false; BITS_PER_CHAR];
        byte.copy_from_slice(&self.byte);
        self.byte.clear();

        let ch = message::byte_char(&byte);
        self.message.push(ch);

        if ch == SENTINEL {
            self.terminal = true;
            Progress::Terminal
        } else {
            Progress::Char(ch)
        }
    }

    /// Whether the sentinel has been decoded.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Characters decoded so far (trailing sentinel included at Terminal).
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Physical bits accumulated toward the current group.
    pub fn pending_group_bits(&self) -> usize {
        self.bits.len()
    }

    /// Message bits accumulated toward the current character.
    pub fn pending_byte_bits(&self) -> usize {
        self.byte.len()
    }

    /// The complete message, or an incomplete-message error if the sentinel
    /// never arrived.
    pub fn try_message(&self) -> Result<&str> {
        if self.terminal {
            Ok(&self.message)
        } else {
            Err(self.incomplete().into())
        }
    }

    fn incomplete(&self) -> DecodeError {
        DecodeError::Incomplete {
            chars_decoded: self.message.chars().count(),
            pending_byte_bits: self.byte.len(),
            pending_group_bits: self.bits.len(),
        }
    }
}

/// Options for a receive session.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReceiveOptions {
    /// Give up if Terminal is not reached within this wall-clock bound.
    /// `None` blocks until the stream ends (the base contract).
    pub timeout: Option<Duration>,
}

/// Result of one completed receive.
#[derive(Debug, Clone)]
pub struct ReceiveReport {
    /// The decoded message, trailing sentinel included
    pub message: String,

    /// Packets consumed from the stream (after conversation filtering)
    pub packets_consumed: u64,
}

/// Drive one full receive: pull packets until Terminal, persist the message,
/// cancel the stream.
///
/// The stream is expected to be pre-filtered to the monitored conversation
/// (wrap it in [`crate::packet::FilteredStream`]); every packet it yields
/// contributes exactly one physical bit, in arrival order.
///
/// On Terminal the decoded message is handed to `sink` and the stream is
/// cancelled so the underlying capture resource is released deterministically.
/// If the stream ends, or the optional timeout elapses, before Terminal, the
/// stream is cancelled and the session fails with the incomplete-message
/// error.
pub fn receive_message<S, K>(
    params: ChannelParams,
    stream: &mut S,
    sink: &mut K,
    options: ReceiveOptions,
) -> Result<ReceiveReport>
where
    S: PacketStream,
    K: MessageSink,
{
    let deadline = options.timeout.map(|t| Instant::now() + t);
    let mut decoder = Decoder::new(params);
    let mut packets_consumed = 0u64;

    loop {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                stream.cancel();
                return Err(decoder.incomplete().into());
            }
        }

        let Some(packet) = stream.next_packet() else {
            stream.cancel();
            return Err(decoder.incomplete().into());
        };
        packets_consumed += 1;

        if decoder.push(packet.fin) == Progress::Terminal {
            sink.persist(decoder.message())?;
            stream.cancel();
            return Ok(ReceiveReport {
                message: decoder.message().to_string(),
                packets_consumed,
            });
        }
    }
}
