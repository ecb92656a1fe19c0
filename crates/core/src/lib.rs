//! flagwire-core: covert messaging over a single TCP header flag
//!
//! This library implements a covert channel that smuggles a message between
//! two endpoints by modulating one boolean header flag across a sequence of
//! otherwise-unremarkable packets:
//!
//! - Each message bit is encoded as `packets_per_bit` packets via a
//!   randomized threshold scheme (see `codec`)
//! - The encoder emits packets strictly in order; ordering is the only
//!   channel of information
//! - The decoder demodulates the observed stream back into bits, bytes,
//!   and characters, terminating on the sentinel `.`
//!
//! # Architecture
//!
//! - `codec`: threshold codec, the pure bit <-> physical-bits mapping
//! - `message`: character framing, sentinel, source/sink collaborators
//! - `packet`: packet model, emit/observe collaborators, conversation filter
//! - `encoder`: drives a full send
//! - `decoder`: receive-side state machine and session loop
//! - `network`: in-memory loopback link for tests and the CLI driver
//! - `metrics`: observable session behavior
//!
//! # Design Principles
//!
//! - **No panics**: all errors are structured and recoverable
//! - **Deterministic**: seeded randomness makes sessions reproducible
//! - **Explicit state**: the decoder is an addressable state machine, not
//!   callback-captured mutable state
//! - **Checked completion**: callers distinguish Terminal from a truncated
//!   stream; an incomplete message is never silently dropped

pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod message;
pub mod metrics;
pub mod network;
pub mod packet;

// Re-export commonly used types
pub use codec::ChannelParams;
pub use decoder::{receive_message, Decoder, Progress, ReceiveOptions, ReceiveReport};
pub use encoder::{Encoder, SendReport};
pub use error::{Error, Result};
pub use message::{MessageSink, MessageSource, SENTINEL};
pub use packet::{ConversationFilter, FilteredStream, Packet, PacketSink, PacketStream};
