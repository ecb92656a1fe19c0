//! Packet model and the conversation filter.
//!
//! The wire unit is a single packet whose only semantically relevant field
//! is one boolean header flag: flag set carries physical bit 1, flag clear
//! carries physical bit 0. Source and destination identities exist so the
//! receive side can filter the capture down to the monitored conversation;
//! every other header and payload field is left to the transmission layer.
//!
//! # Filtering contract
//!
//! Every packet admitted by the filter carries exactly one physical bit,
//! in arrival order. The filter matches on source identity only; there is
//! no stride or skip heuristic.

/// One packet descriptor as seen by the protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Sending host identity
    pub src: String,

    /// Destination host identity
    pub dst: String,

    /// The covert flag: true carries physical bit 1, false carries bit 0
    pub fin: bool,
}

impl Packet {
    pub fn new(src: impl Into<String>, dst: impl Into<String>, fin: bool) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            fin,
        }
    }
}

/// Transmission collaborator: accepts outbound packets, one at a time.
///
/// Exposed only to the encoder. Emission is synchronous; the call returns
/// once the packet is handed to the transport, preserving strict ordering.
pub trait PacketSink {
    fn emit(&mut self, packet: Packet) -> crate::error::Result<()>;
}

/// Reception collaborator: a live, ordered sequence of inbound packets.
///
/// Exposed only to the decoder. `next_packet` returns `None` when the
/// capture is exhausted or after cancellation. `cancel` requests that
/// delivery stop and the underlying capture resource be released; it is
/// idempotent.
pub trait PacketStream {
    fn next_packet(&mut self) -> Option<Packet>;
    fn cancel(&mut self);
}

/// Identifies the conversation the decoder is monitoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationFilter {
    /// Expected source host of covert packets
    pub source: String,
}

impl ConversationFilter {
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Whether a packet belongs to the monitored conversation.
    pub fn admits(&self, packet: &Packet) -> bool {
        packet.src == self.source
    }
}

/// A stream wrapper that drops packets outside the monitored conversation.
///
/// Unrelated traffic is transport noise, not an error: it is silently
/// skipped and never reaches the decoder state machine.
pub struct FilteredStream<S> {
    inner: S,
    filter: ConversationFilter,
}

impl<S: PacketStream> FilteredStream<S> {
    pub fn new(inner: S, filter: ConversationFilter) -> Self {
        Self { inner, filter }
    }

    /// Consume the wrapper and return the underlying stream.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: PacketStream> PacketStream for FilteredStream<S> {
    fn next_packet(&mut self) -> Option<Packet> {
        loop {
            let packet = self.inner.next_packet()?;
            if self.filter.admits(&packet) {
                return Some(packet);
            }
        }
    }

    fn cancel(&mut self) {
        self.inner.cancel();
    }
}
