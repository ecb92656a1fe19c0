//! In-memory link between the two roles.
//!
//! The loopback stands in for the real transmission layer: packets emitted
//! by the encoder are queued and later observed by the decoder in the same
//! order. Ordering is the only channel of information, so the link is
//! strictly FIFO; the one impairment it can simulate is a capture cut
//! (delivery stops after a configurable number of packets), which drives
//! the incomplete-message paths.
//!
//! # Thread Safety
//!
//! Not thread-safe. Each role runs on a single logical thread of control;
//! the loopback is owned by one session at a time.

use crate::error::Result;
use crate::packet::{Packet, PacketSink, PacketStream};
use std::collections::VecDeque;

/// FIFO link implementing both collaborator sides.
#[derive(Debug, Default)]
pub struct Loopback {
    queue: VecDeque<Packet>,
    cancelled: bool,
    deliver_cap: Option<u64>,

    // Statistics
    packets_emitted: u64,
    packets_delivered: u64,
}

impl Loopback {
    /// Create an unimpaired loopback link.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loopback that stops delivering after `cap` packets.
    ///
    /// Emission is unaffected; the cap models the receiver's capture ending
    /// mid-stream.
    pub fn with_deliver_cap(cap: u64) -> Self {
        Self {
            deliver_cap: Some(cap),
            ..Self::default()
        }
    }

    /// Packets queued but not yet observed.
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Get statistics about link behavior.
    pub fn stats(&self) -> LoopbackStats {
        LoopbackStats {
            packets_emitted: self.packets_emitted,
            packets_delivered: self.packets_delivered,
            packets_pending: self.queue.len(),
        }
    }
}

impl PacketSink for Loopback {
    fn emit(&mut self, packet: Packet) -> Result<()> {
        self.packets_emitted += 1;
        self.queue.push_back(packet);
        Ok(())
    }
}

impl PacketStream for Loopback {
    fn next_packet(&mut self) -> Option<Packet> {
        if self.cancelled {
            return None;
        }
        if let Some(cap) = self.deliver_cap {
            if self.packets_delivered >= cap {
                return None;
            }
        }
        let packet = self.queue.pop_front()?;
        self.packets_delivered += 1;
        Some(packet)
    }

    fn cancel(&mut self) {
        self.cancelled = true;
        self.queue.clear();
    }
}

/// Statistics about loopback behavior.
#[derive(Debug, Clone, Copy)]
pub struct LoopbackStats {
    /// Packets accepted from the encoder
    pub packets_emitted: u64,

    /// Packets handed to the decoder
    pub packets_delivered: u64,

    /// Packets still queued
    pub packets_pending: usize,
}
