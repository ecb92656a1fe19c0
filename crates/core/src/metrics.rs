//! Metrics collection and reporting for a channel session.
//!
//! Observable insight into one send/receive session: packet volumes on both
//! sides, decode progress, whether the sentinel was reached, and timing.
//!
//! # Design
//!
//! Metrics are collected in a simple struct with explicit updates at each
//! stage. Both roles are single-threaded, so no synchronization is needed;
//! for multi-threaded use, wrap in `Arc<Mutex<SessionMetrics>>`.

use std::time::{Duration, Instant};

/// Counters and timing for one covert-channel session.
#[derive(Debug, Clone)]
pub struct SessionMetrics {
    // === Timing ===
    /// When the session started
    pub start_time: Instant,

    /// When the session ended (set on completion)
    pub end_time: Option<Instant>,

    // === Send side ===
    /// Message bits encoded
    pub message_bits: u64,

    /// Packets emitted by the encoder
    pub packets_emitted: u64,

    // === Receive side ===
    /// Packets consumed by the decoder (after conversation filtering)
    pub packets_observed: u64,

    /// Characters decoded (sentinel included once Terminal is reached)
    pub chars_decoded: u64,

    /// Whether the decoder reached Terminal
    pub terminal: bool,
}

impl SessionMetrics {
    /// Create new metrics with start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            message_bits: 0,
            packets_emitted: 0,
            packets_observed: 0,
            chars_decoded: 0,
            terminal: false,
        }
    }

    /// Mark the session as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Packets spent per decoded character.
    ///
    /// Returns 0.0 if nothing was decoded.
    pub fn packets_per_char(&self) -> f64 {
        if self.chars_decoded == 0 {
            0.0
        } else {
            self.packets_observed as f64 / self.chars_decoded as f64
        }
    }

    /// Effective throughput in characters per second.
    pub fn chars_per_sec(&self) -> f64 {
        let secs = self.duration().as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.chars_decoded as f64 / secs
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Session Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!();
        println!("=== Encoding ===");
        println!("Message bits: {}", self.message_bits);
        println!("Packets emitted: {}", self.packets_emitted);
        println!();
        println!("=== Decoding ===");
        println!("Packets observed: {}", self.packets_observed);
        println!("Characters decoded: {}", self.chars_decoded);
        println!("Packets per character: {:.1}", self.packets_per_char());
        println!("Terminal reached: {}", if self.terminal { "yes" } else { "no" });
        println!();
        println!("=== Performance ===");
        println!("Throughput: {:.1} chars/s", self.chars_per_sec());
        println!();
    }

    /// Print just the final result (pass/fail).
    pub fn print_result(&self) {
        if self.terminal {
            println!(
                "✓ Message delivered: {} chars in {} packets ({} ms)",
                self.chars_decoded,
                self.packets_observed,
                self.duration().as_millis()
            );
        } else {
            println!(
                "✗ Message incomplete: {} chars decoded from {} packets",
                self.chars_decoded, self.packets_observed
            );
        }
    }

    /// Export metrics as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             message_bits={}\n\
             packets_emitted={}\n\
             packets_observed={}\n\
             chars_decoded={}\n\
             packets_per_char={:.2}\n\
             terminal={}\n",
            self.duration().as_millis(),
            self.message_bits,
            self.packets_emitted,
            self.packets_observed,
            self.chars_decoded,
            self.packets_per_char(),
            self.terminal,
        )
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}
