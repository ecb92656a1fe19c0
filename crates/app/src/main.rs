//! flagwire: loopback driver for the covert FIN-flag channel.
//!
//! Runs one full session in-process: resolve configuration, encode the
//! message into the loopback link, decode it back through the conversation
//! filter, verify, and report.

mod config;
mod message_gen;

use config::Config;
use flagwire_core::error::{DecodeError, Error};
use flagwire_core::metrics::SessionMetrics;
use flagwire_core::network::Loopback;
use flagwire_core::{
    receive_message, ChannelParams, ConversationFilter, Encoder, FilteredStream, ReceiveOptions,
    SENTINEL,
};
use message_gen::{generate_message, FileMessageLog, LoggedSource};
use std::time::Duration;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!("try: flagwire --help");
            std::process::exit(2);
        }
    };

    if config.print_config {
        config.print();
    }

    match run_session(&config) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

/// Run one loopback session. Returns whether the received message matched.
fn run_session(config: &Config) -> flagwire_core::Result<bool> {
    // Parameters are validated before anything touches the wire.
    let params = ChannelParams::new(config.packets_per_bit, config.bit_one_threshold)?;
    let mut metrics = SessionMetrics::new();

    let plaintext = match &config.message {
        Some(message) if message.contains(SENTINEL) => message.clone(),
        Some(message) => format!("{message}{SENTINEL}"),
        None => {
            let (min, max) = config.message_length_bounds();
            generate_message(config.seed, min, max)
        }
    };

    // Send side
    let mut link = match config.deliver_cap {
        Some(cap) => Loopback::with_deliver_cap(cap),
        None => Loopback::new(),
    };
    let mut source = LoggedSource::new(plaintext, config.sent_log.clone());
    let mut encoder = Encoder::new(params, config.seed);
    let report = encoder.send_message(&mut source, &mut link, &config.sender, &config.receiver)?;

    metrics.message_bits = report.message_bits as u64;
    metrics.packets_emitted = report.packets_emitted;

    // Receive side
    let mut stream = FilteredStream::new(link, ConversationFilter::from_source(&config.sender));
    let mut sink = FileMessageLog::new(config.received_log.clone());
    let options = ReceiveOptions {
        timeout: config.timeout_ms.map(Duration::from_millis),
    };

    let matched = match receive_message(params, &mut stream, &mut sink, options) {
        Ok(received) => {
            metrics.packets_observed = received.packets_consumed;
            metrics.chars_decoded = received.message.chars().count() as u64;
            metrics.terminal = true;
            metrics.complete();

            let matched = received.message == report.message;
            if !matched {
                println!(
                    "✗ Received {:?} but sent {:?}",
                    received.message, report.message
                );
            }
            matched
        }
        Err(Error::Decode(DecodeError::Incomplete {
            chars_decoded,
            pending_byte_bits,
            pending_group_bits,
        })) => {
            metrics.chars_decoded = chars_decoded as u64;
            metrics.complete();
            println!(
                "✗ Capture ended before the sentinel: {chars_decoded} chars decoded, \
                 {pending_byte_bits} bits into the current byte, \
                 {pending_group_bits} bits into the current group"
            );
            false
        }
        Err(err) => return Err(err),
    };

    if config.print_metrics {
        metrics.print_summary();
    }
    metrics.print_result();

    Ok(matched)
}
