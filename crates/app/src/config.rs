//! Configuration for the flagwire CLI.
//!
//! Handles parsing command-line arguments and generating sensible defaults
//! (including randomized defaults that are reproducible with a seed).
//!
//! # Philosophy
//!
//! The tool should work with ZERO arguments, using intelligent defaults.
//! All defaults are printed so runs are reproducible. Sender and receiver
//! share one parameter set; mismatched parameters between real peers are
//! undefined by design and not detectable from the wire.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

/// Bounds for generated message length (sentinel excluded).
const MIN_MESSAGE_CHARS: usize = 8;
const MAX_MESSAGE_CHARS: usize = 48;

/// Complete configuration for one loopback session.
#[derive(Debug, Clone)]
pub struct Config {
    // === Channel ===
    /// Packets per message bit (group width)
    pub packets_per_bit: u32,

    /// Threshold splitting the encoded value space
    pub bit_one_threshold: u64,

    /// Random seed for draws and generated defaults
    pub seed: u64,

    // === Message ===
    /// Explicit message (None = generate one from the seed)
    pub message: Option<String>,

    // === Identities ===
    /// Sending host identity stamped on packets
    pub sender: String,

    /// Receiving host identity
    pub receiver: String,

    // === Logs ===
    /// Where to log the plaintext before transmission
    pub sent_log: Option<PathBuf>,

    /// Where to log the decoded message at Terminal
    pub received_log: Option<PathBuf>,

    // === Impairments ===
    /// Stop delivering to the decoder after this many packets
    pub deliver_cap: Option<u64>,

    /// Receive timeout in milliseconds
    pub timeout_ms: Option<u64>,

    // === Behavior ===
    /// Whether to print resolved configuration
    pub print_config: bool,

    /// Whether to print the metrics summary
    pub print_metrics: bool,
}

impl Config {
    /// Parse configuration from command-line arguments.
    ///
    /// If no arguments are provided, generates randomized channel defaults
    /// using a time-based seed. If --seed is provided, uses that seed for
    /// all randomness (fully deterministic).
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let mut packets_per_bit: Option<u32> = None;
        let mut bit_one_threshold: Option<u64> = None;
        let mut seed: Option<u64> = None;
        let mut message: Option<String> = None;
        let mut sender: Option<String> = None;
        let mut receiver: Option<String> = None;
        let mut sent_log: Option<PathBuf> = None;
        let mut received_log: Option<PathBuf> = None;
        let mut deliver_cap: Option<u64> = None;
        let mut timeout_ms: Option<u64> = None;
        let mut print_config = false;
        let mut print_metrics = true;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--packets-per-bit" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--packets-per-bit requires a number".to_string());
                    }
                    packets_per_bit =
                        Some(args[i].parse().map_err(|_| "invalid packets-per-bit")?);
                }
                "--threshold" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--threshold requires a number".to_string());
                    }
                    bit_one_threshold = Some(args[i].parse().map_err(|_| "invalid threshold")?);
                }
                "--seed" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--seed requires a number".to_string());
                    }
                    seed = Some(args[i].parse().map_err(|_| "invalid seed")?);
                }
                "--message" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--message requires a string".to_string());
                    }
                    message = Some(args[i].clone());
                }
                "--sender" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--sender requires a host name".to_string());
                    }
                    sender = Some(args[i].clone());
                }
                "--receiver" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--receiver requires a host name".to_string());
                    }
                    receiver = Some(args[i].clone());
                }
                "--sent-log" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--sent-log requires a path".to_string());
                    }
                    sent_log = Some(PathBuf::from(&args[i]));
                }
                "--received-log" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--received-log requires a path".to_string());
                    }
                    received_log = Some(PathBuf::from(&args[i]));
                }
                "--deliver-cap" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--deliver-cap requires a number".to_string());
                    }
                    deliver_cap = Some(args[i].parse().map_err(|_| "invalid deliver-cap")?);
                }
                "--timeout-ms" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--timeout-ms requires a number".to_string());
                    }
                    timeout_ms = Some(args[i].parse().map_err(|_| "invalid timeout-ms")?);
                }
                "--print-config" => {
                    print_config = true;
                }
                "--no-metrics" => {
                    print_metrics = false;
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                _ => {
                    return Err(format!("unknown argument: {}", args[i]));
                }
            }
            i += 1;
        }

        // Determine seed (explicit or time-based)
        let seed = seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|t| t.as_millis() as u64)
                .unwrap_or(0)
        });

        // Generate channel defaults using the seed
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let packets_per_bit = packets_per_bit.unwrap_or_else(|| rng.gen_range(2..=6));
        // Out-of-range widths are rejected by parameter validation later;
        // the clamp only keeps the default draw well-formed.
        let space = 1u64 << packets_per_bit.clamp(1, 62);
        let bit_one_threshold = bit_one_threshold.unwrap_or_else(|| rng.gen_range(1..space));

        Ok(Config {
            packets_per_bit,
            bit_one_threshold,
            seed,
            message,
            sender: sender.unwrap_or_else(|| "sender".to_string()),
            receiver: receiver.unwrap_or_else(|| "receiver".to_string()),
            sent_log,
            received_log,
            deliver_cap,
            timeout_ms,
            print_config,
            print_metrics,
        })
    }

    /// Bounds used when generating a message from the seed.
    pub fn message_length_bounds(&self) -> (usize, usize) {
        (MIN_MESSAGE_CHARS, MAX_MESSAGE_CHARS)
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        println!("Seed: {}", self.seed);
        println!("Packets per bit: {}", self.packets_per_bit);
        println!(
            "Threshold: {} (value space 0..{})",
            self.bit_one_threshold,
            1u64 << self.packets_per_bit
        );
        println!();
        println!("Sender:   {}", self.sender);
        println!("Receiver: {}", self.receiver);
        println!(
            "Message:  {}",
            self.message.as_deref().unwrap_or("(generate from seed)")
        );
        if let Some(cap) = self.deliver_cap {
            println!("Deliver cap: {} packets", cap);
        }
        if let Some(ms) = self.timeout_ms {
            println!("Receive timeout: {} ms", ms);
        }
        println!();
    }
}

fn print_help() {
    println!("flagwire: covert messaging over a single TCP header flag");
    println!();
    println!("Runs one loopback session: encodes a message as flag-modulated");
    println!("packets, feeds them back through the conversation filter, decodes,");
    println!("and verifies the result.");
    println!();
    println!("USAGE:");
    println!("    flagwire [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --packets-per-bit <N>   Packets per message bit, 2-32 (default: random 2-6)");
    println!("    --threshold <N>         Bit-one threshold, 0 < N < 2^P (default: random)");
    println!("    --seed <N>              Random seed for determinism");
    println!();
    println!("    --message <TEXT>        Message to send (default: generate from seed;");
    println!("                            a trailing '.' is appended if missing)");
    println!();
    println!("    --sender <HOST>         Sender identity (default: sender)");
    println!("    --receiver <HOST>       Receiver identity (default: receiver)");
    println!();
    println!("    --sent-log <PATH>       Log the plaintext before transmission");
    println!("    --received-log <PATH>   Log the decoded message at completion");
    println!();
    println!("    --deliver-cap <N>       Cut the capture after N packets");
    println!("    --timeout-ms <MS>       Bound the receive with a timeout");
    println!();
    println!("    --print-config          Print resolved configuration");
    println!("    --no-metrics            Don't print the metrics summary");
    println!("    --help, -h              Print this help");
    println!();
    println!("EXAMPLES:");
    println!("    flagwire                               # Random session");
    println!("    flagwire --seed 42                     # Deterministic session");
    println!("    flagwire --packets-per-bit 3 --threshold 4 --message 'A.'");
    println!("    flagwire --deliver-cap 40              # Exercise the incomplete path");
    println!();
}
