//! Message generation and log-file collaborators for the CLI driver.
//!
//! When no message is supplied, we generate a random printable one with the
//! sentinel appended, reproducible from the seed. The source and sink types
//! here are the file-logging collaborators: the plaintext is logged before
//! transmission, the decoded message is logged once the sentinel arrives.

use flagwire_core::message::{MessageSink, MessageSource, SENTINEL};
use flagwire_core::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fs;
use std::path::PathBuf;

/// Characters eligible for generated messages. The sentinel is excluded so
/// the generated body never terminates the transmission early.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789 ,!?";

/// Generate a random sentinel-terminated message.
///
/// Length (sentinel excluded) is drawn uniformly from `min_chars..=max_chars`.
/// Deterministic for a given seed.
pub fn generate_message(seed: u64, min_chars: usize, max_chars: usize) -> String {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let len = rng.gen_range(min_chars..=max_chars);

    let mut message = String::with_capacity(len + 1);
    for _ in 0..len {
        let idx = rng.gen_range(0..ALPHABET.len());
        message.push(ALPHABET[idx] as char);
    }
    message.push(SENTINEL);
    message
}

/// Message source that logs the plaintext to a file before handing it over.
pub struct LoggedSource {
    message: String,
    log_file: Option<PathBuf>,
}

impl LoggedSource {
    pub fn new(message: String, log_file: Option<PathBuf>) -> Self {
        Self { message, log_file }
    }
}

impl MessageSource for LoggedSource {
    fn fetch(&mut self) -> Result<String> {
        if let Some(path) = &self.log_file {
            fs::write(path, &self.message)?;
        }
        Ok(self.message.clone())
    }
}

/// Message sink that persists the decoded message to a file.
pub struct FileMessageLog {
    log_file: Option<PathBuf>,
    last: Option<String>,
}

impl FileMessageLog {
    pub fn new(log_file: Option<PathBuf>) -> Self {
        Self {
            log_file,
            last: None,
        }
    }

    /// The most recently persisted message, if any.
    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

impl MessageSink for FileMessageLog {
    fn persist(&mut self, message: &str) -> Result<()> {
        if let Some(path) = &self.log_file {
            fs::write(path, message)?;
        }
        self.last = Some(message.to_string());
        Ok(())
    }
}
