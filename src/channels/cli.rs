//! CLI input: stdin lines stand in for transcribed speech.
//!
//! Bytes that are not valid UTF-8 are replaced rather than rejected, and a
//! failed read counts as a missed utterance. Only end of input, or a run of
//! failed reads, closes the source.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, error, warn};

use crate::channels::{InputSource, normalize};

/// Consecutive read failures after which the source gives up.
const MAX_READ_ERRORS: u32 = 5;

/// Reads one utterance per line.
pub struct CliInput {
    reader: Box<dyn AsyncBufRead + Unpin + Send>,
    errors: u32,
}

impl CliInput {
    /// Read from stdin.
    pub fn new() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }

    pub fn from_reader(reader: impl AsyncBufRead + Unpin + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            errors: 0,
        }
    }
}

impl Default for CliInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InputSource for CliInput {
    async fn next_utterance(&mut self) -> Option<String> {
        eprint!("> ");
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf).await {
            Ok(0) => None,
            Ok(_) => {
                self.errors = 0;
                let utterance = normalize(&String::from_utf8_lossy(&buf));
                if !utterance.is_empty() {
                    debug!(utterance = %utterance, "Heard");
                }
                Some(utterance)
            }
            Err(e) => {
                self.errors += 1;
                if self.errors >= MAX_READ_ERRORS {
                    error!(error = %e, errors = self.errors, "Input keeps failing, closing");
                    return None;
                }
                warn!(error = %e, "Failed to read input line");
                Some(String::new())
            }
        }
    }
}
