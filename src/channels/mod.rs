//! Input side: where utterances come from.

pub mod cli;
pub mod scripted;

use async_trait::async_trait;

pub use cli::CliInput;
pub use scripted::ScriptedInput;

/// A source of utterances.
///
/// `Some("")` means nothing was captured this time; `None` means the source
/// is closed and no more input will arrive.
#[async_trait]
pub trait InputSource: Send {
    async fn next_utterance(&mut self) -> Option<String>;
}

/// Normalize raw input: trim and lower-case.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}
