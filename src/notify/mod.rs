//! Output side: announcing responses to the user.
//!
//! Announcing is best-effort. Implementations swallow their own failures so
//! a broken speaker never takes the dispatch loop or a waiter down with it.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::process::Command;

/// Renders a response audibly and/or visibly.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn announce(&self, text: &str);
}

/// Prints to stdout and optionally pipes the text to a speech command.
pub struct ConsoleNotifier {
    name: String,
    speech_command: Option<String>,
}

impl ConsoleNotifier {
    pub fn new(name: impl Into<String>, speech_command: Option<String>) -> Self {
        Self {
            name: name.into(),
            speech_command,
        }
    }

    async fn speak(&self, command: &str, text: &str) {
        let mut parts = command.split_whitespace();
        let Some(program) = parts.next() else {
            return;
        };
        match Command::new(program)
            .args(parts)
            .arg(text)
            .kill_on_drop(true)
            .spawn()
        {
            Ok(mut child) => {
                if let Err(e) = child.wait().await {
                    tracing::debug!(command = %program, error = %e, "Speech command failed");
                }
            }
            Err(e) => tracing::warn!(command = %program, error = %e, "Failed to spawn speech command"),
        }
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn announce(&self, text: &str) {
        println!("\n{}: {}", self.name, text);
        if let Some(ref command) = self.speech_command {
            self.speak(command, text).await;
        }
    }
}

/// Keeps every announcement in memory. Used by tests and headless runs.
#[derive(Default)]
pub struct RecordingNotifier {
    announcements: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything announced so far, oldest first.
    pub fn announcements(&self) -> Vec<String> {
        self.announcements
            .lock()
            .map(|a| a.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut a) = self.announcements.lock() {
            a.clear();
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn announce(&self, text: &str) {
        if let Ok(mut a) = self.announcements.lock() {
            a.push(text.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.announce("one").await;
        notifier.announce("two").await;
        assert_eq!(notifier.announcements(), vec!["one", "two"]);
        notifier.clear();
        assert!(notifier.announcements().is_empty());
    }

    #[tokio::test]
    async fn missing_speech_command_is_swallowed() {
        let notifier = ConsoleNotifier::new("Pico", Some("definitely-not-a-real-binary-xyz".into()));
        notifier.announce("still fine").await;
    }
}
