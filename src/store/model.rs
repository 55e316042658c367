//! Persisted record types.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reminder added by voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub text: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
}

impl Reminder {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            created: Utc::now(),
            completed: false,
        }
    }
}

/// A to-do list entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub task: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
}

impl Todo {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            created: Utc::now(),
            completed: false,
        }
    }
}

/// An append-only note, stored as a `[timestamp] text` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub timestamp: String,
    pub text: String,
}

impl Note {
    /// A note stamped with the local wall clock.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            text: text.into(),
        }
    }

    /// Render as a single line of the notes file.
    pub fn to_line(&self) -> String {
        format!("[{}] {}", self.timestamp, self.text)
    }

    /// Parse a line of the notes file. Lines without a timestamp keep their
    /// full text and an empty timestamp.
    pub fn from_line(line: &str) -> Self {
        if let Some(rest) = line.strip_prefix('[')
            && let Some((timestamp, text)) = rest.split_once("] ")
        {
            return Self {
                timestamp: timestamp.to_string(),
                text: text.to_string(),
            };
        }
        Self {
            timestamp: String::new(),
            text: line.to_string(),
        }
    }
}

/// A scheduled meeting. `time` is whatever the user said, unparsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub title: String,
    pub time: String,
    pub created: DateTime<Utc>,
}

impl Meeting {
    pub fn new(title: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            time: time.into(),
            created: Utc::now(),
        }
    }
}

/// A wall-clock alarm. While `active`, exactly one scheduler waiter watches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// `HH:MM`, 24-hour.
    pub time: String,
    pub label: String,
    pub active: bool,
}

impl Alarm {
    pub fn new(time: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            time: time.into(),
            label: label.into(),
            active: true,
        }
    }
}
