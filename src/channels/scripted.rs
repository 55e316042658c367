//! Scripted input: a fixed queue of utterances.

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::channels::{InputSource, normalize};

/// Replays canned lines, then reports the source as closed.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            lines: lines.into_iter().map(|l| normalize(l.as_ref())).collect(),
        }
    }

    /// Lines not consumed yet.
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

#[async_trait]
impl InputSource for ScriptedInput {
    async fn next_utterance(&mut self) -> Option<String> {
        self.lines.pop_front()
    }
}
