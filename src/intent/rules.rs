//! Ordered keyword rules mapping an utterance to an [`Intent`].
//!
//! Rules are literal substring tests evaluated top to bottom; the first match
//! wins. Order matters: "set a timer" contains "time", so the time query rule
//! excludes "timer" explicitly, and the add/list variants of reminders, to-dos,
//! notes and contacts are listed before their catch-all.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::Intent;

static GREETING_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(hello|hi|hey)\b").unwrap());

/// A single classification rule.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub intent: Intent,
    /// Human-readable summary of what the predicate looks for.
    pub description: &'static str,
    pub matches: fn(&str) -> bool,
}

fn any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

fn todo_ish(text: &str) -> bool {
    any(text, &["todo", "to do", "task"])
}

fn note_ish(text: &str) -> bool {
    any(text, &["note", "write this down"])
}

/// The ordered rule table.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The assistant's built-in rule table.
    pub fn default_rules() -> Self {
        let rules = vec![
            Rule {
                intent: Intent::Greeting,
                description: "hello / hi / hey as whole words",
                matches: |t| GREETING_WORD.is_match(t),
            },
            Rule {
                intent: Intent::Identity,
                description: "your name / who are you",
                matches: |t| any(t, &["your name", "who are you"]),
            },
            Rule {
                intent: Intent::Help,
                description: "what can you do / help / your features",
                matches: |t| any(t, &["what can you do", "help", "your features"]),
            },
            Rule {
                intent: Intent::TimeQuery,
                description: "time, but not timer",
                matches: |t| t.contains("time") && !t.contains("timer"),
            },
            Rule {
                intent: Intent::DateQuery,
                description: "date / what day / today",
                matches: |t| any(t, &["date", "what day", "today"]),
            },
            Rule {
                intent: Intent::SetTimer,
                description: "timer",
                matches: |t| any(t, &["timer", "set a timer"]),
            },
            Rule {
                intent: Intent::SetAlarm,
                description: "alarm / wake me",
                matches: |t| any(t, &["alarm", "wake me"]),
            },
            Rule {
                intent: Intent::ReminderList,
                description: "remind + show / list / what are",
                matches: |t| t.contains("remind") && any(t, &["show", "list", "what are"]),
            },
            Rule {
                intent: Intent::ReminderAdd,
                description: "remind",
                matches: |t| t.contains("remind"),
            },
            Rule {
                intent: Intent::TodoAdd,
                description: "todo + add / new / create",
                matches: |t| todo_ish(t) && any(t, &["add", "new", "create"]),
            },
            Rule {
                intent: Intent::TodoList,
                description: "todo + show / list / what",
                matches: |t| todo_ish(t) && any(t, &["show", "list", "what"]),
            },
            Rule {
                intent: Intent::TodoAdd,
                description: "todo",
                matches: todo_ish,
            },
            Rule {
                intent: Intent::NoteRead,
                description: "note + read / show / my notes",
                matches: |t| note_ish(t) && any(t, &["read", "show", "my notes"]),
            },
            Rule {
                intent: Intent::NoteAdd,
                description: "note / write this down",
                matches: note_ish,
            },
            Rule {
                intent: Intent::ContactAdd,
                description: "contact + add / new / save",
                matches: |t| t.contains("contact") && any(t, &["add", "new", "save"]),
            },
            Rule {
                intent: Intent::ContactList,
                description: "contact + show / list / all",
                matches: |t| t.contains("contact") && any(t, &["show", "list", "all"]),
            },
            Rule {
                intent: Intent::ContactFind,
                description: "contact",
                matches: |t| t.contains("contact"),
            },
            Rule {
                intent: Intent::Calculate,
                description: "calculate / what is / arithmetic words",
                matches: |t| {
                    any(
                        t,
                        &["calculate", "what is", "plus", "minus", "times", "divided", "multiply"],
                    )
                },
            },
            Rule {
                intent: Intent::Convert,
                description: "convert",
                matches: |t| t.contains("convert"),
            },
            Rule {
                intent: Intent::SystemInfo,
                description: "system / battery / cpu / memory",
                matches: |t| any(t, &["system", "battery", "cpu", "memory"]),
            },
            Rule {
                intent: Intent::OpenApp,
                description: "open",
                matches: |t| t.contains("open"),
            },
            Rule {
                intent: Intent::Weather,
                description: "weather",
                matches: |t| t.contains("weather"),
            },
            Rule {
                intent: Intent::Define,
                description: "define / definition / meaning of",
                matches: |t| any(t, &["define", "definition", "meaning of"]),
            },
            Rule {
                intent: Intent::CoinFlip,
                description: "flip a coin / coin flip",
                matches: |t| any(t, &["flip a coin", "coin flip"]),
            },
            Rule {
                intent: Intent::DiceRoll,
                description: "roll a dice / roll dice / dice roll",
                matches: |t| any(t, &["roll a dice", "roll dice", "dice roll"]),
            },
            Rule {
                intent: Intent::Joke,
                description: "joke / make me laugh",
                matches: |t| any(t, &["joke", "make me laugh"]),
            },
            Rule {
                intent: Intent::ScheduleMeeting,
                description: "meeting / schedule",
                matches: |t| any(t, &["meeting", "schedule"]),
            },
            Rule {
                intent: Intent::Exit,
                description: "exit / quit / bye / stop",
                matches: |t| any(t, &["exit", "quit", "bye", "goodbye", "stop"]),
            },
        ];
        Self::new(rules)
    }

    /// First rule matching `utterance`, if any.
    pub fn matching_rule(&self, utterance: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| (rule.matches)(utterance))
    }

    /// Classify an already-normalized utterance.
    pub fn classify(&self, utterance: &str) -> Intent {
        match self.matching_rule(utterance) {
            Some(rule) => {
                debug!(intent = %rule.intent, rule = rule.description, "Rule matched");
                rule.intent
            }
            None => Intent::Unknown,
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::default_rules()
    }
}
