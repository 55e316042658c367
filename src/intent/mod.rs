//! Intent classification and dispatch.
//!
//! An utterance is matched against an ordered [`RuleSet`]; the first rule
//! whose predicate holds decides the [`Intent`], and [`IntentRouter`] runs
//! the handler for it.

pub mod replies;
pub mod router;
pub mod rules;

pub use router::{AssistantDeps, Dispatch, IntentRouter};
pub use rules::{Rule, RuleSet};

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Greeting,
    Identity,
    Help,
    TimeQuery,
    DateQuery,
    SetTimer,
    SetAlarm,
    ReminderAdd,
    ReminderList,
    TodoAdd,
    TodoList,
    NoteAdd,
    NoteRead,
    ContactAdd,
    ContactFind,
    ContactList,
    Calculate,
    Convert,
    SystemInfo,
    OpenApp,
    Weather,
    Define,
    CoinFlip,
    DiceRoll,
    Joke,
    ScheduleMeeting,
    Exit,
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Identity => "identity",
            Self::Help => "help",
            Self::TimeQuery => "time_query",
            Self::DateQuery => "date_query",
            Self::SetTimer => "set_timer",
            Self::SetAlarm => "set_alarm",
            Self::ReminderAdd => "reminder_add",
            Self::ReminderList => "reminder_list",
            Self::TodoAdd => "todo_add",
            Self::TodoList => "todo_list",
            Self::NoteAdd => "note_add",
            Self::NoteRead => "note_read",
            Self::ContactAdd => "contact_add",
            Self::ContactFind => "contact_find",
            Self::ContactList => "contact_list",
            Self::Calculate => "calculate",
            Self::Convert => "convert",
            Self::SystemInfo => "system_info",
            Self::OpenApp => "open_app",
            Self::Weather => "weather",
            Self::Define => "define",
            Self::CoinFlip => "coin_flip",
            Self::DiceRoll => "dice_roll",
            Self::Joke => "joke",
            Self::ScheduleMeeting => "schedule_meeting",
            Self::Exit => "exit",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
