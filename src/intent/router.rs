//! Intent dispatch: the assistant's top-level entry point.
//!
//! [`IntentRouter::dispatch`] classifies one utterance and runs its handler.
//! Handlers that need more detail (alarm time, reminder text, contact name
//! and number, meeting title and time) announce a prompt and read exactly one
//! follow-up from the input; an empty or closed follow-up abandons the
//! request without touching the store.

use std::sync::Arc;

use rand::Rng;
use tracing::{info, warn};

use crate::channels::{InputSource, normalize};
use crate::config::AssistantConfig;
use crate::error::{DurationError, LaunchError, StoreError};
use crate::notify::Notifier;
use crate::scheduler::{Clock, Scheduler};
use crate::slots::{
    calculate, convert, extract_clock_time, extract_conversion, extract_duration, format_number,
    number_before, strip_words, title_case,
};
use crate::store::{Meeting, Note, PersistentStore, Reminder, Todo};
use crate::system::{Launcher, Telemetry};

use super::rules::RuleSet;
use super::{Intent, replies};

const ALARM_LABEL: &str = "Wake up alarm";
const DEFAULT_DICE_SIDES: u32 = 6;
const RECENT_NOTES: usize = 5;

/// Result of dispatching one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub intent: Intent,
    /// Text to announce. Empty when there is nothing to say.
    pub response: String,
    /// `false` only after an exit request.
    pub keep_running: bool,
}

impl Dispatch {
    fn reply(intent: Intent, response: impl Into<String>) -> Self {
        Self {
            intent,
            response: response.into(),
            keep_running: true,
        }
    }
}

/// Collaborators the router drives.
pub struct AssistantDeps {
    pub store: Arc<PersistentStore>,
    pub scheduler: Arc<Scheduler>,
    pub notifier: Arc<dyn Notifier>,
    pub input: Box<dyn InputSource>,
    pub launcher: Arc<dyn Launcher>,
    pub telemetry: Arc<dyn Telemetry>,
    pub clock: Arc<dyn Clock>,
}

/// Classifies utterances and runs their handlers.
pub struct IntentRouter {
    name: String,
    rules: RuleSet,
    store: Arc<PersistentStore>,
    scheduler: Arc<Scheduler>,
    notifier: Arc<dyn Notifier>,
    input: Box<dyn InputSource>,
    launcher: Arc<dyn Launcher>,
    telemetry: Arc<dyn Telemetry>,
    clock: Arc<dyn Clock>,
}

impl IntentRouter {
    pub fn new(config: &AssistantConfig, deps: AssistantDeps) -> Self {
        Self {
            name: config.name.clone(),
            rules: RuleSet::default_rules(),
            store: deps.store,
            scheduler: deps.scheduler,
            notifier: deps.notifier,
            input: deps.input,
            launcher: deps.launcher,
            telemetry: deps.telemetry,
            clock: deps.clock,
        }
    }

    /// Replace the rule table.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Greet, then dispatch utterances until exit, closed input or Ctrl-C.
    pub async fn run(&mut self) {
        self.notifier.announce(&replies::welcome(&self.name)).await;

        loop {
            let next = tokio::select! {
                line = self.input.next_utterance() => Some(line),
                Ok(()) = tokio::signal::ctrl_c() => None,
            };
            let utterance = match next {
                Some(Some(line)) => line,
                Some(None) => {
                    info!("Input closed");
                    break;
                }
                None => {
                    info!("Interrupted");
                    self.notifier.announce("Goodbye!").await;
                    break;
                }
            };
            if utterance.is_empty() {
                continue;
            }

            let outcome = self.dispatch(&utterance).await;
            if !outcome.response.is_empty() {
                self.notifier.announce(&outcome.response).await;
            }
            if !outcome.keep_running {
                break;
            }
        }
    }

    /// Classify `utterance` and run its handler.
    pub async fn dispatch(&mut self, utterance: &str) -> Dispatch {
        let text = normalize(utterance);
        if text.is_empty() {
            return Dispatch::reply(Intent::Unknown, "");
        }

        let intent = self.rules.classify(&text);
        info!(intent = %intent, "Dispatching");

        let response = match intent {
            Intent::Greeting => replies::greeting(&self.name),
            Intent::Identity => replies::identity(&self.name),
            Intent::Help => replies::help(&self.name),
            Intent::TimeQuery => format!(
                "The current time is {}",
                self.clock.now().format("%I:%M %p")
            ),
            Intent::DateQuery => format!("Today is {}", self.clock.now().format("%A, %B %d, %Y")),
            Intent::SetTimer => self.set_timer(&text).await,
            Intent::SetAlarm => self.set_alarm().await,
            Intent::ReminderAdd => self.add_reminder().await,
            Intent::ReminderList => self.list_reminders().await,
            Intent::TodoAdd => self.add_todo(&text).await,
            Intent::TodoList => self.list_todos().await,
            Intent::NoteAdd => self.add_note().await,
            Intent::NoteRead => self.read_notes().await,
            Intent::ContactAdd => self.add_contact().await,
            Intent::ContactFind => self.find_contact(&text).await,
            Intent::ContactList => self.list_contacts().await,
            Intent::Calculate => calculate_reply(&text),
            Intent::Convert => convert_reply(&text),
            Intent::SystemInfo => self.system_info().await,
            Intent::OpenApp => self.open_app(&text).await,
            Intent::Weather => replies::WEATHER.to_string(),
            Intent::Define => {
                let word = strip_words(&text, &["definition", "define", "meaning of"]);
                if word.is_empty() {
                    String::new()
                } else {
                    replies::definition(&word)
                }
            }
            Intent::CoinFlip => {
                let side = if rand::thread_rng().gen_bool(0.5) {
                    "Heads"
                } else {
                    "Tails"
                };
                format!("The coin landed on {side}")
            }
            Intent::DiceRoll => {
                let sides = dice_sides(&text);
                let roll = rand::thread_rng().gen_range(1..=sides);
                format!("You rolled a {roll}")
            }
            Intent::Joke => replies::joke().to_string(),
            Intent::ScheduleMeeting => self.schedule_meeting().await,
            Intent::Exit => {
                return Dispatch {
                    intent,
                    response: replies::GOODBYE.to_string(),
                    keep_running: false,
                };
            }
            Intent::Unknown => replies::fallback().to_string(),
        };

        Dispatch::reply(intent, response)
    }

    /// Announce `prompt` and read one non-empty answer.
    async fn follow_up(&mut self, prompt: &str) -> Option<String> {
        self.notifier.announce(prompt).await;
        let answer = self.input.next_utterance().await?;
        let answer = answer.trim();
        (!answer.is_empty()).then(|| answer.to_string())
    }

    async fn set_timer(&self, text: &str) -> String {
        match extract_duration(text) {
            Ok(spec) => {
                self.scheduler.start_timer(spec.seconds, spec.label.clone()).await;
                format!("{} set for {} seconds", spec.label, spec.seconds)
            }
            Err(DurationError::MissingUnit) => {
                "Please specify the timer duration, like 5 minutes or 30 seconds".to_string()
            }
            Err(e) => {
                info!(error = %e, "Timer duration not understood");
                "I couldn't understand the timer duration. Please try again.".to_string()
            }
        }
    }

    async fn set_alarm(&mut self) -> String {
        let Some(answer) = self
            .follow_up(
                "What time should I set the alarm for? Say it in 24-hour format, like 07 30",
            )
            .await
        else {
            return String::new();
        };

        let time = match extract_clock_time(&answer) {
            Ok(time) => time,
            Err(e) => {
                info!(error = %e, "Alarm time not understood");
                return "Invalid time format".to_string();
            }
        };
        match self.scheduler.set_alarm(time.clone(), ALARM_LABEL).await {
            Ok(_) => format!("Alarm set for {time}"),
            Err(e) => {
                warn!(error = %e, "Failed to set alarm");
                "I couldn't set the alarm".to_string()
            }
        }
    }

    async fn add_reminder(&mut self) -> String {
        let Some(text) = self.follow_up("What should I remind you about?").await else {
            return String::new();
        };
        match self.store.add_reminder(Reminder::new(text.clone())).await {
            Ok(()) => format!("Reminder added: {text}"),
            Err(e) => save_failed(e),
        }
    }

    async fn list_reminders(&self) -> String {
        let active = self.store.active_reminders().await;
        if active.is_empty() {
            return "You have no active reminders".to_string();
        }
        let mut lines = vec![format!(
            "You have {} reminder{}",
            active.len(),
            plural(active.len())
        )];
        lines.extend(
            active
                .iter()
                .enumerate()
                .map(|(i, r)| format!("Reminder {}: {}", i + 1, r.text)),
        );
        lines.join("\n")
    }

    async fn add_todo(&mut self, text: &str) -> String {
        let prompt = if ["add", "new", "create"].iter().any(|w| text.contains(w)) {
            "What task should I add?"
        } else {
            "What task should I add to your to-do list?"
        };
        let Some(task) = self.follow_up(prompt).await else {
            return String::new();
        };
        match self.store.add_todo(Todo::new(task.clone())).await {
            Ok(()) => format!("Added to your to-do list: {task}"),
            Err(e) => save_failed(e),
        }
    }

    async fn list_todos(&self) -> String {
        let active = self.store.active_todos().await;
        if active.is_empty() {
            return "Your to-do list is empty".to_string();
        }
        let mut lines = vec![format!("You have {} task{}", active.len(), plural(active.len()))];
        lines.extend(
            active
                .iter()
                .enumerate()
                .map(|(i, t)| format!("Task {}: {}", i + 1, t.task)),
        );
        lines.join("\n")
    }

    async fn add_note(&mut self) -> String {
        let Some(text) = self.follow_up("What should I note down?").await else {
            return String::new();
        };
        match self.store.add_note(Note::new(text)).await {
            Ok(()) => "Note saved successfully".to_string(),
            Err(e) => save_failed(e),
        }
    }

    async fn read_notes(&self) -> String {
        let notes = self.store.notes().await;
        if notes.is_empty() {
            return "You have no notes".to_string();
        }
        let mut lines = vec![format!("You have {} note{}", notes.len(), plural(notes.len()))];
        let skip = notes.len().saturating_sub(RECENT_NOTES);
        lines.extend(notes[skip..].iter().map(Note::to_line));
        lines.join("\n")
    }

    async fn add_contact(&mut self) -> String {
        let Some(name) = self.follow_up("What is the contact name?").await else {
            return String::new();
        };
        let Some(number) = self.follow_up("What is the phone number?").await else {
            return String::new();
        };
        match self.store.upsert_contact(&name, &number).await {
            Ok(()) => format!("Contact {} added with number {number}", title_case(&name)),
            Err(e) => save_failed(e),
        }
    }

    async fn find_contact(&mut self, text: &str) -> String {
        let mut name = strip_words(text, &["contact", "find", "get", "call"]);
        if name.is_empty() {
            match self.follow_up("Which contact do you want?").await {
                Some(answer) => name = answer,
                None => return String::new(),
            }
        }
        match self.store.find_contact(&name).await {
            Some(number) => format!("{}'s number is {number}", title_case(&name)),
            None => format!("I couldn't find {name} in your contacts"),
        }
    }

    async fn list_contacts(&self) -> String {
        let contacts = self.store.contacts().await;
        if contacts.is_empty() {
            return "Your contact list is empty".to_string();
        }
        let mut lines = vec![format!(
            "You have {} contact{}",
            contacts.len(),
            plural(contacts.len())
        )];
        lines.extend(
            contacts
                .iter()
                .map(|(name, number)| format!("{}: {number}", title_case(name))),
        );
        lines.join("\n")
    }

    async fn system_info(&self) -> String {
        match self.telemetry.snapshot().await {
            Ok(snapshot) => snapshot.summary(),
            Err(e) => {
                warn!(error = %e, "System snapshot failed");
                "Sorry, I couldn't get the system information".to_string()
            }
        }
    }

    async fn open_app(&self, text: &str) -> String {
        let app = strip_words(text, &["open"]);
        if app.is_empty() {
            return "Which application should I open?".to_string();
        }
        match self.launcher.launch(&app).await {
            Ok(()) => format!("Opening {app}"),
            Err(LaunchError::UnknownApp { .. }) => {
                format!("I don't know how to open {app}")
            }
            Err(e) => {
                warn!(app = %app, error = %e, "Launch failed");
                format!("Sorry, I couldn't open {app}")
            }
        }
    }

    async fn schedule_meeting(&mut self) -> String {
        let Some(title) = self.follow_up("What is the meeting title?").await else {
            return String::new();
        };
        let Some(time) = self.follow_up("When is the meeting?").await else {
            return String::new();
        };
        match self
            .store
            .add_meeting(Meeting::new(title.clone(), time.clone()))
            .await
        {
            Ok(()) => format!("Meeting '{title}' scheduled for {time}"),
            Err(e) => save_failed(e),
        }
    }
}

fn calculate_reply(text: &str) -> String {
    let expression = strip_words(text, &["calculate", "what is", "what's"]);
    if expression.is_empty() {
        return String::new();
    }
    match calculate(&expression) {
        Ok(value) => format!("The answer is {}", format_number(value)),
        Err(e) => {
            info!(expression = %expression, error = %e, "Calculation failed");
            "Sorry, I couldn't calculate that".to_string()
        }
    }
}

fn convert_reply(text: &str) -> String {
    let request = match extract_conversion(text) {
        Ok(request) => request,
        Err(_) => return "Please say convert followed by value, unit, to, and target unit".to_string(),
    };
    match convert(&request) {
        Ok(result) => format!(
            "{} {} is {result:.2} {}",
            format_number(request.value),
            request.from,
            request.to
        ),
        Err(_) => format!(
            "Sorry, I can't convert from {} to {}",
            request.from, request.to
        ),
    }
}

/// Sides for a dice roll: `N sided` when given and positive, otherwise six.
fn dice_sides(text: &str) -> u32 {
    if !text.contains("sided") {
        return DEFAULT_DICE_SIDES;
    }
    number_before(text, "sided")
        .and_then(|digits| digits.parse::<u32>().ok())
        .filter(|&sides| sides > 0)
        .unwrap_or(DEFAULT_DICE_SIDES)
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

fn save_failed(e: StoreError) -> String {
    warn!(error = %e, "Store write failed");
    "Sorry, I couldn't save that".to_string()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::channels::ScriptedInput;
    use crate::error::TelemetryError;
    use crate::notify::RecordingNotifier;
    use crate::scheduler::ManualClock;
    use crate::store::MemoryDocumentStore;
    use crate::system::SystemSnapshot;

    struct NoLauncher;

    #[async_trait]
    impl Launcher for NoLauncher {
        async fn launch(&self, app: &str) -> Result<(), LaunchError> {
            Err(LaunchError::UnknownApp {
                name: app.to_string(),
            })
        }
    }

    struct NoTelemetry;

    #[async_trait]
    impl Telemetry for NoTelemetry {
        async fn snapshot(&self) -> Result<SystemSnapshot, TelemetryError> {
            Err(TelemetryError::Unavailable("test".into()))
        }
    }

    struct Harness {
        router: IntentRouter,
        notifier: Arc<RecordingNotifier>,
        store: Arc<PersistentStore>,
        scheduler: Arc<Scheduler>,
    }

    async fn harness(follow_ups: &[&str]) -> Harness {
        let store = Arc::new(PersistentStore::load(Arc::new(MemoryDocumentStore::new())).await);
        let notifier = Arc::new(RecordingNotifier::new());
        let start = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let scheduler = Arc::new(Scheduler::new(
            store.clone(),
            notifier.clone(),
            clock.clone(),
            Duration::from_secs(30),
        ));
        let deps = AssistantDeps {
            store: store.clone(),
            scheduler: scheduler.clone(),
            notifier: notifier.clone(),
            input: Box::new(ScriptedInput::new(follow_ups.iter().copied())),
            launcher: Arc::new(NoLauncher),
            telemetry: Arc::new(NoTelemetry),
            clock,
        };
        Harness {
            router: IntentRouter::new(&AssistantConfig::default(), deps),
            notifier,
            store,
            scheduler,
        }
    }

    #[tokio::test]
    async fn empty_utterance_is_a_no_op() {
        let mut h = harness(&[]).await;
        let out = h.router.dispatch("   ").await;
        assert_eq!(out.intent, Intent::Unknown);
        assert!(out.response.is_empty());
        assert!(out.keep_running);
    }

    #[tokio::test]
    async fn time_and_date_read_the_clock() {
        let mut h = harness(&[]).await;
        assert_eq!(
            h.router.dispatch("what time is it").await.response,
            "The current time is 02:05 PM"
        );
        assert_eq!(
            h.router.dispatch("what day is it").await.response,
            "Today is Friday, March 15, 2024"
        );
    }

    #[tokio::test]
    async fn timer_registers_a_waiter() {
        let mut h = harness(&[]).await;
        let out = h.router.dispatch("set a timer for 5 minutes").await;
        assert_eq!(out.intent, Intent::SetTimer);
        assert_eq!(out.response, "5 minute timer set for 300 seconds");
        assert_eq!(h.scheduler.timers().await.len(), 1);

        let out = h.router.dispatch("set a timer").await;
        assert_eq!(
            out.response,
            "Please specify the timer duration, like 5 minutes or 30 seconds"
        );
        let out = h.router.dispatch("timer for some minutes").await;
        assert_eq!(
            out.response,
            "I couldn't understand the timer duration. Please try again."
        );
    }

    #[tokio::test]
    async fn alarm_prompts_and_persists() {
        let mut h = harness(&["7 30"]).await;
        let out = h.router.dispatch("set an alarm").await;
        assert_eq!(out.response, "Alarm set for 07:30");
        assert_eq!(
            h.notifier.announcements(),
            vec!["What time should I set the alarm for? Say it in 24-hour format, like 07 30"]
        );
        let alarms = h.store.alarms().await;
        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms[0].label, "Wake up alarm");
        assert!(alarms[0].active);
    }

    #[tokio::test]
    async fn alarm_rejects_unreadable_time() {
        let mut h = harness(&["later"]).await;
        assert_eq!(
            h.router.dispatch("wake me up").await.response,
            "Invalid time format"
        );
        assert!(h.store.alarms().await.is_empty());
    }

    #[tokio::test]
    async fn closed_follow_up_aborts_silently() {
        let mut h = harness(&[]).await;
        let out = h.router.dispatch("remind me").await;
        assert_eq!(out.intent, Intent::ReminderAdd);
        assert!(out.response.is_empty());
        assert!(h.store.reminders().await.is_empty());
        assert_eq!(h.notifier.announcements().len(), 1);
    }

    #[tokio::test]
    async fn contact_add_then_find() {
        let mut h = harness(&["Bob", "555 1234"]).await;
        assert_eq!(
            h.router.dispatch("add contact").await.response,
            "Contact Bob added with number 555 1234"
        );
        assert_eq!(
            h.router.dispatch("find contact BOB").await.response,
            "Bob's number is 555 1234"
        );
        assert_eq!(
            h.router.dispatch("get contact alice").await.response,
            "I couldn't find alice in your contacts"
        );
    }

    #[tokio::test]
    async fn reminders_are_listed_with_a_count() {
        let mut h = harness(&["buy milk", "water plants"]).await;
        h.router.dispatch("remind me").await;
        h.router.dispatch("remind me").await;
        assert_eq!(
            h.router.dispatch("show reminders").await.response,
            "You have 2 reminders\nReminder 1: buy milk\nReminder 2: water plants"
        );
    }

    #[tokio::test]
    async fn notes_show_the_latest_five() {
        let lines: Vec<String> = (1..=7).map(|i| format!("note {i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut h = harness(&refs).await;
        for _ in 0..7 {
            h.router.dispatch("take a note").await;
        }
        let out = h.router.dispatch("read my notes").await;
        let shown: Vec<&str> = out.response.lines().collect();
        assert_eq!(shown[0], "You have 7 notes");
        assert_eq!(shown.len(), 6);
        assert!(shown[1].ends_with("note 3"));
        assert!(shown[5].ends_with("note 7"));
    }

    #[tokio::test]
    async fn calculate_and_convert() {
        let mut h = harness(&[]).await;
        assert_eq!(
            h.router.dispatch("what is 4 plus 5").await.response,
            "The answer is 9"
        );
        assert_eq!(
            h.router.dispatch("calculate banana").await.response,
            "Sorry, I couldn't calculate that"
        );
        assert!(h.router.dispatch("calculate").await.response.is_empty());
        assert_eq!(
            h.router.dispatch("convert 100 celsius to fahrenheit").await.response,
            "100 celsius is 212.00 fahrenheit"
        );
        assert_eq!(
            h.router.dispatch("convert 5 parsecs to miles").await.response,
            "Sorry, I can't convert from parsecs to miles"
        );
        assert_eq!(
            h.router.dispatch("convert").await.response,
            "Please say convert followed by value, unit, to, and target unit"
        );
    }

    #[tokio::test]
    async fn collaborator_failures_become_apologies() {
        let mut h = harness(&[]).await;
        assert_eq!(
            h.router.dispatch("open spaceship").await.response,
            "I don't know how to open spaceship"
        );
        assert_eq!(
            h.router.dispatch("open").await.response,
            "Which application should I open?"
        );
        assert_eq!(
            h.router.dispatch("cpu usage").await.response,
            "Sorry, I couldn't get the system information"
        );
    }

    #[tokio::test]
    async fn dice_and_coin() {
        let mut h = harness(&[]).await;
        for _ in 0..20 {
            let out = h.router.dispatch("roll a dice").await.response;
            let n: u32 = out.trim_start_matches("You rolled a ").parse().unwrap();
            assert!((1..=6).contains(&n));
        }
        let coin = h.router.dispatch("flip a coin").await.response;
        assert!(coin == "The coin landed on Heads" || coin == "The coin landed on Tails");
        assert_eq!(dice_sides("roll dice 20 sided"), 20);
        assert_eq!(dice_sides("roll dice zero sided"), 6);
        assert_eq!(dice_sides("roll dice 0 sided"), 6);
    }

    #[tokio::test]
    async fn meeting_is_stored_verbatim() {
        let mut h = harness(&["standup", "tomorrow at 9"]).await;
        assert_eq!(
            h.router.dispatch("schedule a meeting").await.response,
            "Meeting 'standup' scheduled for tomorrow at 9"
        );
        let meetings = h.store.meetings().await;
        assert_eq!(meetings[0].time, "tomorrow at 9");
    }

    #[tokio::test]
    async fn exit_stops_the_loop() {
        let mut h = harness(&[]).await;
        let out = h.router.dispatch("goodbye").await;
        assert_eq!(out.intent, Intent::Exit);
        assert_eq!(out.response, "Goodbye! Have a great day!");
        assert!(!out.keep_running);
    }

    #[tokio::test]
    async fn run_greets_and_stops_on_exit() {
        let store = Arc::new(PersistentStore::load(Arc::new(MemoryDocumentStore::new())).await);
        let notifier = Arc::new(RecordingNotifier::new());
        let clock = Arc::new(ManualClock::at(9, 0));
        let scheduler = Arc::new(Scheduler::new(
            store.clone(),
            notifier.clone(),
            clock.clone(),
            Duration::from_secs(30),
        ));
        let deps = AssistantDeps {
            store,
            scheduler,
            notifier: notifier.clone(),
            input: Box::new(ScriptedInput::new(["", "tell me a joke", "bye", "help"])),
            launcher: Arc::new(NoLauncher),
            telemetry: Arc::new(NoTelemetry),
            clock,
        };
        let mut router = IntentRouter::new(&AssistantConfig::default(), deps);
        router.run().await;

        let said = notifier.announcements();
        assert_eq!(said.len(), 3);
        assert!(said[0].starts_with("Hello! I am Pico"));
        assert_eq!(said[2], "Goodbye! Have a great day!");
    }
}
