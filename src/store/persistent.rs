//! The single owner of every persisted collection.
//!
//! Collections are loaded once and flushed after every mutation. A mutation
//! is applied to a staged copy of its collection; memory takes the copy only
//! once the write succeeded, so a failed write leaves the store as it was.
//! One async mutex guards both the in-memory state and the write, so
//! concurrent writers (the dispatch loop, alarm waiters) never interleave a
//! persist.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::document::{Collection, DocumentStore};
use crate::store::model::{Alarm, Meeting, Note, Reminder, Todo};

#[derive(Default)]
struct Collections {
    reminders: Vec<Reminder>,
    todos: Vec<Todo>,
    notes: Vec<Note>,
    contacts: BTreeMap<String, String>,
    meetings: Vec<Meeting>,
    alarms: Vec<Alarm>,
}

/// Typed, persisted collections behind synchronized operations.
pub struct PersistentStore {
    docs: Arc<dyn DocumentStore>,
    state: Mutex<Collections>,
}

impl PersistentStore {
    /// Load every collection. Missing or unreadable documents start empty.
    pub async fn load(docs: Arc<dyn DocumentStore>) -> Self {
        let notes = match docs.read_lines(Collection::Notes).await {
            Ok(lines) => lines.iter().map(|l| Note::from_line(l)).collect(),
            Err(e) => {
                warn!(collection = "notes", error = %e, "Notes unreadable, starting empty");
                Vec::new()
            }
        };

        let state = Collections {
            reminders: load_collection(docs.as_ref(), Collection::Reminders).await,
            todos: load_collection(docs.as_ref(), Collection::Todos).await,
            notes,
            contacts: load_collection(docs.as_ref(), Collection::Contacts).await,
            meetings: load_collection(docs.as_ref(), Collection::Meetings).await,
            alarms: load_collection(docs.as_ref(), Collection::Alarms).await,
        };

        info!(
            reminders = state.reminders.len(),
            todos = state.todos.len(),
            notes = state.notes.len(),
            contacts = state.contacts.len(),
            meetings = state.meetings.len(),
            alarms = state.alarms.len(),
            "Store loaded"
        );

        Self {
            docs,
            state: Mutex::new(state),
        }
    }

    async fn persist<T: Serialize + ?Sized>(
        &self,
        collection: Collection,
        items: &T,
    ) -> Result<(), StoreError> {
        let doc = serde_json::to_value(items)?;
        self.docs.write_collection(collection, &doc).await?;
        debug!(collection = collection.name(), "Collection persisted");
        Ok(())
    }

    // ── Reminders ───────────────────────────────────────────────────

    pub async fn add_reminder(&self, reminder: Reminder) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let text = reminder.text.clone();
        let mut staged = state.reminders.clone();
        staged.push(reminder);
        self.persist(Collection::Reminders, &staged).await?;
        state.reminders = staged;
        info!(text = %text, "Reminder added");
        Ok(())
    }

    pub async fn reminders(&self) -> Vec<Reminder> {
        self.state.lock().await.reminders.clone()
    }

    /// Reminders not yet completed, in insertion order.
    pub async fn active_reminders(&self) -> Vec<Reminder> {
        let state = self.state.lock().await;
        state.reminders.iter().filter(|r| !r.completed).cloned().collect()
    }

    /// Mark the `index`-th active reminder (0-based) completed.
    pub async fn complete_reminder(&self, index: usize) -> Result<Reminder, StoreError> {
        let mut state = self.state.lock().await;
        let mut staged = state.reminders.clone();
        let reminder = staged
            .iter_mut()
            .filter(|r| !r.completed)
            .nth(index)
            .ok_or_else(|| StoreError::NotFound {
                entity: "reminder".into(),
                key: (index + 1).to_string(),
            })?;
        reminder.completed = true;
        let done = reminder.clone();
        self.persist(Collection::Reminders, &staged).await?;
        state.reminders = staged;
        Ok(done)
    }

    // ── Todos ───────────────────────────────────────────────────────

    pub async fn add_todo(&self, todo: Todo) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let task = todo.task.clone();
        let mut staged = state.todos.clone();
        staged.push(todo);
        self.persist(Collection::Todos, &staged).await?;
        state.todos = staged;
        info!(task = %task, "Todo added");
        Ok(())
    }

    pub async fn todos(&self) -> Vec<Todo> {
        self.state.lock().await.todos.clone()
    }

    pub async fn active_todos(&self) -> Vec<Todo> {
        let state = self.state.lock().await;
        state.todos.iter().filter(|t| !t.completed).cloned().collect()
    }

    /// Mark the `index`-th open task (0-based) completed.
    pub async fn complete_todo(&self, index: usize) -> Result<Todo, StoreError> {
        let mut state = self.state.lock().await;
        let mut staged = state.todos.clone();
        let todo = staged
            .iter_mut()
            .filter(|t| !t.completed)
            .nth(index)
            .ok_or_else(|| StoreError::NotFound {
                entity: "todo".into(),
                key: (index + 1).to_string(),
            })?;
        todo.completed = true;
        let done = todo.clone();
        self.persist(Collection::Todos, &staged).await?;
        state.todos = staged;
        Ok(done)
    }

    // ── Notes ───────────────────────────────────────────────────────

    /// Append a note. Notes are the only collection written by appending.
    pub async fn add_note(&self, note: Note) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        self.docs.append_line(Collection::Notes, &note.to_line()).await?;
        info!(timestamp = %note.timestamp, "Note saved");
        state.notes.push(note);
        Ok(())
    }

    pub async fn notes(&self) -> Vec<Note> {
        self.state.lock().await.notes.clone()
    }

    // ── Contacts ────────────────────────────────────────────────────

    /// Insert or replace a contact. Names are matched case-insensitively.
    pub async fn upsert_contact(&self, name: &str, number: &str) -> Result<(), StoreError> {
        let key = contact_key(name);
        let mut state = self.state.lock().await;
        let mut staged = state.contacts.clone();
        let previous = staged.insert(key.clone(), number.trim().to_string());
        self.persist(Collection::Contacts, &staged).await?;
        state.contacts = staged;
        info!(name = %key, replaced = previous.is_some(), "Contact saved");
        Ok(())
    }

    pub async fn find_contact(&self, name: &str) -> Option<String> {
        self.state.lock().await.contacts.get(&contact_key(name)).cloned()
    }

    /// All contacts as `(lower-cased name, number)`, sorted by name.
    pub async fn contacts(&self) -> Vec<(String, String)> {
        let state = self.state.lock().await;
        state
            .contacts
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    // ── Meetings ────────────────────────────────────────────────────

    pub async fn add_meeting(&self, meeting: Meeting) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        info!(title = %meeting.title, time = %meeting.time, "Scheduling meeting");
        let mut staged = state.meetings.clone();
        staged.push(meeting);
        self.persist(Collection::Meetings, &staged).await?;
        state.meetings = staged;
        Ok(())
    }

    pub async fn meetings(&self) -> Vec<Meeting> {
        self.state.lock().await.meetings.clone()
    }

    // ── Alarms ──────────────────────────────────────────────────────

    pub async fn add_alarm(&self, alarm: Alarm) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let mut staged = state.alarms.clone();
        staged.push(alarm);
        self.persist(Collection::Alarms, &staged).await?;
        state.alarms = staged;
        Ok(())
    }

    pub async fn alarms(&self) -> Vec<Alarm> {
        self.state.lock().await.alarms.clone()
    }

    pub async fn alarm(&self, id: Uuid) -> Option<Alarm> {
        let state = self.state.lock().await;
        state.alarms.iter().find(|a| a.id == id).cloned()
    }

    /// Current `active` flag of an alarm; unknown alarms read as inactive.
    pub async fn alarm_is_active(&self, id: Uuid) -> bool {
        let state = self.state.lock().await;
        state.alarms.iter().any(|a| a.id == id && a.active)
    }

    /// Set an alarm's `active` flag. Returns the previous value.
    pub async fn set_alarm_active(&self, id: Uuid, active: bool) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        let mut staged = state.alarms.clone();
        let alarm = staged
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "alarm".into(),
                key: id.to_string(),
            })?;
        let previous = alarm.active;
        if previous != active {
            alarm.active = active;
            self.persist(Collection::Alarms, &staged).await?;
            state.alarms = staged;
        }
        Ok(previous)
    }
}

fn contact_key(name: &str) -> String {
    name.trim().to_lowercase()
}

async fn load_collection<T>(docs: &dyn DocumentStore, collection: Collection) -> T
where
    T: DeserializeOwned + Default,
{
    match docs.read_collection(collection).await {
        Ok(Some(doc)) => match serde_json::from_value(doc) {
            Ok(items) => items,
            Err(e) => {
                warn!(collection = collection.name(), error = %e, "Collection malformed, starting empty");
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            warn!(collection = collection.name(), error = %e, "Collection unreadable, starting empty");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::document::{JsonFileStore, MemoryDocumentStore};
    use tempfile::TempDir;

    async fn memory_store() -> (PersistentStore, Arc<MemoryDocumentStore>) {
        let docs = Arc::new(MemoryDocumentStore::new());
        let store = PersistentStore::load(docs.clone()).await;
        (store, docs)
    }

    #[tokio::test]
    async fn reminders_survive_reload() {
        let dir = TempDir::new().unwrap();
        let docs: Arc<dyn DocumentStore> = Arc::new(JsonFileStore::new(dir.path().to_path_buf()));

        let store = PersistentStore::load(docs.clone()).await;
        store.add_reminder(Reminder::new("call mom")).await.unwrap();
        store.add_reminder(Reminder::new("pay rent")).await.unwrap();
        let before = store.reminders().await;
        drop(store);

        let reloaded = PersistentStore::load(docs).await;
        assert_eq!(reloaded.reminders().await, before);
    }

    #[tokio::test]
    async fn contact_upsert_is_case_insensitive() {
        let (store, _) = memory_store().await;
        store.upsert_contact("Bob", "111").await.unwrap();
        store.upsert_contact("bob", "222").await.unwrap();

        let contacts = store.contacts().await;
        assert_eq!(contacts, vec![("bob".to_string(), "222".to_string())]);
        assert_eq!(store.find_contact("BOB").await.as_deref(), Some("222"));
    }

    #[tokio::test]
    async fn corrupt_documents_load_empty() {
        let docs = Arc::new(MemoryDocumentStore::new());
        docs.seed_raw(Collection::Reminders, "{{{ not json");
        docs.seed_raw(Collection::Contacts, "[1, 2, 3]");
        let store = PersistentStore::load(docs).await;
        assert!(store.reminders().await.is_empty());
        assert!(store.contacts().await.is_empty());
    }

    #[tokio::test]
    async fn completion_hides_from_active_lists() {
        let (store, _) = memory_store().await;
        store.add_todo(Todo::new("write report")).await.unwrap();
        store.add_todo(Todo::new("water plants")).await.unwrap();

        let done = store.complete_todo(0).await.unwrap();
        assert_eq!(done.task, "write report");
        let active = store.active_todos().await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].task, "water plants");
        assert_eq!(store.todos().await.len(), 2);

        assert!(matches!(
            store.complete_todo(5).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn complete_reminder_persists() {
        let (store, docs) = memory_store().await;
        store.add_reminder(Reminder::new("stretch")).await.unwrap();
        store.complete_reminder(0).await.unwrap();
        assert!(store.active_reminders().await.is_empty());
        assert!(docs.raw(Collection::Reminders).unwrap().contains("\"completed\": true"));
    }

    #[tokio::test]
    async fn notes_are_appended_as_lines() {
        let (store, docs) = memory_store().await;
        store.add_note(Note::new("first idea")).await.unwrap();
        store.add_note(Note::new("second idea")).await.unwrap();

        let raw = docs.raw(Collection::Notes).unwrap();
        assert_eq!(raw.lines().count(), 2);
        assert!(raw.lines().all(|l| l.starts_with('[')));

        let reloaded = PersistentStore::load(docs).await;
        let notes = reloaded.notes().await;
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[1].text, "second idea");
    }

    #[tokio::test]
    async fn meetings_keep_time_verbatim() {
        let (store, docs) = memory_store().await;
        store
            .add_meeting(Meeting::new("standup", "tomorrow around nine-ish"))
            .await
            .unwrap();
        let reloaded = PersistentStore::load(docs).await;
        assert_eq!(reloaded.meetings().await[0].time, "tomorrow around nine-ish");
    }

    #[tokio::test]
    async fn alarm_flag_round_trip() {
        let (store, docs) = memory_store().await;
        let alarm = Alarm::new("07:30", "Wake up alarm");
        let id = alarm.id;
        store.add_alarm(alarm).await.unwrap();
        assert!(store.alarm_is_active(id).await);

        assert!(store.set_alarm_active(id, false).await.unwrap());
        assert!(!store.alarm_is_active(id).await);

        let reloaded = PersistentStore::load(docs).await;
        assert!(!reloaded.alarm(id).await.unwrap().active);
        assert!(!reloaded.alarm_is_active(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn failed_writes_leave_memory_unchanged() {
        let (store, docs) = memory_store().await;
        store.add_reminder(Reminder::new("stretch")).await.unwrap();
        store.add_todo(Todo::new("write report")).await.unwrap();
        store.upsert_contact("alice", "111").await.unwrap();
        let alarm = Alarm::new("07:30", "Wake up alarm");
        let id = alarm.id;
        store.add_alarm(alarm).await.unwrap();

        docs.set_fail_writes(true);
        assert!(store.add_reminder(Reminder::new("pay rent")).await.is_err());
        assert!(store.complete_reminder(0).await.is_err());
        assert!(store.add_todo(Todo::new("water plants")).await.is_err());
        assert!(store.complete_todo(0).await.is_err());
        assert!(store.upsert_contact("Alice", "222").await.is_err());
        assert!(store.upsert_contact("bob", "333").await.is_err());
        assert!(store.add_note(Note::new("lost")).await.is_err());
        assert!(store.add_meeting(Meeting::new("standup", "9am")).await.is_err());
        assert!(store.add_alarm(Alarm::new("08:00", "Second")).await.is_err());
        assert!(store.set_alarm_active(id, false).await.is_err());

        let reminders = store.active_reminders().await;
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].text, "stretch");
        let todos = store.active_todos().await;
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].task, "write report");
        assert_eq!(
            store.contacts().await,
            vec![("alice".to_string(), "111".to_string())]
        );
        assert!(store.notes().await.is_empty());
        assert!(store.meetings().await.is_empty());
        assert_eq!(store.alarms().await.len(), 1);
        assert!(store.alarm_is_active(id).await);

        // Memory and documents still agree once writes recover.
        docs.set_fail_writes(false);
        store.add_todo(Todo::new("water plants")).await.unwrap();
        let reloaded = PersistentStore::load(docs).await;
        assert_eq!(reloaded.todos().await.len(), 2);
        assert_eq!(reloaded.reminders().await.len(), 1);
    }

    #[tokio::test]
    async fn unchanged_alarm_flag_skips_the_write() {
        let (store, docs) = memory_store().await;
        let alarm = Alarm::new("07:30", "Wake up alarm");
        let id = alarm.id;
        store.add_alarm(alarm).await.unwrap();

        docs.set_fail_writes(true);
        assert!(store.set_alarm_active(id, true).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_appends_are_serialized() {
        let (store, docs) = memory_store().await;
        let store = Arc::new(store);
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.add_todo(Todo::new(format!("task {i}"))).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let reloaded = PersistentStore::load(docs).await;
        assert_eq!(reloaded.todos().await.len(), 20);
    }
}
