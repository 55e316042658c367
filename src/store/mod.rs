//! Persistence layer: typed collections over a JSON document store.

pub mod document;
pub mod model;
pub mod persistent;

pub use document::{Collection, DocumentStore, JsonFileStore, MemoryDocumentStore};
pub use model::{Alarm, Meeting, Note, Reminder, Todo};
pub use persistent::PersistentStore;
