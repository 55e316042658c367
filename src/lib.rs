//! Pico Assist, a keyword-driven personal command assistant.

pub mod channels;
pub mod config;
pub mod error;
pub mod intent;
pub mod notify;
pub mod scheduler;
pub mod slots;
pub mod store;
pub mod system;
