//! Operating-system collaborators: application launcher and telemetry.

pub mod launcher;
pub mod telemetry;

pub use launcher::{Launcher, ProcessLauncher};
pub use telemetry::{SysinfoTelemetry, SystemSnapshot, Telemetry};
