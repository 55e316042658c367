//! Application launching.

use std::collections::HashMap;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::LaunchError;

/// Opens applications by spoken name.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self, app: &str) -> Result<(), LaunchError>;
}

/// Spawns known applications through the platform shell without waiting.
pub struct ProcessLauncher {
    apps: HashMap<String, String>,
}

impl ProcessLauncher {
    /// Launcher with the built-in table for the current platform.
    pub fn new() -> Self {
        Self::with_apps(default_apps().iter().copied())
    }

    /// Launcher with a custom `name → shell command` table.
    pub fn with_apps<'a, I>(apps: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            apps: apps
                .into_iter()
                .map(|(name, cmd)| (name.to_string(), cmd.to_string()))
                .collect(),
        }
    }

    /// Spoken names this launcher knows, sorted.
    pub fn known_apps(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.apps.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ProcessLauncher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn launch(&self, app: &str) -> Result<(), LaunchError> {
        let name = app.trim().to_lowercase();
        let cmd = self
            .apps
            .get(&name)
            .ok_or_else(|| LaunchError::UnknownApp { name: name.clone() })?;

        let mut command = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", cmd.as_str()]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", cmd.as_str()]);
            c
        };

        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        command.spawn().map_err(|e| LaunchError::SpawnFailed {
            name: name.clone(),
            reason: e.to_string(),
        })?;

        tracing::info!(app = %name, command = %cmd, "Application launched");
        Ok(())
    }
}

#[cfg(target_os = "windows")]
fn default_apps() -> &'static [(&'static str, &'static str)] {
    &[
        ("notepad", "notepad.exe"),
        ("calculator", "calc.exe"),
        ("paint", "mspaint.exe"),
        ("command prompt", "cmd.exe"),
        ("file explorer", "explorer.exe"),
        ("task manager", "taskmgr.exe"),
        ("control panel", "control.exe"),
        ("settings", "start ms-settings:"),
        ("browser", "start chrome"),
    ]
}

#[cfg(target_os = "macos")]
fn default_apps() -> &'static [(&'static str, &'static str)] {
    &[
        ("notepad", "open -a TextEdit"),
        ("calculator", "open -a Calculator"),
        ("command prompt", "open -a Terminal"),
        ("terminal", "open -a Terminal"),
        ("file explorer", "open ~"),
        ("task manager", "open -a 'Activity Monitor'"),
        ("settings", "open -a 'System Settings'"),
        ("browser", "open -a 'Google Chrome'"),
    ]
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn default_apps() -> &'static [(&'static str, &'static str)] {
    &[
        ("notepad", "gedit"),
        ("calculator", "gnome-calculator"),
        ("command prompt", "x-terminal-emulator"),
        ("terminal", "x-terminal-emulator"),
        ("file explorer", "xdg-open ~"),
        ("task manager", "gnome-system-monitor"),
        ("settings", "gnome-control-center"),
        ("browser", "xdg-open https://"),
    ]
}
