//! System telemetry snapshot.

use async_trait::async_trait;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

use crate::error::TelemetryError;

/// Point-in-time system summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSnapshot {
    pub os: String,
    pub cpu_pct: f32,
    pub mem_pct: f32,
    pub battery_pct: Option<f32>,
}

impl SystemSnapshot {
    /// One-sentence spoken summary.
    pub fn summary(&self) -> String {
        let mut text = format!(
            "Your system is running {} with {:.1}% CPU usage and {:.1}% memory usage",
            self.os, self.cpu_pct, self.mem_pct
        );
        if let Some(battery) = self.battery_pct {
            text.push_str(&format!(", battery at {battery:.0}%"));
        }
        text
    }
}

/// Source of system snapshots.
#[async_trait]
pub trait Telemetry: Send + Sync {
    async fn snapshot(&self) -> Result<SystemSnapshot, TelemetryError>;
}

/// Telemetry backed by `sysinfo`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoTelemetry;

#[async_trait]
impl Telemetry for SysinfoTelemetry {
    async fn snapshot(&self) -> Result<SystemSnapshot, TelemetryError> {
        tokio::task::spawn_blocking(collect)
            .await
            .map_err(|e| TelemetryError::Unavailable(e.to_string()))?
    }
}

fn collect() -> Result<SystemSnapshot, TelemetryError> {
    let mut sys = System::new_with_specifics(
        RefreshKind::new()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything()),
    );

    // CPU usage needs two samples.
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    sys.refresh_cpu_all();

    let memory_total = sys.total_memory();
    if memory_total == 0 {
        return Err(TelemetryError::Unavailable("memory totals not reported".into()));
    }
    let mem_pct = (sys.used_memory() as f32 / memory_total as f32) * 100.0;

    let os = match (System::name(), System::os_version()) {
        (Some(name), Some(version)) => format!("{name} {version}"),
        (Some(name), None) => name,
        _ => std::env::consts::OS.to_string(),
    };

    Ok(SystemSnapshot {
        os,
        cpu_pct: sys.global_cpu_usage(),
        mem_pct,
        battery_pct: battery_percent(),
    })
}

/// Battery charge from the kernel's power-supply class, when one exists.
#[cfg(target_os = "linux")]
fn battery_percent() -> Option<f32> {
    let entries = std::fs::read_dir("/sys/class/power_supply").ok()?;
    entries
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().starts_with("BAT"))
        .find_map(|e| {
            std::fs::read_to_string(e.path().join("capacity"))
                .ok()?
                .trim()
                .parse::<f32>()
                .ok()
        })
}

#[cfg(not(target_os = "linux"))]
fn battery_percent() -> Option<f32> {
    None
}
