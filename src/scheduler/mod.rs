//! Timer and alarm scheduler.
//!
//! Every timer and alarm is an independent tokio task (a *waiter*). The
//! scheduler tracks live waiters so they can be inspected, and hands back a
//! oneshot receiver that resolves once the waiter finishes:
//!
//! - Timer: `Running` while registered, then `Fired`. Timers cannot be cancelled.
//! - Alarm: `Armed` while registered, then `Rang` or `Cancelled`. An armed
//!   alarm re-reads the wall clock and its persisted `active` flag once per
//!   poll interval; clearing the flag is the only way to cancel it. An
//!   alarm whose flag cannot be cleared when it rings stays armed and rings
//!   at most once per matching minute.
//!
//! Waiters remove themselves from the registry when they finish. There is no
//! shutdown path: unfinished waiters are dropped with the runtime.

pub mod clock;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::notify::Notifier;
use crate::store::{Alarm, PersistentStore};

pub use clock::{Clock, ManualClock, SystemClock};

/// What a waiter is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaiterKind {
    Timer,
    Alarm,
}

/// How a waiter finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaiterOutcome {
    /// Timer duration elapsed and the notifier was called.
    Fired,
    /// Alarm time matched and the notifier was called.
    Rang,
    /// Alarm was deactivated before its time came.
    Cancelled,
}

/// A running timer, as seen from outside its waiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerInfo {
    pub id: Uuid,
    pub label: String,
    pub duration_seconds: u64,
}

/// Returned on registration; resolves when the waiter finishes.
#[derive(Debug)]
pub struct WaiterHandle {
    pub id: Uuid,
    pub kind: WaiterKind,
    done: oneshot::Receiver<WaiterOutcome>,
}

impl WaiterHandle {
    /// Wait for the waiter to finish. `None` if it was dropped without finishing.
    pub async fn outcome(self) -> Option<WaiterOutcome> {
        self.done.await.ok()
    }
}

#[derive(Debug)]
enum Tracked {
    Timer { label: String, seconds: u64 },
    Alarm { time: String, label: String },
}

#[derive(Debug)]
struct TrackedWaiter {
    entry: Tracked,
    handle: JoinHandle<()>,
}

/// Owns every live timer and alarm waiter.
pub struct Scheduler {
    store: Arc<PersistentStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    waiters: Arc<RwLock<HashMap<Uuid, TrackedWaiter>>>,
}

impl Scheduler {
    pub fn new(
        store: Arc<PersistentStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            poll_interval,
            waiters: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Start a countdown. Returns as soon as the waiter is registered.
    pub async fn start_timer(&self, seconds: u64, label: impl Into<String>) -> WaiterHandle {
        let seconds = seconds.max(1);
        let label = label.into();
        let id = Uuid::new_v4();
        let (done_tx, done_rx) = oneshot::channel();

        let notifier = Arc::clone(&self.notifier);
        let waiters = Arc::clone(&self.waiters);
        let alert = format!("Timer alert! {label} is up!");

        // Hold the registry lock across spawn so the waiter cannot deregister
        // itself before it has been registered.
        let mut registry = self.waiters.write().await;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(seconds)).await;
            info!(timer_id = %id, "Timer fired");
            notifier.announce(&alert).await;
            waiters.write().await.remove(&id);
            let _ = done_tx.send(WaiterOutcome::Fired);
        });
        registry.insert(
            id,
            TrackedWaiter {
                entry: Tracked::Timer {
                    label: label.clone(),
                    seconds,
                },
                handle,
            },
        );

        info!(timer_id = %id, label = %label, seconds, "Timer started");
        WaiterHandle {
            id,
            kind: WaiterKind::Timer,
            done: done_rx,
        }
    }

    /// Persist a new active alarm and arm its waiter.
    pub async fn set_alarm(
        &self,
        time: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<WaiterHandle, StoreError> {
        let alarm = Alarm::new(time, label);
        self.store.add_alarm(alarm.clone()).await?;
        info!(alarm_id = %alarm.id, time = %alarm.time, label = %alarm.label, "Alarm set");
        Ok(self.spawn_alarm(alarm).await)
    }

    /// Deactivate an alarm. Its waiter stops at its next poll.
    ///
    /// Returns whether the alarm was active before the call.
    pub async fn cancel_alarm(&self, id: Uuid) -> Result<bool, StoreError> {
        let was_active = self.store.set_alarm_active(id, false).await?;
        info!(alarm_id = %id, was_active, "Alarm deactivated");
        Ok(was_active)
    }

    /// Arm a waiter for every persisted active alarm that has none.
    ///
    /// Called once at startup; returns how many waiters were armed.
    pub async fn restore_alarms(&self) -> usize {
        let mut armed = 0;
        for alarm in self.store.alarms().await.into_iter().filter(|a| a.active) {
            if self.arm(alarm).await.is_some() {
                armed += 1;
            }
        }
        if armed > 0 {
            info!(count = armed, "Restored active alarms");
        }
        armed
    }

    /// Arm a waiter for `alarm` unless one is already live.
    pub async fn arm(&self, alarm: Alarm) -> Option<WaiterHandle> {
        if self.waiters.read().await.contains_key(&alarm.id) {
            debug!(alarm_id = %alarm.id, "Alarm already armed");
            return None;
        }
        Some(self.spawn_alarm(alarm).await)
    }

    async fn spawn_alarm(&self, alarm: Alarm) -> WaiterHandle {
        let id = alarm.id;
        let (done_tx, done_rx) = oneshot::channel();

        let store = Arc::clone(&self.store);
        let notifier = Arc::clone(&self.notifier);
        let clock = Arc::clone(&self.clock);
        let waiters = Arc::clone(&self.waiters);
        let poll = self.poll_interval;
        let entry = Tracked::Alarm {
            time: alarm.time.clone(),
            label: alarm.label.clone(),
        };

        let mut registry = self.waiters.write().await;
        let handle = tokio::spawn(async move {
            let outcome = watch_alarm(alarm, store, notifier, clock, poll).await;
            waiters.write().await.remove(&id);
            let _ = done_tx.send(outcome);
        });
        registry.insert(id, TrackedWaiter { entry, handle });

        WaiterHandle {
            id,
            kind: WaiterKind::Alarm,
            done: done_rx,
        }
    }

    /// Timers still counting down.
    pub async fn timers(&self) -> Vec<TimerInfo> {
        self.waiters
            .read()
            .await
            .iter()
            .filter_map(|(id, w)| match &w.entry {
                Tracked::Timer { label, seconds } => Some(TimerInfo {
                    id: *id,
                    label: label.clone(),
                    duration_seconds: *seconds,
                }),
                Tracked::Alarm { .. } => None,
            })
            .collect()
    }

    /// `(alarm id, HH:MM, label)` for every armed alarm waiter.
    pub async fn armed_alarms(&self) -> Vec<(Uuid, String, String)> {
        self.waiters
            .read()
            .await
            .iter()
            .filter_map(|(id, w)| match &w.entry {
                Tracked::Alarm { time, label } => Some((*id, time.clone(), label.clone())),
                Tracked::Timer { .. } => None,
            })
            .collect()
    }

    /// Number of live waiters of either kind.
    pub async fn live_count(&self) -> usize {
        self.waiters
            .read()
            .await
            .values()
            .filter(|w| !w.handle.is_finished())
            .count()
    }

    pub async fn is_live(&self, id: Uuid) -> bool {
        self.waiters
            .read()
            .await
            .get(&id)
            .is_some_and(|w| !w.handle.is_finished())
    }
}

/// Poll loop of one alarm waiter. The first check happens immediately.
async fn watch_alarm(
    alarm: Alarm,
    store: Arc<PersistentStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    poll: Duration,
) -> WaiterOutcome {
    let mut ticker = tokio::time::interval(poll);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Set after a ring whose deactivation failed; cleared once the minute passes.
    let mut rang_this_minute = false;

    loop {
        ticker.tick().await;

        if !store.alarm_is_active(alarm.id).await {
            info!(alarm_id = %alarm.id, "Alarm cancelled");
            return WaiterOutcome::Cancelled;
        }

        if clock.hhmm() != alarm.time {
            rang_this_minute = false;
            continue;
        }
        if rang_this_minute {
            continue;
        }

        info!(alarm_id = %alarm.id, time = %alarm.time, "Alarm ringing");
        let persisted = store.set_alarm_active(alarm.id, false).await;
        notifier
            .announce(&format!("Alarm! {}! It's {}", alarm.label, alarm.time))
            .await;
        match persisted {
            Ok(_) => return WaiterOutcome::Rang,
            Err(e) => {
                warn!(alarm_id = %alarm.id, error = %e, "Failed to persist rung alarm, keeping it armed");
                rang_this_minute = true;
            }
        }
    }
}
