//! Wall-clock sources.

use std::sync::Mutex;

use chrono::{Local, NaiveDateTime, TimeDelta};

/// Reads the local wall clock. Alarms compare against it on every poll.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    /// Current wall-clock time as `HH:MM`.
    fn hhmm(&self) -> String {
        self.now().format("%H:%M").to_string()
    }
}

/// The system's local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Start at today's date with the given `HH:MM`.
    pub fn at(hour: u32, minute: u32) -> Self {
        let start = Local::now()
            .date_naive()
            .and_hms_opt(hour, minute, 0)
            .unwrap_or_else(|| Local::now().naive_local());
        Self::new(start)
    }

    pub fn set(&self, to: NaiveDateTime) {
        if let Ok(mut now) = self.now.lock() {
            *now = to;
        }
    }

    /// Jump to `HH:MM` on the current date.
    pub fn set_hm(&self, hour: u32, minute: u32) {
        if let Some(to) = self.now().date().and_hms_opt(hour, minute, 0) {
            self.set(to);
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now
            .lock()
            .map(|n| *n)
            .unwrap_or_else(|_| Local::now().naive_local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_on_demand() {
        let clock = ManualClock::at(7, 29);
        assert_eq!(clock.hhmm(), "07:29");
        clock.advance(TimeDelta::minutes(1));
        assert_eq!(clock.hhmm(), "07:30");
        clock.set_hm(23, 5);
        assert_eq!(clock.hhmm(), "23:05");
    }
}
