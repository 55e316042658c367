//! Alarm clock-time extraction.
//!
//! Deliberately permissive: no range validation is applied, so `"99:99"`
//! passes through. Callers decide whether the time is meaningful.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ClockTimeError;

/// Spoken form with a short hour group: "7 30", "7:30", "at 7.30".
static SPOKEN_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\D)(\d{1,2})\D+(\d{2})(?:\D|$)").unwrap());

/// Extract an `HH:MM` string from a follow-up utterance.
pub fn extract_clock_time(text: &str) -> Result<String, ClockTimeError> {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ':')
        .collect();
    let digit_count = kept.chars().filter(char::is_ascii_digit).count();

    if digit_count >= 4 {
        if kept.contains(':') {
            return Ok(kept.chars().take(5).collect());
        }
        return Ok(format!("{}:{}", &kept[..2], &kept[2..4]));
    }

    if let Some(caps) = SPOKEN_TIME.captures(text) {
        return Ok(format!("{:0>2}:{}", &caps[1], &caps[2]));
    }

    Err(ClockTimeError::TooFewDigits { found: digit_count })
}
