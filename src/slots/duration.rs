//! Timer duration extraction.

use crate::error::DurationError;
use crate::slots::payload::number_before;

/// Unit words in the order they are tried, with their length in seconds.
///
/// The first unit present in the utterance wins regardless of where it
/// appears in the sentence.
const UNITS: &[(&str, u64)] = &[("minute", 60), ("second", 1), ("hour", 3600)];

/// A parsed timer request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSpec {
    pub seconds: u64,
    pub label: String,
}

/// Extract a timer duration and its spoken label from an utterance.
pub fn extract_duration(text: &str) -> Result<TimerSpec, DurationError> {
    let (unit, scale) = UNITS
        .iter()
        .find(|(unit, _)| text.contains(unit))
        .ok_or(DurationError::MissingUnit)?;

    let digits = number_before(text, unit).ok_or_else(|| DurationError::MissingNumber {
        unit: unit.to_string(),
    })?;
    let amount: u64 = digits.parse().map_err(|_| DurationError::Overflow)?;
    if amount == 0 {
        return Err(DurationError::Zero);
    }
    let seconds = amount.checked_mul(*scale).ok_or(DurationError::Overflow)?;

    Ok(TimerSpec {
        seconds,
        label: format!("{amount} {unit} timer"),
    })
}
