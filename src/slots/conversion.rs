//! Unit conversion requests.
//!
//! Parsing is best-effort: the first token must be a number and the second
//! the source unit; the destination is whatever follows a literal "to", or
//! failing that the last token. Malformed sentences may misparse rather than
//! fail, and the unsupported-pair response covers that case.

use crate::error::ConversionError;
use crate::slots::payload::strip_words;

/// A parsed `convert <value> <from> to <to>` request.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub value: f64,
    pub from: String,
    pub to: String,
}

/// Canonical units understood by [`convert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Celsius,
    Fahrenheit,
    Kilometers,
    Miles,
    Meters,
    Feet,
    Kilograms,
    Pounds,
}

impl Unit {
    fn parse(token: &str) -> Option<Self> {
        let unit = match token {
            "celsius" | "centigrade" | "c" => Self::Celsius,
            "fahrenheit" | "f" => Self::Fahrenheit,
            "kilometers" | "kilometer" | "kilometres" | "kilometre" | "km" => Self::Kilometers,
            "miles" | "mile" | "mi" => Self::Miles,
            "meters" | "meter" | "metres" | "metre" | "m" => Self::Meters,
            "feet" | "foot" | "ft" => Self::Feet,
            "kilograms" | "kilogram" | "kilos" | "kilo" | "kg" => Self::Kilograms,
            "pounds" | "pound" | "lbs" | "lb" => Self::Pounds,
            _ => return None,
        };
        Some(unit)
    }
}

/// Split a `convert ...` utterance into value, source and destination unit.
pub fn extract_conversion(text: &str) -> Result<ConversionRequest, ConversionError> {
    let rest = strip_words(text, &["convert"]);
    let parts: Vec<&str> = rest.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(ConversionError::MissingTokens);
    }

    let value: f64 = parts[0]
        .parse()
        .map_err(|_| ConversionError::InvalidValue(parts[0].to_string()))?;
    let from = parts[1];
    let to = parts
        .iter()
        .position(|p| *p == "to")
        .and_then(|idx| parts.get(idx + 1))
        .or(parts.last())
        .ok_or(ConversionError::MissingTokens)?;

    Ok(ConversionRequest {
        value,
        from: from.to_string(),
        to: to.to_string(),
    })
}

/// Perform a parsed conversion.
pub fn convert(request: &ConversionRequest) -> Result<f64, ConversionError> {
    let unsupported = || ConversionError::Unsupported {
        from: request.from.clone(),
        to: request.to.clone(),
    };
    let from = Unit::parse(&request.from.to_lowercase()).ok_or_else(unsupported)?;
    let to = Unit::parse(&request.to.to_lowercase()).ok_or_else(unsupported)?;
    let x = request.value;

    let result = match (from, to) {
        (Unit::Celsius, Unit::Fahrenheit) => x * 9.0 / 5.0 + 32.0,
        (Unit::Fahrenheit, Unit::Celsius) => (x - 32.0) * 5.0 / 9.0,
        (Unit::Kilometers, Unit::Miles) => x * 0.621371,
        (Unit::Miles, Unit::Kilometers) => x * 1.60934,
        (Unit::Meters, Unit::Feet) => x * 3.28084,
        (Unit::Feet, Unit::Meters) => x * 0.3048,
        (Unit::Kilograms, Unit::Pounds) => x * 2.20462,
        (Unit::Pounds, Unit::Kilograms) => x * 0.453592,
        _ => return Err(unsupported()),
    };
    Ok(result)
}
