//! Error types for Pico Assist.

use thiserror::Error;

/// Top-level error type for the assistant.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Duration error: {0}")]
    Duration(#[from] DurationError),

    #[error("Clock time error: {0}")]
    ClockTime(#[from] ClockTimeError),

    #[error("Arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),

    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable document store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {collection}: {source}")]
    Io {
        collection: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Collection {collection} is corrupt: {reason}")]
    Corrupt { collection: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },
}

/// Timer duration could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("No duration unit (minute, second, hour) in utterance")]
    MissingUnit,

    #[error("No number before unit '{unit}'")]
    MissingNumber { unit: String },

    #[error("Duration must be at least one second")]
    Zero,

    #[error("Duration too large")]
    Overflow,
}

/// Alarm clock time could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockTimeError {
    #[error("Expected at least 4 digits, found {found}")]
    TooFewDigits { found: usize },
}

/// Spoken arithmetic could not be evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArithmeticError {
    #[error("Empty expression")]
    Empty,

    #[error("Unknown word '{0}'")]
    UnknownWord(String),

    #[error("Invalid number '{0}'")]
    InvalidNumber(String),

    #[error("Unexpected token '{0}'")]
    UnexpectedToken(String),

    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Result is not a finite number")]
    NotFinite,

    #[error("Expression nested too deeply")]
    TooDeep,
}

/// Unit conversion request could not be parsed or served.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("Expected a value, a unit, and a target unit")]
    MissingTokens,

    #[error("Invalid value '{0}'")]
    InvalidValue(String),

    #[error("Cannot convert from {from} to {to}")]
    Unsupported { from: String, to: String },
}

/// Application launch errors.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Unknown application: {name}")]
    UnknownApp { name: String },

    #[error("Failed to launch {name}: {reason}")]
    SpawnFailed { name: String, reason: String },
}

/// System telemetry errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("System information unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for the assistant.
pub type Result<T> = std::result::Result<T, Error>;
