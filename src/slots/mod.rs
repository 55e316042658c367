//! Slot extraction: pure functions turning free text into typed values.
//!
//! Every extractor is total: malformed input comes back as an error value,
//! never a panic.

pub mod arithmetic;
pub mod clock;
pub mod conversion;
pub mod duration;
pub mod payload;

pub use arithmetic::{calculate, evaluate, format_number, normalize_arithmetic};
pub use clock::extract_clock_time;
pub use conversion::{ConversionRequest, convert, extract_conversion};
pub use duration::{TimerSpec, extract_duration};
pub use payload::{number_before, strip_words, title_case};
