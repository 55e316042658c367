//! Free-text payload helpers shared by the extractors and handlers.

/// Remove every occurrence of each literal in `words` (in order) and trim.
///
/// Plain substring removal, so `strip_words("find contact bob", &["contact", "find"])`
/// yields `"bob"`.
pub fn strip_words(text: &str, words: &[&str]) -> String {
    let mut out = text.to_string();
    for word in words {
        out = out.replace(word, "");
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The digits of the last whitespace token before the first occurrence of `word`.
///
/// Returns `None` when `word` is absent, nothing precedes it, or the token
/// carries no digits. `"set a timer for 5-minute"` with `"minute"` gives `"5"`.
pub fn number_before(text: &str, word: &str) -> Option<String> {
    let idx = text.find(word)?;
    let token = text[..idx].split_whitespace().last()?;
    let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
    (!digits.is_empty()).then_some(digits)
}

/// Title-case each whitespace-separated word (`"bob smith"` → `"Bob Smith"`).
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trigger_words() {
        assert_eq!(strip_words("find contact bob", &["contact", "find"]), "bob");
        assert_eq!(strip_words("open   notepad ", &["open"]), "notepad");
        assert_eq!(strip_words("contact", &["contact"]), "");
    }

    #[test]
    fn number_before_takes_adjacent_token() {
        assert_eq!(number_before("roll a 20 sided dice", "sided").as_deref(), Some("20"));
        assert_eq!(number_before("timer for 5-minute", "minute").as_deref(), Some("5"));
        assert_eq!(number_before("timer for soon minute", "minute"), None);
        assert_eq!(number_before("minute timer", "minute"), None);
        assert_eq!(number_before("no unit here", "minute"), None);
    }

    #[test]
    fn title_cases_names() {
        assert_eq!(title_case("bob smith"), "Bob Smith");
        assert_eq!(title_case(""), "");
    }
}
