// Text form of a missing cell once it has been coerced to a string.
pub const MISSING_TEXT: &str = "nan";

/// Coerce a possibly-missing cell to text and strip surrounding whitespace.
pub fn coerce_text(raw: Option<&str>) -> &str {
    raw.unwrap_or(MISSING_TEXT).trim()
}

pub fn clean_text(raw: Option<&str>) -> String {
    title_case(coerce_text(raw))
}

/// Uppercase the first letter of every word and lowercase the rest. A word
/// starts at any letter that does not follow another cased letter, so
/// apostrophes, hyphens and digits all start a new word.
// Uses full uppercase mapping, not titlecase: "ßa" becomes "SSa".
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_cased = false;
    for ch in input.chars() {
        if prev_cased {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        prev_cased = is_cased(ch);
    }
    out
}

fn is_cased(ch: char) -> bool {
    ch.is_lowercase() || ch.is_uppercase()
}
