//! Formatting utilities for Telegram HTML output.

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Title-case a string word by word.
///
/// A letter is upper-cased when the previous character is not a letter and
/// lower-cased otherwise, so `"ST. JOHN'S 3RD"` becomes `"St. John'S 3Rd"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}
