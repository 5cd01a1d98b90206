//! Comment text normalization.
//!
//! Produces the cleaned working text every later stage runs on: lower-case ASCII letters,
//! digits, basic punctuation and single spaces. URLs, mentions and hashtags are dropped,
//! emoji become their names.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"http\S+|www\S+").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[@#]\S+").unwrap());
static DISALLOWED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s.,!?]").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Cleans raw comment text. Pure and total.
pub fn normalize(raw: &str) -> String {
    let text = raw.to_lowercase();
    let text = URL_RE.replace_all(&text, "");
    let text = TAG_RE.replace_all(&text, "");
    let text = demojize(&text);
    let text = DISALLOWED_RE.replace_all(&text, " ");
    let text = collapse_repeats(&text);
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Replaces every emoji grapheme with ` <name> `.
pub fn demojize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for grapheme in text.graphemes(true) {
        match lookup_emoji(grapheme) {
            Some(name) => {
                out.push(' ');
                out.push_str(&name.to_lowercase());
                out.push(' ');
            }
            None => out.push_str(grapheme),
        }
    }
    out
}

fn lookup_emoji(grapheme: &str) -> Option<&'static str> {
    if grapheme.is_ascii() {
        return None;
    }
    emojis::get(grapheme)
        // Emoji typed without the variation selector still count.
        .or_else(|| emojis::get(grapheme.trim_end_matches('\u{fe0f}')))
        .map(|e| e.name())
}

/// Shortens runs of three or more identical characters to two ("soooo" -> "soo").
pub fn collapse_repeats(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    let mut run = 0usize;
    for c in text.chars() {
        if Some(c) == prev {
            run += 1;
        } else {
            prev = Some(c);
            run = 1;
        }
        if run <= 2 {
            out.push(c);
        }
    }
    out
}
