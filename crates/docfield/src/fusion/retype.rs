//! Field retyping from label text

use docfield_detect::FieldKind;
use once_cell::sync::Lazy;
use regex::Regex;

// Keywords only count at the end of the label, ahead of trailing punctuation
static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:date|dated|datum|fecha|data|signed\s+at|signed\s+on|date\s+of\s+birth|birth\s*date|dob)[\s:._*()\-]*$",
    )
    .expect("Invalid date label regex")
});

static SIGNATURE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:signature|sign\s+here|sign|signed|firma|unterschrift|signatur|assinatura)[\s:._*()\-]*$")
        .expect("Invalid signature label regex")
});

static NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:[$€£¥₹]|\b(?:total|amount|price|cost|qty|quantity|sum|fee|subtotal|usd|eur))[\s:._*()\-]*$",
    )
    .expect("Invalid number label regex")
});

const TRAILING_NOISE: &[char] = &[':', '.', '_', '-', '*'];

/// The label a field's preceding text ends with.
///
/// Trailing whitespace and `: . _ - *` are stripped, then everything up to
/// the last line break or tab is dropped.
#[must_use]
pub fn label_segment(text: &str) -> &str {
    let trimmed = text.trim_end_matches(|c: char| c.is_whitespace() || TRAILING_NOISE.contains(&c));
    let start = trimmed.rfind(['\n', '\t']).map_or(0, |pos| pos + 1);
    trimmed[start..].trim_start()
}

/// Kind suggested by the keyword a label ends with, if any. Date wins over
/// signature over number.
#[must_use]
pub fn kind_for_label(label: &str) -> Option<FieldKind> {
    if DATE_PATTERN.is_match(label) {
        Some(FieldKind::Date)
    } else if SIGNATURE_PATTERN.is_match(label) {
        Some(FieldKind::Signature)
    } else if NUMBER_PATTERN.is_match(label) {
        Some(FieldKind::Number)
    } else {
        None
    }
}

/// Kind for a text field preceded by `preceding_text`
#[must_use]
pub fn retype(preceding_text: &str) -> FieldKind {
    kind_for_label(label_segment(preceding_text)).unwrap_or(FieldKind::Text)
}
