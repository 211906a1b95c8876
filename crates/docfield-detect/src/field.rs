//! Field kinds and detected boxes

use docfield_pdfium::{Bounded, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a form field.
///
/// The detector itself only distinguishes text boxes and checkboxes; the
/// remaining kinds are assigned later from the label text next to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Checkbox,
    Date,
    Signature,
    Number,
}

impl FieldKind {
    /// Map a model class id (0 = text, 1 = checkbox)
    #[must_use]
    pub fn from_class_id(class_id: usize) -> Option<Self> {
        match class_id {
            0 => Some(FieldKind::Text),
            1 => Some(FieldKind::Checkbox),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Date => "date",
            FieldKind::Signature => "signature",
            FieldKind::Number => "number",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detection mapped back to the page, normalized to the unit square
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedField {
    pub kind: FieldKind,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub confidence: f32,
}

impl DetectedField {
    #[must_use]
    pub fn new(kind: FieldKind, rect: Rect, confidence: f32) -> Self {
        Self {
            kind,
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
            confidence,
        }
    }

    #[must_use]
    pub fn endx(&self) -> f32 {
        self.x + self.w
    }

    #[must_use]
    pub fn endy(&self) -> f32 {
        self.y + self.h
    }
}

impl Bounded for DetectedField {
    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_ids() {
        assert_eq!(FieldKind::from_class_id(0), Some(FieldKind::Text));
        assert_eq!(FieldKind::from_class_id(1), Some(FieldKind::Checkbox));
        assert_eq!(FieldKind::from_class_id(7), None);
    }

    #[test]
    fn test_kind_display_is_lowercase() {
        for kind in [
            FieldKind::Text,
            FieldKind::Checkbox,
            FieldKind::Date,
            FieldKind::Signature,
            FieldKind::Number,
        ] {
            assert_eq!(kind.to_string(), kind.as_str());
            assert_eq!(kind.as_str(), kind.as_str().to_lowercase());
        }
    }
}
