//! Non-maximum suppression and confidence boosting

use crate::field::{DetectedField, FieldKind};
use docfield_pdfium::{Bounded, Rect};

/// `IoU` a text field must exceed against a candidate for the boost to apply
pub const BOOST_IOU_THRESHOLD: f32 = 0.4;

/// Confidence added to a boosted field
pub const BOOST_BONUS: f32 = 1.0;

/// Class-agnostic non-maximum suppression.
///
/// Boxes are visited in descending confidence (ties keep input order). A box
/// is kept unless some already-kept box overlaps it with `IoU` above
/// `iou_threshold`, or with containment at or above `containment_threshold`.
#[must_use]
pub fn non_max_suppression(
    mut fields: Vec<DetectedField>,
    iou_threshold: f32,
    containment_threshold: f32,
) -> Vec<DetectedField> {
    fields.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<DetectedField> = Vec::with_capacity(fields.len());
    for field in fields {
        let rect = field.rect();
        let suppressed = kept.iter().any(|other| {
            let other = other.rect();
            rect.iou(&other) > iou_threshold || rect.containment(&other) >= containment_threshold
        });
        if !suppressed {
            kept.push(field);
        }
    }

    kept
}

/// Raise the confidence of text fields that line up with a candidate box.
///
/// Each text field gains `bonus` at most once, no matter how many candidates
/// overlap it. Other kinds are left alone.
pub fn boost_confidence(fields: &mut [DetectedField], candidates: &[Rect], iou_threshold: f32, bonus: f32) {
    for field in fields.iter_mut().filter(|f| f.kind == FieldKind::Text) {
        let rect = field.rect();
        if candidates.iter().any(|c| rect.iou(c) > iou_threshold) {
            field.confidence += bonus;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(kind: FieldKind, x: f32, y: f32, w: f32, h: f32, confidence: f32) -> DetectedField {
        DetectedField::new(kind, Rect::new(x, y, w, h), confidence)
    }

    #[test]
    fn test_overlap_suppressed() {
        let fields = vec![
            field(FieldKind::Text, 0.1, 0.1, 0.2, 0.05, 0.6),
            field(FieldKind::Text, 0.11, 0.1, 0.2, 0.05, 0.9),
            field(FieldKind::Text, 0.6, 0.1, 0.2, 0.05, 0.5),
        ];
        let kept = non_max_suppression(fields, 0.1, 0.7);

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].confidence, 0.9);
        assert_eq!(kept[1].confidence, 0.5);
    }

    #[test]
    fn test_nested_box_suppressed_by_containment() {
        // IoU is small, but the inner box lies entirely inside the outer one
        let fields = vec![
            field(FieldKind::Text, 0.0, 0.0, 0.5, 0.5, 0.9),
            field(FieldKind::Checkbox, 0.1, 0.1, 0.05, 0.05, 0.8),
        ];
        let kept = non_max_suppression(fields, 0.5, 0.7);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].kind, FieldKind::Text);
    }

    #[test]
    fn test_class_agnostic() {
        let fields = vec![
            field(FieldKind::Checkbox, 0.1, 0.1, 0.1, 0.1, 0.4),
            field(FieldKind::Text, 0.1, 0.1, 0.1, 0.1, 0.8),
        ];
        let kept = non_max_suppression(fields, 0.1, 0.7);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].kind, FieldKind::Text);
    }

    #[test]
    fn test_empty_input() {
        assert!(non_max_suppression(Vec::new(), 0.1, 0.7).is_empty());
    }

    #[test]
    fn test_boost_once_and_text_only() {
        let mut fields = vec![
            field(FieldKind::Text, 0.1, 0.1, 0.2, 0.05, 0.1),
            field(FieldKind::Checkbox, 0.5, 0.5, 0.05, 0.05, 0.1),
            field(FieldKind::Text, 0.7, 0.7, 0.2, 0.05, 0.1),
        ];
        let candidates = vec![
            Rect::new(0.1, 0.1, 0.2, 0.05),
            Rect::new(0.1, 0.1, 0.19, 0.05),
            Rect::new(0.5, 0.5, 0.05, 0.05),
        ];
        boost_confidence(&mut fields, &candidates, BOOST_IOU_THRESHOLD, BOOST_BONUS);

        assert!((fields[0].confidence - 1.1).abs() < 1e-6);
        assert!((fields[1].confidence - 0.1).abs() < 1e-6);
        assert!((fields[2].confidence - 0.1).abs() < 1e-6);
    }
}
