//! Output records handed to callers

use docfield_detect::{DetectedField, FieldKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Where a field sits: one page of one attachment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldArea {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub page: usize,
    pub attachment_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_width: Option<f32>,
}

/// A detected form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputField {
    pub uuid: Uuid,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub required: bool,
    #[serde(default)]
    pub preferences: BTreeMap<String, serde_json::Value>,
    pub areas: Vec<FieldArea>,
}

impl OutputField {
    /// Wrap a detection as a fresh field with a single area
    #[must_use]
    pub fn from_detection(field: &DetectedField, page: usize, attachment_id: Option<&str>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            kind: field.kind,
            required: field.kind == FieldKind::Signature,
            preferences: BTreeMap::new(),
            areas: vec![FieldArea {
                x: field.x,
                y: field.y,
                w: field.w,
                h: field.h,
                page,
                attachment_uuid: attachment_id.map(str::to_owned),
                cell_width: None,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfield_pdfium::Rect;

    #[test]
    fn test_required_only_for_signature() {
        for (kind, required) in [
            (FieldKind::Text, false),
            (FieldKind::Checkbox, false),
            (FieldKind::Date, false),
            (FieldKind::Number, false),
            (FieldKind::Signature, true),
        ] {
            let field = DetectedField::new(kind, Rect::new(0.1, 0.2, 0.3, 0.04), 0.9);
            assert_eq!(OutputField::from_detection(&field, 0, None).required, required);
        }
    }

    #[test]
    fn test_json_shape() {
        let field = DetectedField::new(FieldKind::Date, Rect::new(0.1, 0.2, 0.3, 0.04), 0.9);
        let output = OutputField::from_detection(&field, 2, Some("att-1"));
        let json = serde_json::to_value(&output).unwrap();

        assert_eq!(json["type"], "date");
        assert_eq!(json["required"], false);
        assert_eq!(json["preferences"], serde_json::json!({}));
        assert_eq!(json["areas"][0]["page"], 2);
        assert_eq!(json["areas"][0]["attachment_uuid"], "att-1");
        assert!(json["areas"][0].get("cell_width").is_none());
        assert_eq!(json["uuid"].as_str().unwrap().len(), 36);
    }

    #[test]
    fn test_fresh_uuid_per_field() {
        let field = DetectedField::new(FieldKind::Text, Rect::new(0.1, 0.2, 0.3, 0.04), 0.9);
        let a = OutputField::from_detection(&field, 0, None);
        let b = OutputField::from_detection(&field, 0, None);
        assert_ne!(a.uuid, b.uuid);
    }
}
