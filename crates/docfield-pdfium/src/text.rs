//! Character-level text geometry
//!
//! Characters come out of the engine one UTF-16 code unit at a time with a
//! loose bounding box, a baseline origin and a font size. [`TextNode`]s are
//! built from them with a synthetic line box (font size high, sitting 0.8 of
//! a font size above the baseline) so that every glyph on one baseline shares
//! the same top and bottom edge regardless of ascenders or descenders.

use crate::geometry::{sort_reading_order, Bounded, Rect};
use crate::native::RawChar;

/// Font size substituted when the engine reports the degenerate size 1
pub const DEFAULT_FONT_SIZE: f32 = 10.0;

/// Fraction of the font size the synthetic box extends above the baseline
pub const ASCENT_RATIO: f32 = 0.8;

/// Row tolerance for sorting text nodes, in page units
pub const TEXT_ROW_TOLERANCE: f32 = 5.0;

/// Content of a line-break marker node
pub const LINE_BREAK: char = '\n';

/// A single character with its normalized box
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    /// The character, or [`LINE_BREAK`]
    pub content: char,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl TextNode {
    #[must_use]
    pub fn new(content: char, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { content, x, y, w, h }
    }

    #[must_use]
    #[inline]
    pub fn endx(&self) -> f32 {
        self.x + self.w
    }

    #[must_use]
    #[inline]
    pub fn endy(&self) -> f32 {
        self.y + self.h
    }

    #[must_use]
    pub fn is_line_break(&self) -> bool {
        self.content == LINE_BREAK
    }
}

impl Bounded for TextNode {
    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

/// Build reading-ordered text nodes from raw engine characters.
pub(crate) fn build_text_nodes(chars: &[RawChar], page_width: f32, page_height: f32) -> Vec<TextNode> {
    if chars.is_empty() || page_width <= 0.0 || page_height <= 0.0 {
        return Vec::new();
    }

    let mut nodes: Vec<TextNode> = Vec::with_capacity(chars.len());
    let mut index = 0;

    while index < chars.len() {
        let raw = &chars[index];
        let (content, consumed) = decode_at(chars, index);
        index += consumed;

        let node = match nodes.last() {
            Some(previous) if is_degenerate(raw) => {
                // generated characters (line breaks, synthetic spaces) have no
                // geometry of their own; they follow the previous glyph
                TextNode::new(content, previous.endx(), previous.y, 0.0, previous.h)
            }
            _ => {
                let font_size = effective_font_size(raw.font_size);
                let top = page_height - raw.origin_y - ASCENT_RATIO * font_size;
                TextNode::new(
                    content,
                    raw.left / page_width,
                    top / page_height,
                    (raw.right - raw.left).max(0.0) / page_width,
                    font_size / page_height,
                )
            }
        };
        nodes.push(node);
    }

    sort_reading_order(&mut nodes, TEXT_ROW_TOLERANCE / page_height);
    nodes
}

/// Decode the character starting at `index`, returning it and the number of
/// code units consumed.
fn decode_at(chars: &[RawChar], index: usize) -> (char, usize) {
    let code = chars[index].code;

    match code {
        0xD800..=0xDBFF => match chars.get(index + 1).map(|next| next.code) {
            Some(low @ 0xDC00..=0xDFFF) => {
                let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                (char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER), 2)
            }
            _ => (char::REPLACEMENT_CHARACTER, 1),
        },
        0xDC00..=0xDFFF => (char::REPLACEMENT_CHARACTER, 1),
        0x0D | 0x0A => (LINE_BREAK, 1),
        _ => (char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER), 1),
    }
}

fn effective_font_size(reported: f32) -> f32 {
    if !reported.is_finite() || reported <= 0.0 || (reported - 1.0).abs() < f32::EPSILON {
        DEFAULT_FONT_SIZE
    } else {
        reported
    }
}

fn is_degenerate(raw: &RawChar) -> bool {
    raw.right <= raw.left && raw.top <= raw.bottom && raw.origin_x == 0.0 && raw.origin_y == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(code: u32, left: f32, baseline: f32, width: f32, font_size: f32) -> RawChar {
        RawChar {
            code,
            left,
            bottom: baseline - 2.0,
            right: left + width,
            top: baseline + font_size * 0.7,
            origin_x: left,
            origin_y: baseline,
            font_size,
        }
    }

    #[test]
    fn test_empty_page_has_no_nodes() {
        assert!(build_text_nodes(&[], 100.0, 100.0).is_empty());
    }

    #[test]
    fn test_synthetic_box_from_origin_and_font_size() {
        let nodes = build_text_nodes(&[raw('A' as u32, 10.0, 50.0, 5.0, 10.0)], 100.0, 100.0);
        assert_eq!(nodes.len(), 1);
        let node = &nodes[0];
        assert_eq!(node.content, 'A');
        assert!((node.x - 0.10).abs() < 1e-6);
        assert!((node.w - 0.05).abs() < 1e-6);
        // top = 100 - 50 - 8 = 42
        assert!((node.y - 0.42).abs() < 1e-6);
        assert!((node.h - 0.10).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_font_size_falls_back() {
        let nodes = build_text_nodes(&[raw('x' as u32, 0.0, 50.0, 5.0, 1.0)], 200.0, 200.0);
        assert!((nodes[0].h - DEFAULT_FONT_SIZE / 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_surrogate_pair_decoded() {
        // U+1F600 = D83D DE00
        let chars = [raw(0xD83D, 0.0, 50.0, 5.0, 10.0), raw(0xDE00, 0.0, 50.0, 5.0, 10.0)];
        let nodes = build_text_nodes(&chars, 100.0, 100.0);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].content, '\u{1F600}');
    }

    #[test]
    fn test_lone_surrogate_replaced() {
        let chars = [raw(0xD83D, 0.0, 50.0, 5.0, 10.0), raw('a' as u32, 6.0, 50.0, 5.0, 10.0)];
        let nodes = build_text_nodes(&chars, 100.0, 100.0);
        assert_eq!(nodes[0].content, char::REPLACEMENT_CHARACTER);
        assert_eq!(nodes[1].content, 'a');
    }

    #[test]
    fn test_carriage_return_becomes_line_break() {
        let mut cr = raw(0x0D, 0.0, 0.0, 0.0, 10.0);
        cr.left = 0.0;
        cr.right = 0.0;
        cr.top = 0.0;
        cr.bottom = 0.0;
        cr.origin_x = 0.0;
        cr.origin_y = 0.0;
        let chars = [raw('a' as u32, 10.0, 50.0, 5.0, 10.0), cr];
        let nodes = build_text_nodes(&chars, 100.0, 100.0);
        assert_eq!(nodes.len(), 2);
        assert!(nodes[1].is_line_break());
        // placed right after the previous glyph
        assert!((nodes[1].x - 0.15).abs() < 1e-6);
        assert!((nodes[1].y - nodes[0].y).abs() < 1e-6);
    }

    #[test]
    fn test_sorted_in_reading_order() {
        let chars = [
            raw('b' as u32, 10.0, 20.0, 5.0, 10.0), // lower line
            raw('a' as u32, 30.0, 80.0, 5.0, 10.0), // upper line, right
            raw('c' as u32, 10.0, 80.0, 5.0, 10.0), // upper line, left
        ];
        let nodes = build_text_nodes(&chars, 100.0, 100.0);
        let text: String = nodes.iter().map(|n| n.content).collect();
        assert_eq!(text, "cab");
    }
}
