//! Field candidates derived from page geometry alone
//!
//! Printed underscore runs, dash runs and free-standing horizontal rulings
//! usually mark a blank to fill in. They never become fields by themselves;
//! they only raise the confidence of detections lying on top of them.

use docfield_pdfium::{Bounded, LineNode, Rect, TextNode};

/// Shortest underscore run treated as a blank
pub const MIN_UNDERSCORES: usize = 2;

/// Shortest dash run treated as a blank
pub const MIN_DASHES: usize = 3;

/// Rulings are grown upward by this many line thicknesses to cover the writing area
pub const WRITING_AREA_THICKNESS: f32 = 4.0;

/// Boxes around runs of `glyph` on one baseline.
///
/// Consecutive nodes join a run while the gap to the run's right edge is at
/// most `max_gap` and their top differs from the run's first node by at most
/// half its height.
#[must_use]
pub fn glyph_runs(text_nodes: &[TextNode], glyph: char, min_count: usize, max_gap: f32) -> Vec<Rect> {
    let mut runs = Vec::new();
    let mut i = 0;

    while i < text_nodes.len() {
        let first = &text_nodes[i];
        if first.content != glyph {
            i += 1;
            continue;
        }

        let mut rect = first.rect();
        let mut count = 1;
        let mut j = i + 1;

        while let Some(next) = text_nodes.get(j) {
            if next.content != glyph
                || next.x - rect.endx() > max_gap
                || (next.y - first.y).abs() > first.h * 0.5
            {
                break;
            }
            rect = rect.union(&next.rect());
            count += 1;
            j += 1;
        }

        if count >= min_count {
            runs.push(rect);
        }
        i = j;
    }

    runs
}

/// Underscore and dash runs, top to bottom
#[must_use]
pub fn underline_candidates(text_nodes: &[TextNode], max_gap: f32) -> Vec<Rect> {
    let mut candidates = glyph_runs(text_nodes, '_', MIN_UNDERSCORES, max_gap);
    candidates.extend(glyph_runs(text_nodes, '-', MIN_DASHES, max_gap));
    candidates.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));
    candidates
}

/// Settings for [`ruling_candidates`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulingSettings {
    /// Horizontal lines wider than this fraction of the page are borders
    pub width_ratio: f32,
    /// Line thickness in normalized page height
    pub thickness: f32,
}

fn meets_vertical(line: &LineNode, vertical: &LineNode, t: f32) -> bool {
    let h_y = line.y + line.h / 2.0;
    let v_x = vertical.x + vertical.w / 2.0;

    let x_overlap = v_x - t <= line.x + line.w + t && v_x + t >= line.x - t;
    let y_overlap = h_y - t <= vertical.y + vertical.h + t && h_y + t >= vertical.y - t;

    x_overlap && y_overlap
}

fn sits_on(node: &TextNode, line: &LineNode) -> bool {
    let overlaps_x = !(node.endx() < line.x || line.x + line.w < node.x);
    let rests_on = node.endy() >= line.y - node.h && node.y <= line.y;
    overlaps_x && rests_on
}

/// Widest contiguous run of text resting on `line`
fn text_span_on(line: &LineNode, text_nodes: &[TextNode]) -> f32 {
    let mut widest = 0.0f32;
    let mut run_start: Option<&TextNode> = None;
    let mut run_end: Option<&TextNode> = None;

    for node in text_nodes.iter().filter(|n| !n.is_line_break()) {
        if sits_on(node, line) {
            if run_start.is_none() {
                run_start = Some(node);
            }
            run_end = Some(node);
        } else {
            if let (Some(first), Some(last)) = (run_start, run_end) {
                widest = widest.max(last.endx() - first.x);
            }
            run_start = None;
            run_end = None;
        }
    }
    if let (Some(first), Some(last)) = (run_start, run_end) {
        widest = widest.max(last.endx() - first.x);
    }

    widest
}

/// Horizontal rulings that look like fill-in lines, grown to cover the
/// writing area above them.
///
/// Dropped: page-wide borders, lines meeting a vertical ruling (table grids),
/// and lines with a run of printed text covering more than half of them.
#[must_use]
pub fn ruling_candidates(lines: &[LineNode], text_nodes: &[TextNode], settings: RulingSettings) -> Vec<Rect> {
    let t = settings.thickness;
    let (vertical, horizontal): (Vec<&LineNode>, Vec<&LineNode>) = lines.iter().partition(|l| l.is_vertical());

    horizontal
        .into_iter()
        .filter(|line| !(line.w > settings.width_ratio && line.h < docfield_pdfium::BORDER_HEIGHT_RATIO))
        .filter(|line| !vertical.iter().any(|v| meets_vertical(line, v, t)))
        .filter(|line| text_span_on(line, text_nodes) <= line.w / 2.0)
        .map(|line| {
            let grow = WRITING_AREA_THICKNESS * t;
            Rect::new(line.x, line.y - grow, line.w, line.h + grow)
        })
        .collect()
}
