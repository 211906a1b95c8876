//! Reading-order chain of text runs and field placeholders
//!
//! The chain interleaves the page's printed text with the detected fields in
//! the order a reader meets them. Nodes live in an arena and link to each
//! other by index.

use super::retype::retype;
use docfield_detect::{DetectedField, FieldKind};
use docfield_pdfium::{Bounded, Rect, TextNode};

/// Glyphs drawn for empty or ticked checkboxes; the detector covers these
pub const CHECKBOX_GLYPHS: &[char] = &['☐', '☑', '☒', '□', '■', '▢', '❑', '❏'];

/// Payload of a chain node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeElem {
    /// Run of printed text
    Text(String),
    /// Index into the field list the chain was built from
    Field(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageNode {
    pub elem: NodeElem,
    pub prev: Option<usize>,
    pub next: Option<usize>,
    pub page: usize,
    pub attachment_id: Option<String>,
}

/// Geometry tolerances for chain construction, in normalized units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainSettings {
    pub y_tolerance: f32,
    pub tab_gap: f32,
}

#[derive(Debug, Clone)]
pub struct Chain {
    nodes: Vec<PageNode>,
    head: Option<usize>,
    tail: Option<usize>,
    page: usize,
    attachment_id: Option<String>,
}

/// Whether `field` comes before `node` in reading order
fn field_precedes(field: &Rect, node: &Rect, tolerance: f32) -> bool {
    let dy = field.endy() - node.endy();
    dy < -tolerance || (dy.abs() <= tolerance && field.x <= node.x)
}

impl Chain {
    fn new(page: usize, attachment_id: Option<&str>) -> Self {
        Self {
            nodes: Vec::new(),
            head: None,
            tail: None,
            page,
            attachment_id: attachment_id.map(str::to_owned),
        }
    }

    /// Build the chain for one page.
    ///
    /// `text_nodes` and `fields` must both be in reading order.
    #[must_use]
    pub fn build(
        text_nodes: &[TextNode],
        fields: &[DetectedField],
        page: usize,
        attachment_id: Option<&str>,
        settings: ChainSettings,
    ) -> Self {
        let mut chain = Self::new(page, attachment_id);
        let mut pending = fields.iter().enumerate().peekable();
        let mut last: Option<Rect> = None;

        for node in text_nodes {
            let node_rect = node.rect();

            while let Some((index, field)) = pending.next_if(|(_, f)| {
                field_precedes(&f.rect(), &node_rect, settings.y_tolerance)
            }) {
                chain.push_field(index, field.rect(), last, settings);
                last = Some(field.rect());
            }

            if node.is_line_break() {
                chain.push_line_break();
                continue;
            }
            if CHECKBOX_GLYPHS.contains(&node.content) {
                continue;
            }
            if let Some(prev) = last {
                if (node_rect.endy() - prev.endy()).abs() > settings.y_tolerance {
                    chain.push_line_break();
                }
            }
            chain.push_char(node.content);
            last = Some(node_rect);
        }

        for (index, field) in pending {
            chain.push_field(index, field.rect(), last, settings);
            last = Some(field.rect());
        }

        chain
    }

    fn append(&mut self, elem: NodeElem) -> usize {
        let index = self.nodes.len();
        self.nodes.push(PageNode {
            elem,
            prev: self.tail,
            next: None,
            page: self.page,
            attachment_id: self.attachment_id.clone(),
        });
        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        index
    }

    fn tail_text(&mut self) -> Option<&mut String> {
        let tail = self.tail?;
        match &mut self.nodes[tail].elem {
            NodeElem::Text(run) => Some(run),
            NodeElem::Field(_) => None,
        }
    }

    fn push_str(&mut self, text: &str) {
        match self.tail_text() {
            Some(run) => run.push_str(text),
            None => {
                self.append(NodeElem::Text(text.to_string()));
            }
        }
    }

    fn push_char(&mut self, c: char) {
        match self.tail_text() {
            Some(run) => run.push(c),
            None => {
                self.append(NodeElem::Text(c.to_string()));
            }
        }
    }

    /// Line breaks never start a chain and never repeat
    fn push_line_break(&mut self) {
        if self.tail.is_none() {
            return;
        }
        if let Some(run) = self.tail_text() {
            if run.ends_with('\n') {
                return;
            }
        }
        self.push_str("\n");
    }

    fn push_field(&mut self, index: usize, rect: Rect, last: Option<Rect>, settings: ChainSettings) {
        if let Some(prev) = last {
            if (rect.endy() - prev.endy()).abs() > settings.y_tolerance {
                self.push_line_break();
            } else if rect.x - prev.endx() > settings.tab_gap {
                self.push_str("\t");
            } else {
                self.push_str(" ");
            }
        }
        self.append(NodeElem::Field(index));
    }

    /// Nodes from head to tail
    pub fn iter(&self) -> impl Iterator<Item = &PageNode> + '_ {
        std::iter::successors(self.head.map(|i| &self.nodes[i]), |node| node.next.map(|i| &self.nodes[i]))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Text run directly before each field, keyed by field index
    fn preceding_runs(&self) -> impl Iterator<Item = (usize, Option<&str>)> + '_ {
        self.iter().filter_map(move |node| match node.elem {
            NodeElem::Field(index) => {
                let preceding = node.prev.and_then(|p| match &self.nodes[p].elem {
                    NodeElem::Text(run) => Some(run.as_str()),
                    NodeElem::Field(_) => None,
                });
                Some((index, preceding))
            }
            NodeElem::Text(_) => None,
        })
    }

    /// Retype text fields from the label text right before them.
    ///
    /// Only `Text` fields directly preceded by a text run change; every other
    /// field keeps its kind.
    pub fn retype_fields(&self, fields: &mut [DetectedField]) {
        for (index, preceding) in self.preceding_runs() {
            let Some(text) = preceding else {
                continue;
            };
            if let Some(field) = fields.get_mut(index) {
                if field.kind == FieldKind::Text {
                    field.kind = retype(text);
                }
            }
        }
    }

    /// Plain-text rendering with `[[kind]]` in place of each field
    #[must_use]
    pub fn render(&self, fields: &[DetectedField]) -> String {
        let mut out = String::new();
        for node in self.iter() {
            match &node.elem {
                NodeElem::Text(run) => out.push_str(run),
                NodeElem::Field(index) => {
                    let kind = fields.get(*index).map_or("field", |f| f.kind.as_str());
                    out.push_str("[[");
                    out.push_str(kind);
                    out.push_str("]]");
                }
            }
        }
        out
    }
}
