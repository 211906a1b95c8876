//! Layout fusion: text geometry, ruling lines and detections in one pass

pub mod candidates;
pub mod chain;
pub mod retype;

pub use candidates::{glyph_runs, ruling_candidates, underline_candidates, RulingSettings};
pub use chain::{Chain, ChainSettings, NodeElem, PageNode, CHECKBOX_GLYPHS};
pub use retype::{kind_for_label, label_segment};

use docfield_detect::DetectedField;
use docfield_pdfium::TextNode;

/// Fields of one page after fusion, with the chain they were placed in
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub fields: Vec<DetectedField>,
    pub chain: Chain,
}

impl PageLayout {
    /// Chain rendered as text with `[[kind]]` placeholders
    #[must_use]
    pub fn text(&self) -> String {
        self.chain.render(&self.fields)
    }
}

/// Place `fields` (in reading order) among the page text and optionally
/// retype them from their labels
#[must_use]
pub fn fuse(
    text_nodes: &[TextNode],
    mut fields: Vec<DetectedField>,
    page: usize,
    attachment_id: Option<&str>,
    settings: ChainSettings,
    retype_fields: bool,
) -> PageLayout {
    let chain = Chain::build(text_nodes, &fields, page, attachment_id, settings);
    if retype_fields {
        chain.retype_fields(&mut fields);
    }
    PageLayout { fields, chain }
}
