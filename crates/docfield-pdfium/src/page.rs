//! Page handle with lazily computed, cached views

use crate::document::Document;
use crate::error::{PdfError, Result};
use crate::lines::{build_line_nodes, LineNode};
use crate::render::{Bitmap, RenderRequest};
use crate::text::{build_text_nodes, TextNode};
use std::rc::Rc;
use tracing::debug;

/// A page borrowed from a [`Document`].
///
/// The handle cannot outlive its document. The native page and the cached
/// bitmap, text and line views live in the document's page cache, so cloning
/// the handle or asking the document for the same index again shares them.
///
/// # Example
///
/// ```no_run
/// use docfield_pdfium::{Document, RenderRequest};
///
/// let document = Document::open_file("form.pdf", None)?;
/// let page = document.page(0)?;
///
/// for line in page.line_nodes()?.iter().filter(|line| line.is_horizontal()) {
///     println!("underline at ({:.3}, {:.3}) width {:.3}", line.x, line.y, line.w);
/// }
/// # Ok::<(), docfield_pdfium::PdfError>(())
/// ```
#[derive(Clone)]
pub struct Page<'doc> {
    document: &'doc Document,
    index: usize,
    generation: u64,
}

impl<'doc> Page<'doc> {
    pub(crate) fn new(document: &'doc Document, index: usize, generation: u64) -> Self {
        Self {
            document,
            index,
            generation,
        }
    }

    /// 0-based page index
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Width in page-space units
    pub fn width(&self) -> Result<f32> {
        self.document
            .with_slot(self.index, self.generation, |slot| Ok(slot.width))
    }

    /// Height in page-space units
    pub fn height(&self) -> Result<f32> {
        self.document
            .with_slot(self.index, self.generation, |slot| Ok(slot.height))
    }

    /// Render the page onto a white canvas.
    ///
    /// The result is cached for the resolved pixel size; asking again for the
    /// same size returns the same bitmap without re-rendering. Render failures
    /// (including native allocation failures) surface as
    /// [`PdfError::Unknown`] naming the page and the requested size.
    pub fn render_to_bitmap(&self, request: RenderRequest) -> Result<Rc<Bitmap>> {
        let index = self.index;
        self.document.with_slot(index, self.generation, |slot| {
            let size = request.target_size(slot.width, slot.height);
            if let Some((cached_size, bitmap)) = &slot.bitmap {
                if *cached_size == size {
                    return Ok(Rc::clone(bitmap));
                }
            }

            let native = slot.native.as_ref().ok_or(PdfError::closed("Page"))?;
            let (width, height) = size;
            let pixels = native.render(width, height).map_err(|e| match e {
                PdfError::Unknown { context } => PdfError::Unknown {
                    context: format!("rendering page {index} at {width}x{height}: {context}"),
                },
                other => other,
            })?;
            let bitmap = Rc::new(Bitmap::from_rgba(pixels, width, height)?);

            debug!("Rendered page {} at {}x{}", index, width, height);

            slot.bitmap = Some((size, Rc::clone(&bitmap)));
            Ok(bitmap)
        })
    }

    /// Characters in reading order with normalized boxes.
    ///
    /// A page without text yields an empty list.
    pub fn text_nodes(&self) -> Result<Rc<[TextNode]>> {
        self.document.with_slot(self.index, self.generation, |slot| {
            if let Some(nodes) = &slot.text_nodes {
                return Ok(Rc::clone(nodes));
            }

            let native = slot.native.as_ref().ok_or(PdfError::closed("Page"))?;
            let chars = native.chars()?;
            let nodes: Rc<[TextNode]> = build_text_nodes(&chars, slot.width, slot.height).into();

            slot.text_nodes = Some(Rc::clone(&nodes));
            Ok(nodes)
        })
    }

    /// Thin horizontal and vertical vector segments, normalized.
    pub fn line_nodes(&self) -> Result<Rc<[LineNode]>> {
        self.document.with_slot(self.index, self.generation, |slot| {
            if let Some(lines) = &slot.line_nodes {
                return Ok(Rc::clone(lines));
            }

            let native = slot.native.as_ref().ok_or(PdfError::closed("Page"))?;
            let paths = native.path_bounds()?;
            let lines: Rc<[LineNode]> = build_line_nodes(&paths, slot.width, slot.height).into();

            slot.line_nodes = Some(Rc::clone(&lines));
            Ok(lines)
        })
    }

    /// Whether this handle can no longer be used
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.document
            .with_slot(self.index, self.generation, |_| Ok(()))
            .is_err()
    }

    /// Release the native page and drop the cached views.
    ///
    /// Every later call through this handle (or its clones) fails with
    /// [`PdfError::ClosedResource`].
    pub fn close(&self) {
        self.document.close_page(self.index, self.generation);
    }
}

impl std::fmt::Debug for Page<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("index", &self.index)
            .field("closed", &self.is_closed())
            .finish()
    }
}
