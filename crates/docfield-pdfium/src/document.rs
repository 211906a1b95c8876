//! Document handle and its page cache

use crate::error::{PdfError, Result};
use crate::lines::LineNode;
use crate::native::{Binding, NativeDocument, NativePage, Source};
use crate::page::Page;
use crate::pdfium::PdfiumBinding;
use crate::render::Bitmap;
use crate::text::TextNode;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

/// An open document.
///
/// The document owns its native handle and every page loaded through it.
/// Closing it (explicitly or by dropping it) closes all still-open pages
/// first, then the document, each exactly once. After that every operation
/// on the document or on any of its [`Page`] handles fails with
/// [`PdfError::ClosedResource`].
///
/// A `Document` is single-owner and not `Send`; open one per worker thread.
///
/// # Example
///
/// ```no_run
/// use docfield_pdfium::{Document, RenderRequest};
///
/// let bytes = std::fs::read("form.pdf")?;
/// let document = Document::open(&bytes, None)?;
///
/// for index in 0..document.page_count()? {
///     let page = document.page(index)?;
///     let bitmap = page.render_to_bitmap(RenderRequest::width(1056))?;
///     println!("page {index}: {}x{} px, {} chars",
///         bitmap.width(), bitmap.height(), page.text_nodes()?.len());
///     page.close();
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Document {
    native: RefCell<Option<Box<dyn NativeDocument>>>,
    pages: RefCell<BTreeMap<usize, PageSlot>>,
    page_count: usize,
    next_generation: Cell<u64>,
}

/// Cached state of one loaded page
pub(crate) struct PageSlot {
    pub(crate) native: Option<Box<dyn NativePage>>,
    pub(crate) generation: u64,
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) bitmap: Option<((u32, u32), Rc<Bitmap>)>,
    pub(crate) text_nodes: Option<Rc<[TextNode]>>,
    pub(crate) line_nodes: Option<Rc<[LineNode]>>,
}

impl PageSlot {
    fn release(&mut self) -> bool {
        self.bitmap = None;
        self.text_nodes = None;
        self.line_nodes = None;
        self.native.take().is_some()
    }
}

impl Document {
    /// Open a PDF from memory with the process-wide PDFium binding.
    pub fn open(bytes: &[u8], password: Option<&str>) -> Result<Self> {
        let binding = PdfiumBinding::global()?;
        Self::open_with(&binding, Source::Bytes(bytes.to_vec()), password)
    }

    /// Open a PDF file with the process-wide PDFium binding.
    pub fn open_file<P: AsRef<Path>>(path: P, password: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PdfError::File {
                path: path.display().to_string(),
            });
        }
        let binding = PdfiumBinding::global()?;
        Self::open_with(&binding, Source::File(path.to_path_buf()), password)
    }

    /// Open a document through an explicit binding.
    pub fn open_with(binding: &dyn Binding, source: Source, password: Option<&str>) -> Result<Self> {
        let native = binding.open(source, password)?;
        let page_count = native.page_count();

        debug!("Opened document with {} pages", page_count);

        Ok(Self {
            native: RefCell::new(Some(native)),
            pages: RefCell::new(BTreeMap::new()),
            page_count,
            next_generation: Cell::new(0),
        })
    }

    /// Number of pages
    pub fn page_count(&self) -> Result<usize> {
        self.ensure_open()?;
        Ok(self.page_count)
    }

    /// Get a page by 0-based index.
    ///
    /// Pages are cached: asking twice for the same index returns handles to
    /// the same loaded page and its cached views. A page closed earlier is
    /// loaded again.
    pub fn page(&self, index: usize) -> Result<Page<'_>> {
        self.ensure_open()?;
        if index >= self.page_count {
            return Err(PdfError::OutOfRange {
                index,
                count: self.page_count,
            });
        }

        if let Some(slot) = self.pages.borrow().get(&index) {
            if slot.native.is_some() {
                return Ok(Page::new(self, index, slot.generation));
            }
        }

        let native_page = {
            let native = self.native.borrow();
            let document = native.as_ref().ok_or(PdfError::closed("Document"))?;
            document.load_page(index)?
        };
        let (width, height) = native_page.size();
        let generation = self.next_generation.get();
        self.next_generation.set(generation + 1);

        debug!("Loaded page {} ({}x{})", index, width, height);

        self.pages.borrow_mut().insert(
            index,
            PageSlot {
                native: Some(native_page),
                generation,
                width,
                height,
                bitmap: None,
                text_nodes: None,
                line_nodes: None,
            },
        );

        Ok(Page::new(self, index, generation))
    }

    /// Iterate over all pages, loading each on demand
    pub fn pages(&self) -> impl Iterator<Item = Result<Page<'_>>> + '_ {
        (0..self.page_count).map(move |index| self.page(index))
    }

    /// Whether [`close`](Self::close) has run
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.native.borrow().is_none()
    }

    /// Close all open pages, then the document. Calling it again is a no-op.
    pub fn close(&self) {
        let mut closed_pages = 0;
        for slot in self.pages.borrow_mut().values_mut() {
            if slot.release() {
                closed_pages += 1;
            }
        }
        if self.native.borrow_mut().take().is_some() {
            debug!("Closed document and {} open pages", closed_pages);
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(PdfError::closed("Document"))
        } else {
            Ok(())
        }
    }

    /// Run `f` against the live slot of a page handle.
    pub(crate) fn with_slot<R>(
        &self,
        index: usize,
        generation: u64,
        f: impl FnOnce(&mut PageSlot) -> Result<R>,
    ) -> Result<R> {
        self.ensure_open()?;
        let mut pages = self.pages.borrow_mut();
        match pages.get_mut(&index) {
            Some(slot) if slot.generation == generation && slot.native.is_some() => f(slot),
            _ => Err(PdfError::closed("Page")),
        }
    }

    /// Close one page; unknown or already closed pages are ignored.
    pub(crate) fn close_page(&self, index: usize, generation: u64) {
        if let Some(slot) = self.pages.borrow_mut().get_mut(&index) {
            if slot.generation == generation && slot.release() {
                debug!("Closed page {}", index);
            }
        }
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("page_count", &self.page_count)
            .field("closed", &self.is_closed())
            .field("cached_pages", &self.pages.borrow().len())
            .finish()
    }
}
