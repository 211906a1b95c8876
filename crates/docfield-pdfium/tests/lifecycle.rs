//! Lifecycle tests against a counting mock binding

use docfield_pdfium::{
    Binding, Document, NativeDocument, NativePage, PdfError, RawChar, RawRect, RenderRequest,
    Result, Source,
};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Counters {
    documents_closed: AtomicUsize,
    pages_loaded: AtomicUsize,
    pages_closed: AtomicUsize,
    renders: AtomicUsize,
    char_reads: AtomicUsize,
}

struct MockBinding {
    counters: Arc<Counters>,
    page_count: usize,
    fail_render: bool,
}

impl MockBinding {
    fn new(page_count: usize) -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            page_count,
            fail_render: false,
        }
    }
}

impl Binding for MockBinding {
    fn open(&self, source: Source, password: Option<&str>) -> Result<Box<dyn NativeDocument>> {
        let bytes = source.into_bytes()?;
        if bytes.starts_with(b"LOCKED") && password != Some("secret") {
            return Err(PdfError::Password);
        }
        if bytes.is_empty() {
            return Err(PdfError::Format {
                reason: "empty".to_string(),
            });
        }
        Ok(Box::new(MockDocument {
            counters: Arc::clone(&self.counters),
            page_count: self.page_count,
            fail_render: self.fail_render,
        }))
    }
}

struct MockDocument {
    counters: Arc<Counters>,
    page_count: usize,
    fail_render: bool,
}

impl NativeDocument for MockDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn load_page(&self, _index: usize) -> Result<Box<dyn NativePage>> {
        self.counters.pages_loaded.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockPage {
            counters: Arc::clone(&self.counters),
            fail_render: self.fail_render,
        }))
    }
}

impl Drop for MockDocument {
    fn drop(&mut self) {
        self.counters.documents_closed.fetch_add(1, Ordering::SeqCst);
    }
}

struct MockPage {
    counters: Arc<Counters>,
    fail_render: bool,
}

impl NativePage for MockPage {
    fn size(&self) -> (f32, f32) {
        (612.0, 792.0)
    }

    fn render(&self, width: u32, height: u32) -> Result<Vec<u8>> {
        self.counters.renders.fetch_add(1, Ordering::SeqCst);
        if self.fail_render {
            return Err(PdfError::Unknown {
                context: "out of memory".to_string(),
            });
        }
        Ok(vec![255; width as usize * height as usize * 4])
    }

    fn chars(&self) -> Result<Vec<RawChar>> {
        self.counters.char_reads.fetch_add(1, Ordering::SeqCst);
        Ok(vec![RawChar {
            code: 'A' as u32,
            left: 72.0,
            bottom: 700.0,
            right: 80.0,
            top: 712.0,
            origin_x: 72.0,
            origin_y: 700.0,
            font_size: 12.0,
        }])
    }

    fn path_bounds(&self) -> Result<Vec<RawRect>> {
        Ok(vec![RawRect {
            left: 72.0,
            bottom: 600.0,
            right: 300.0,
            top: 600.5,
        }])
    }
}

impl Drop for MockPage {
    fn drop(&mut self) {
        self.counters.pages_closed.fetch_add(1, Ordering::SeqCst);
    }
}

fn open(binding: &MockBinding) -> Document {
    Document::open_with(binding, Source::Bytes(b"%PDF-mock".to_vec()), None).unwrap()
}

#[test]
fn test_closing_document_closes_all_open_pages() {
    let binding = MockBinding::new(5);
    let document = open(&binding);

    let pages: Vec<_> = (0..5).map(|i| document.page(i).unwrap()).collect();
    assert_eq!(binding.counters.pages_loaded.load(Ordering::SeqCst), 5);

    document.close();

    assert_eq!(binding.counters.pages_closed.load(Ordering::SeqCst), 5);
    assert_eq!(binding.counters.documents_closed.load(Ordering::SeqCst), 1);
    assert!(pages.iter().all(|page| page.is_closed()));
}

#[test]
fn test_page_operations_after_document_close_fail() {
    let binding = MockBinding::new(1);
    let document = open(&binding);
    let page = document.page(0).unwrap();

    document.close();

    assert!(matches!(page.width(), Err(PdfError::ClosedResource { .. })));
    assert!(matches!(
        page.render_to_bitmap(RenderRequest::natural()),
        Err(PdfError::ClosedResource { .. })
    ));
    assert!(matches!(page.text_nodes(), Err(PdfError::ClosedResource { .. })));
    assert!(matches!(page.line_nodes(), Err(PdfError::ClosedResource { .. })));
    assert!(matches!(document.page(0), Err(PdfError::ClosedResource { .. })));
    assert!(matches!(document.page_count(), Err(PdfError::ClosedResource { .. })));
}

#[test]
fn test_close_is_idempotent_and_drop_does_not_double_close() {
    let binding = MockBinding::new(2);
    {
        let document = open(&binding);
        let _ = document.page(0).unwrap();
        document.close();
        document.close();
    }
    assert_eq!(binding.counters.documents_closed.load(Ordering::SeqCst), 1);
    assert_eq!(binding.counters.pages_closed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_drop_closes_document_and_pages() {
    let binding = MockBinding::new(3);
    {
        let document = open(&binding);
        let _ = document.page(0).unwrap();
        let _ = document.page(2).unwrap();
    }
    assert_eq!(binding.counters.pages_closed.load(Ordering::SeqCst), 2);
    assert_eq!(binding.counters.documents_closed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_page_cache_returns_same_view() {
    let binding = MockBinding::new(1);
    let document = open(&binding);

    let first = document.page(0).unwrap().text_nodes().unwrap();
    let second = document.page(0).unwrap().text_nodes().unwrap();

    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(binding.counters.pages_loaded.load(Ordering::SeqCst), 1);
    assert_eq!(binding.counters.char_reads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_closed_page_handle_stays_closed_after_reload() {
    let binding = MockBinding::new(1);
    let document = open(&binding);

    let old = document.page(0).unwrap();
    old.close();
    assert!(matches!(old.height(), Err(PdfError::ClosedResource { .. })));
    assert_eq!(binding.counters.pages_closed.load(Ordering::SeqCst), 1);

    let fresh = document.page(0).unwrap();
    assert_eq!(fresh.height().unwrap(), 792.0);
    assert!(old.is_closed());
    assert_eq!(binding.counters.pages_loaded.load(Ordering::SeqCst), 2);
}

#[test]
fn test_out_of_range() {
    let binding = MockBinding::new(2);
    let document = open(&binding);
    assert!(matches!(
        document.page(2),
        Err(PdfError::OutOfRange { index: 2, count: 2 })
    ));
}

#[test]
fn test_bitmap_cached_per_size() {
    let binding = MockBinding::new(1);
    let document = open(&binding);
    let page = document.page(0).unwrap();

    let a = page.render_to_bitmap(RenderRequest::width(100)).unwrap();
    let b = page.render_to_bitmap(RenderRequest::width(100)).unwrap();
    assert!(Rc::ptr_eq(&a, &b));
    assert_eq!(binding.counters.renders.load(Ordering::SeqCst), 1);

    let c = page.render_to_bitmap(RenderRequest::width(200)).unwrap();
    assert_eq!(c.width(), 200);
    assert_eq!(binding.counters.renders.load(Ordering::SeqCst), 2);
}

#[test]
fn test_render_failure_reports_page_and_size() {
    let mut binding = MockBinding::new(2);
    binding.fail_render = true;
    let document = open(&binding);

    let err = document
        .page(1)
        .unwrap()
        .render_to_bitmap(RenderRequest::size(30, 40))
        .unwrap_err();

    match err {
        PdfError::Unknown { context } => {
            assert!(context.contains("page 1"), "{context}");
            assert!(context.contains("30x40"), "{context}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_password_and_format_errors_surface() {
    let binding = MockBinding::new(1);

    let locked = Document::open_with(&binding, Source::Bytes(b"LOCKED".to_vec()), None);
    assert!(matches!(locked, Err(PdfError::Password)));

    let unlocked = Document::open_with(&binding, Source::Bytes(b"LOCKED".to_vec()), Some("secret"));
    assert!(unlocked.is_ok());

    let empty = Document::open_with(&binding, Source::Bytes(Vec::new()), None);
    assert!(matches!(empty, Err(PdfError::Format { .. })));
}

#[test]
fn test_missing_file_is_file_error() {
    let dir = tempfile::tempdir().unwrap();
    let binding = MockBinding::new(1);
    let result = Document::open_with(&binding, Source::File(dir.path().join("missing.pdf")), None);
    assert!(matches!(result, Err(PdfError::File { .. })));
}

#[cfg(unix)]
#[test]
fn test_unreadable_source_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let binding = MockBinding::new(1);
    // the path exists but cannot be read as a file
    let result = Document::open_with(&binding, Source::File(dir.path().to_path_buf()), None);
    assert!(matches!(result, Err(PdfError::Io(_))));
}

#[test]
fn test_views_are_normalized() {
    let binding = MockBinding::new(1);
    let document = open(&binding);
    let page = document.page(0).unwrap();

    let nodes = page.text_nodes().unwrap();
    assert_eq!(nodes.len(), 1);
    assert!((nodes[0].x - 72.0 / 612.0).abs() < 1e-6);

    let lines = page.line_nodes().unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].is_horizontal());
    assert!(lines[0].x + lines[0].w <= 1.0);
}

#[test]
fn test_pages_iterator_visits_every_page() {
    let binding = MockBinding::new(3);
    let document = open(&binding);
    let indices: Vec<usize> = document.pages().map(|page| page.unwrap().index()).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}
