//! PDFium backend
//!
//! The shared library is bound once per process and kept in a static. PDFium
//! is not re-entrant, so every native call made from this module (including
//! the ones run by destructors) holds [`NATIVE_LOCK`].

use crate::error::{PdfError, Result};
use crate::native::{Binding, NativeDocument, NativePage, RawChar, RawRect, Source};
use once_cell::sync::OnceCell;
use pdfium_render::prelude::*;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Environment variable naming a directory that contains the PDFium library
pub const LIBRARY_PATH_ENV: &str = "PDFIUM_DYNAMIC_LIB_PATH";

static PDFIUM: OnceCell<Pdfium> = OnceCell::new();

static NATIVE_LOCK: Mutex<()> = Mutex::new(());

fn native_lock() -> MutexGuard<'static, ()> {
    NATIVE_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Binding to the process-wide PDFium instance.
///
/// Cheap to copy; every copy refers to the same library context.
///
/// # Example
///
/// ```no_run
/// use docfield_pdfium::{Document, PdfiumBinding, Source};
///
/// let binding = PdfiumBinding::init(Some("/opt/pdfium/lib".as_ref()))?;
/// let document = Document::open_with(&binding, Source::File("form.pdf".into()), None)?;
/// # Ok::<(), docfield_pdfium::PdfError>(())
/// ```
#[derive(Clone, Copy)]
pub struct PdfiumBinding {
    pdfium: &'static Pdfium,
}

impl PdfiumBinding {
    /// The process-wide binding, initializing it from the default search
    /// locations on first use.
    pub fn global() -> Result<Self> {
        Self::init(None)
    }

    /// Initialize the process-wide binding.
    ///
    /// The library is looked up in `library_dir`, then in the directory named
    /// by [`LIBRARY_PATH_ENV`], then the working directory, then the system
    /// library path. Only the first successful call binds; later calls return
    /// the existing instance whatever directory they name.
    pub fn init(library_dir: Option<&Path>) -> Result<Self> {
        let pdfium = PDFIUM.get_or_try_init(|| {
            let _guard = native_lock();
            bind_library(library_dir).map(Pdfium::new)
        })?;
        Ok(Self { pdfium })
    }

    /// Whether the library has been bound in this process
    #[must_use]
    pub fn is_initialized() -> bool {
        PDFIUM.get().is_some()
    }
}

fn bind_library(library_dir: Option<&Path>) -> Result<Box<dyn PdfiumLibraryBindings>> {
    let mut candidates: Vec<String> = Vec::new();
    if let Some(dir) = library_dir {
        candidates.push(dir.to_string_lossy().into_owned());
    }
    if let Ok(dir) = std::env::var(LIBRARY_PATH_ENV) {
        candidates.push(dir);
    }
    candidates.push("./".to_string());

    for dir in &candidates {
        match Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir.as_str())) {
            Ok(bindings) => {
                info!("Bound PDFium library from {}", dir);
                return Ok(bindings);
            }
            Err(e) => debug!("PDFium not found in {}: {}", dir, e),
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|e| PdfError::LibraryUnavailable {
        reason: format!("searched {candidates:?} and the system library path: {e}"),
    })?;
    info!("Bound system PDFium library");
    Ok(bindings)
}

/// Translate a PDFium failure into the binding's error taxonomy
fn map_error(error: PdfiumError, context: &str) -> PdfError {
    match error {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            PdfError::Password
        }
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::FormatError) => {
            PdfError::Format {
                reason: context.to_string(),
            }
        }
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::FileError) => {
            PdfError::File {
                path: context.to_string(),
            }
        }
        other => PdfError::Unknown {
            context: format!("{context}: {other}"),
        },
    }
}

impl Binding for PdfiumBinding {
    fn open(&self, source: Source, password: Option<&str>) -> Result<Box<dyn NativeDocument>> {
        let description = match &source {
            Source::Bytes(bytes) => format!("{} byte document", bytes.len()),
            Source::File(path) => path.display().to_string(),
        };
        let bytes = source.into_bytes()?;

        let _guard = native_lock();
        let document = self
            .pdfium
            .load_pdf_from_byte_vec(bytes, password)
            .map_err(|e| map_error(e, &description))?;
        let page_count = document.pages().len() as usize;

        Ok(Box::new(PdfiumDocument {
            inner: Some(document),
            page_count,
        }))
    }
}

struct PdfiumDocument {
    inner: Option<PdfDocument<'static>>,
    page_count: usize,
}

impl NativeDocument for PdfiumDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn load_page(&self, index: usize) -> Result<Box<dyn NativePage>> {
        let _guard = native_lock();
        let document = self.inner.as_ref().ok_or(PdfError::closed("Document"))?;
        let page = document
            .pages()
            .get(index as u16)
            .map_err(|e| map_error(e, &format!("loading page {index}")))?;
        let size = (page.width().value, page.height().value);

        Ok(Box::new(PdfiumPage {
            inner: Some(page),
            size,
        }))
    }
}

impl Drop for PdfiumDocument {
    fn drop(&mut self) {
        let _guard = native_lock();
        drop(self.inner.take());
    }
}

struct PdfiumPage {
    inner: Option<PdfPage<'static>>,
    size: (f32, f32),
}

impl PdfiumPage {
    fn page(&self) -> Result<&PdfPage<'static>> {
        self.inner.as_ref().ok_or(PdfError::closed("Page"))
    }
}

impl NativePage for PdfiumPage {
    fn size(&self) -> (f32, f32) {
        self.size
    }

    fn render(&self, width: u32, height: u32) -> Result<Vec<u8>> {
        let _guard = native_lock();
        let config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_target_height(height as i32)
            .set_clear_color(PdfColor::WHITE)
            .render_form_data(true)
            .render_annotations(true);

        let bitmap = self
            .page()?
            .render_with_config(&config)
            .map_err(|e| PdfError::Unknown {
                context: e.to_string(),
            })?;

        Ok(bitmap.as_rgba_bytes())
    }

    fn chars(&self) -> Result<Vec<RawChar>> {
        let _guard = native_lock();
        let text = self
            .page()?
            .text()
            .map_err(|e| map_error(e, "loading page text"))?;

        let mut chars = Vec::new();
        for ch in text.chars().iter() {
            let (left, bottom, right, top) = match ch.loose_bounds() {
                Ok(bounds) => (
                    bounds.left().value,
                    bounds.bottom().value,
                    bounds.right().value,
                    bounds.top().value,
                ),
                Err(_) => (0.0, 0.0, 0.0, 0.0),
            };
            chars.push(RawChar {
                code: ch.unicode_value(),
                left,
                bottom,
                right,
                top,
                origin_x: ch.origin_x().map(|p| p.value).unwrap_or(0.0),
                origin_y: ch.origin_y().map(|p| p.value).unwrap_or(0.0),
                font_size: ch.unscaled_font_size().value,
            });
        }

        Ok(chars)
    }

    fn path_bounds(&self) -> Result<Vec<RawRect>> {
        let _guard = native_lock();
        let mut paths = Vec::new();

        for object in self.page()?.objects().iter() {
            if object.object_type() != PdfPageObjectType::Path {
                continue;
            }
            match object.bounds() {
                Ok(bounds) => paths.push(RawRect {
                    left: bounds.left().value,
                    bottom: bounds.bottom().value,
                    right: bounds.right().value,
                    top: bounds.top().value,
                }),
                Err(e) => debug!("Skipping path object without bounds: {}", e),
            }
        }

        Ok(paths)
    }
}

impl Drop for PdfiumPage {
    fn drop(&mut self) {
        let _guard = native_lock();
        drop(self.inner.take());
    }
}
