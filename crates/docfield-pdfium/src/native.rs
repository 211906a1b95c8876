//! The seam between [`Document`](crate::Document) and a native rendering engine.
//!
//! A [`Binding`] opens documents; every document hands out pages; pages expose
//! raw geometry in the engine's own page space (bottom-left origin, PDF
//! points for PDFium). Everything above this seam (caching, lifecycle
//! bookkeeping, normalization, sorting) is engine-independent, which lets
//! tests drive it with a mock binding.

use crate::error::Result;
use std::path::PathBuf;

/// Where document bytes come from
#[derive(Debug, Clone)]
pub enum Source {
    /// In-memory document bytes
    Bytes(Vec<u8>),
    /// Path to a document on disk
    File(PathBuf),
}

impl Source {
    /// Read the document into memory.
    ///
    /// A missing or forbidden file maps to [`PdfError::File`](crate::PdfError::File),
    /// any other read failure to [`PdfError::Io`](crate::PdfError::Io).
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Source::Bytes(bytes) => Ok(bytes),
            Source::File(path) => std::fs::read(&path).map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => crate::PdfError::File {
                    path: path.display().to_string(),
                },
                _ => crate::PdfError::Io(err),
            }),
        }
    }
}

/// One character as reported by the engine, in page space with a
/// bottom-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawChar {
    /// UTF-16 code unit (surrogate halves arrive as separate chars)
    pub code: u32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
    pub origin_x: f32,
    pub origin_y: f32,
    pub font_size: f32,
}

/// Bounding box of a vector drawing object, bottom-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRect {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

/// Opens native documents.
///
/// Implementations must be shareable between threads; any serialization the
/// engine needs happens inside the implementation.
pub trait Binding: Send + Sync {
    /// Open a document from `source`
    fn open(&self, source: Source, password: Option<&str>) -> Result<Box<dyn NativeDocument>>;
}

/// A loaded native document. Dropping it releases the native handle.
pub trait NativeDocument {
    fn page_count(&self) -> usize;

    /// Load a page. `index` has already been range-checked.
    fn load_page(&self, index: usize) -> Result<Box<dyn NativePage>>;
}

/// A loaded native page. Dropping it releases the native handle.
pub trait NativePage {
    /// Natural size in page-space units
    fn size(&self) -> (f32, f32);

    /// Render to an RGBA8 buffer of exactly `width * height * 4` bytes on an
    /// opaque white canvas, with annotations and form fields drawn.
    fn render(&self, width: u32, height: u32) -> Result<Vec<u8>>;

    /// Every character on the page in content order
    fn chars(&self) -> Result<Vec<RawChar>>;

    /// Bounds of every path-type drawing object
    fn path_bounds(&self) -> Result<Vec<RawRect>>;
}
