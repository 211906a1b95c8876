//! # docfield-pdfium
//!
//! Safe, leak-free page access over PDFium for field detection.
//!
//! A [`Document`] owns the native document and caches its pages; a [`Page`]
//! borrows the document and exposes three lazily computed views:
//!
//! - [`Page::render_to_bitmap`]: RGBA raster on a white canvas, form fields drawn
//! - [`Page::text_nodes`]: one [`TextNode`] per character, normalized, in reading order
//! - [`Page::line_nodes`]: thin horizontal/vertical vector segments ([`LineNode`])
//!
//! Native engines plug in through the [`Binding`] trait. [`PdfiumBinding`]
//! binds the PDFium shared library once per process; [`RasterBinding`] treats
//! a standalone image as a one-page document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docfield_pdfium::{Document, RenderRequest};
//!
//! let document = Document::open_file("form.pdf", None)?;
//! let page = document.page(0)?;
//!
//! let bitmap = page.render_to_bitmap(RenderRequest::scale(2.0))?;
//! let text: String = page.text_nodes()?.iter().map(|node| node.content).collect();
//!
//! println!("{}x{}: {}", bitmap.width(), bitmap.height(), text);
//! # Ok::<(), docfield_pdfium::PdfError>(())
//! ```

mod document;
mod error;
pub mod geometry;
mod lines;
mod native;
mod page;
mod pdfium;
mod raster;
mod render;
mod text;

pub use document::Document;
pub use error::{PdfError, Result};
pub use geometry::{sort_reading_order, Bounded, Rect};
pub use lines::{LineNode, Tilt, BORDER_HEIGHT_RATIO, BORDER_WIDTH_RATIO, LINE_MAX_THICKNESS};
pub use native::{Binding, NativeDocument, NativePage, RawChar, RawRect, Source};
pub use page::Page;
pub use pdfium::{PdfiumBinding, LIBRARY_PATH_ENV};
pub use raster::RasterBinding;
pub use render::{Bitmap, RenderRequest, MAX_RASTER_SIZE};
pub use text::{TextNode, ASCENT_RATIO, DEFAULT_FONT_SIZE, LINE_BREAK, TEXT_ROW_TOLERANCE};
