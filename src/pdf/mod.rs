//! PDF processing layer
//!
//! Text extraction goes through the [`PdfBackend`] trait. The production
//! backend uses PDFium, with qpdf as an encryption check.

mod backend;
mod qpdf;
mod reader;

#[cfg(any(test, feature = "testing"))]
pub use backend::testing;
pub use backend::{PdfBackend, PdfText};
pub use qpdf::{page_count, requires_password};
pub use reader::PdfiumBackend;
