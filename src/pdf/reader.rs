//! PDFium-backed text extraction

use super::backend::{PdfBackend, PdfText};
use super::qpdf::requires_password;
use crate::error::{Error, Result};
use pdfium_render::prelude::*;

/// Get PDFium instance (creates new instance each time - PDFium is not thread-safe)
fn create_pdfium() -> Result<Pdfium> {
    // Try to bind to system library or use static linking
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "/opt/pdfium/lib",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| Error::Pdfium {
            reason: format!("Failed to initialize PDFium: {}", e),
        })?;

    Ok(Pdfium::new(bindings))
}

/// Reads page text with PDFium after checking for encryption with qpdf
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumBackend;

impl PdfiumBackend {
    pub fn new() -> Self {
        Self
    }

    /// Whether the PDFium shared library can be bound on this machine
    pub fn is_available() -> bool {
        create_pdfium().is_ok()
    }

    fn extract_page_texts(document: &PdfDocument) -> Result<Vec<String>> {
        let pages = document.pages();
        let mut texts = Vec::with_capacity(pages.len() as usize);

        for index in 0..pages.len() {
            let page = pages.get(index).map_err(|e| Error::Pdfium {
                reason: format!("Failed to get page {}: {}", index + 1, e),
            })?;

            let text = page.text().map_err(|e| Error::Pdfium {
                reason: format!("Failed to extract text from page {}: {}", index + 1, e),
            })?;
            texts.push(text.all());
        }

        Ok(texts)
    }
}

impl PdfBackend for PdfiumBackend {
    fn load(&self, data: &[u8]) -> Result<PdfText> {
        if data.len() < 4 || &data[0..4] != b"%PDF" {
            return Err(Error::InvalidPdf {
                reason: "Not a valid PDF file".to_string(),
            });
        }

        if requires_password(data) {
            return Ok(PdfText::encrypted());
        }

        let pdfium = create_pdfium()?;
        let document = match pdfium.load_pdf_from_byte_slice(data, None) {
            Ok(document) => document,
            Err(PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError)) => {
                return Ok(PdfText::encrypted());
            }
            Err(e) => {
                return Err(Error::Pdfium {
                    reason: format!("{}", e),
                });
            }
        };

        Ok(PdfText::new(Self::extract_page_texts(&document)?))
    }
}
