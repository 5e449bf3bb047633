//! PDF reader collaborator used by the session store

use crate::error::Result;

/// Text content of a loaded PDF
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfText {
    encrypted: bool,
    pages: Vec<String>,
}

impl PdfText {
    /// Readable document with one entry per page, in page order
    pub fn new(pages: Vec<String>) -> Self {
        Self {
            encrypted: false,
            pages,
        }
    }

    /// Document that cannot be read without a password
    pub fn encrypted() -> Self {
        Self {
            encrypted: true,
            pages: Vec::new(),
        }
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Text of a page (0-indexed)
    pub fn page_text(&self, index: usize) -> Option<&str> {
        self.pages.get(index).map(String::as_str)
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }
}

/// Something that can turn PDF bytes into per-page text.
///
/// Implementations report password-protected documents through
/// [`PdfText::encrypted`] rather than an error, and fail on corrupt data.
pub trait PdfBackend: Send + Sync {
    fn load(&self, data: &[u8]) -> Result<PdfText>;
}

#[cfg(any(test, feature = "testing"))]
pub mod testing {
    //! Deterministic stand-in for a real PDF library.
    //!
    //! Fake documents are `%PDF-fake\n` followed by page texts separated by
    //! form feeds. `%PDF-fake-encrypted` marks an encrypted document.

    use super::*;
    use crate::error::Error;

    const HEADER: &[u8] = b"%PDF-fake\n";
    const ENCRYPTED: &[u8] = b"%PDF-fake-encrypted";

    /// Backend reading the fake format described above
    pub struct FakeBackend;

    impl PdfBackend for FakeBackend {
        fn load(&self, data: &[u8]) -> Result<PdfText> {
            if data.starts_with(ENCRYPTED) {
                return Ok(PdfText::encrypted());
            }
            let body = data.strip_prefix(HEADER).ok_or_else(|| Error::InvalidPdf {
                reason: "Not a valid PDF file".to_string(),
            })?;
            let text = String::from_utf8_lossy(body);
            Ok(PdfText::new(text.split('\x0c').map(str::to_string).collect()))
        }
    }

    pub fn fake_pdf(pages: &[&str]) -> Vec<u8> {
        let mut data = HEADER.to_vec();
        data.extend_from_slice(pages.join("\x0c").as_bytes());
        data
    }

    pub fn fake_encrypted_pdf() -> Vec<u8> {
        ENCRYPTED.to_vec()
    }
}
