//! qpdf FFI helpers for encryption and page counts
//!
//! qpdf is vendored, so this check works even where the PDFium shared
//! library is not installed.

use crate::error::{Error, Result};
use qpdf::QPdf;

/// Map qpdf crate errors to our error types
fn map_qpdf_error(e: qpdf::QPdfError) -> Error {
    Error::QpdfError {
        reason: e.to_string(),
    }
}

/// Whether the PDF cannot be opened without a user password.
///
/// Only a definite password failure counts. Any other qpdf failure returns
/// `false` and leaves the verdict on the data to the text extractor.
pub fn requires_password(data: &[u8]) -> bool {
    match QPdf::read_from_memory(data) {
        Ok(_) => false,
        Err(e) => matches!(e.error_code(), qpdf::QPdfErrorCode::InvalidPassword),
    }
}

/// Number of pages according to qpdf
pub fn page_count(data: &[u8]) -> Result<u32> {
    let qpdf = QPdf::read_from_memory(data).map_err(map_qpdf_error)?;
    qpdf.get_num_pages().map_err(map_qpdf_error)
}
