//! Uploaded file capability
//!
//! The store only needs two things from an upload: its original file name
//! and its bytes. Callers holding data in memory use [`MemoryUpload`];
//! callers holding a stream use [`ReaderUpload`].

use std::io::Read;

/// An uploaded file: a name plus readable bytes
pub trait UploadedFile {
    /// Original file name as supplied by the uploader
    fn name(&self) -> &str;

    /// Read the full content of the upload
    fn read_bytes(&mut self) -> std::io::Result<Vec<u8>>;
}

/// Upload whose content is already in memory
#[derive(Debug, Clone)]
pub struct MemoryUpload {
    pub name: String,
    pub data: Vec<u8>,
}

impl MemoryUpload {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

impl UploadedFile for MemoryUpload {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&mut self) -> std::io::Result<Vec<u8>> {
        Ok(self.data.clone())
    }
}

/// Upload backed by any reader (file handle, network body, ...)
pub struct ReaderUpload<R> {
    name: String,
    reader: R,
}

impl<R: Read> ReaderUpload<R> {
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader,
        }
    }
}

impl<R: Read> UploadedFile for ReaderUpload<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&mut self) -> std::io::Result<Vec<u8>> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        Ok(data)
    }
}

/// Case-insensitive `.pdf` suffix check
pub fn has_pdf_extension(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf")
}

/// Whether a name is a bare file name (no directory components)
pub(crate) fn is_bare_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}
