//! Error types for the session document store

use thiserror::Error;

/// Result type alias for the session document store
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the session document store.
///
/// Leaf variants describe what actually went wrong. The operation variants
/// (`Storage`, `Extraction`, `Combine`, `Cleanup`) wrap a leaf (or another
/// wrapper) and name the store operation that failed.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad input shape: non-PDF upload, encrypted PDF, bad session id
    #[error("{reason}")]
    Validation { reason: String },

    /// Invalid PDF file
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// PDFium error
    #[error("PDFium error: {reason}")]
    Pdfium { reason: String },

    /// qpdf error
    #[error("qpdf error: {reason}")]
    QpdfError { reason: String },

    /// Base64 decode error
    #[error("Invalid base64 data: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Saving uploaded files into a session failed
    #[error("Error saving files: {source}")]
    Storage {
        session_id: String,
        #[source]
        source: Box<Error>,
    },

    /// Reading a PDF failed
    #[error("Error reading PDF {path}: {source}")]
    Extraction {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// Combining the documents of a session failed
    #[error("Error combining documents: {source}")]
    Combine {
        session_id: String,
        #[source]
        source: Box<Error>,
    },

    /// Enumerating old sessions failed
    #[error("Error cleaning old sessions in {base_dir}: {source}")]
    Cleanup {
        base_dir: String,
        #[source]
        source: Box<Error>,
    },
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Storage,
    Extraction,
    Combine,
    Cleanup,
    Other,
}

impl Error {
    pub fn validation(reason: impl Into<String>) -> Self {
        Error::Validation {
            reason: reason.into(),
        }
    }

    pub fn storage(session_id: &str, source: Error) -> Self {
        Error::Storage {
            session_id: session_id.to_string(),
            source: Box::new(source),
        }
    }

    pub fn extraction(path: &std::path::Path, source: Error) -> Self {
        Error::Extraction {
            path: path.display().to_string(),
            source: Box::new(source),
        }
    }

    pub fn combine(session_id: &str, source: Error) -> Self {
        Error::Combine {
            session_id: session_id.to_string(),
            source: Box::new(source),
        }
    }

    pub fn cleanup(base_dir: &std::path::Path, source: Error) -> Self {
        Error::Cleanup {
            base_dir: base_dir.display().to_string(),
            source: Box::new(source),
        }
    }

    /// Kind of this error (the outermost operation for wrapped errors)
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } => ErrorKind::Validation,
            Error::Storage { .. } => ErrorKind::Storage,
            Error::Extraction { .. } => ErrorKind::Extraction,
            Error::Combine { .. } => ErrorKind::Combine,
            Error::Cleanup { .. } => ErrorKind::Cleanup,
            _ => ErrorKind::Other,
        }
    }

    /// Follow the operation wrappers down to the original failure
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        loop {
            match current {
                Error::Storage { source, .. }
                | Error::Extraction { source, .. }
                | Error::Combine { source, .. }
                | Error::Cleanup { source, .. } => current = source,
                _ => return current,
            }
        }
    }

    /// Whether the underlying failure is a validation failure
    pub fn is_validation(&self) -> bool {
        matches!(self.root_cause(), Error::Validation { .. })
    }

    /// Return a sanitized error message safe to send to clients.
    /// Internal details (paths, library errors) are omitted, except for
    /// validation failures which are about the client's own input.
    /// Full details should be logged via tracing before calling this.
    pub fn client_message(&self) -> String {
        match self.root_cause() {
            Error::Validation { reason } => reason.clone(),
            Error::InvalidPdf { .. } => "Invalid PDF file".to_string(),
            Error::Pdfium { .. } | Error::QpdfError { .. } => "PDF processing error".to_string(),
            Error::Base64Decode(_) => "Invalid base64 data".to_string(),
            Error::Io(_) => match self.kind() {
                ErrorKind::Storage => "Error saving files".to_string(),
                ErrorKind::Extraction => "Error reading PDF".to_string(),
                ErrorKind::Combine => "Error combining documents".to_string(),
                ErrorKind::Cleanup => "Error cleaning old sessions".to_string(),
                _ => "I/O error".to_string(),
            },
            // root_cause never returns a wrapper
            _ => "Internal error".to_string(),
        }
    }
}
