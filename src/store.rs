//! Session-scoped PDF storage
//!
//! Each session is a directory `<base_dir>/<session_id>/` holding the PDFs
//! uploaded for one comparison. The store saves uploads into it, extracts
//! their text, combines all of it into one blob, and prunes old sessions.
//!
//! Nothing here locks. Two stores pointed at the same session, or a cleanup
//! running while another process saves into an old session, can race.

use crate::error::{Error, Result};
use crate::pdf::{page_count, PdfBackend, PdfiumBackend};
use crate::session::{generate_session_id, validate_session_id};
use crate::upload::{has_pdf_extension, is_bare_file_name, UploadedFile};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Base directory used when none is configured
pub const DEFAULT_BASE_DIR: &str = "data/document_compare";

/// Number of sessions kept by cleanup when none is given
pub const DEFAULT_KEEP_LATEST: usize = 3;

/// A PDF stored in a session directory
#[derive(Debug, Clone, Serialize)]
pub struct StoredDocument {
    /// Filename only
    pub name: String,
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified time (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    /// Page count, when the file can be parsed without a password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

/// Storage for the PDFs of one comparison session
pub struct SessionStore {
    base_dir: PathBuf,
    session_id: String,
    session_path: PathBuf,
    backend: Arc<dyn PdfBackend>,
    span: tracing::Span,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("base_dir", &self.base_dir)
            .field("session_id", &self.session_id)
            .field("session_path", &self.session_path)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Open (or create) a session using the PDFium backend.
    ///
    /// A new session id is generated when `session_id` is `None`.
    pub fn open<P: AsRef<Path>>(base_dir: P, session_id: Option<&str>) -> Result<Self> {
        Self::with_backend(base_dir, session_id, Arc::new(PdfiumBackend::new()))
    }

    /// Open (or create) a session with a specific PDF backend.
    ///
    /// Opening an existing session is not an error; its files are kept.
    pub fn with_backend<P: AsRef<Path>>(
        base_dir: P,
        session_id: Option<&str>,
        backend: Arc<dyn PdfBackend>,
    ) -> Result<Self> {
        let session_id = match session_id {
            Some(id) => {
                validate_session_id(id)?;
                id.to_string()
            }
            None => generate_session_id(),
        };

        let base_dir = base_dir.as_ref().to_path_buf();
        let span = tracing::info_span!("session_store", session_id = %session_id);
        let _enter = span.enter();

        let session_path = base_dir.join(&session_id);
        let session_path = std::fs::create_dir_all(&session_path)
            .and_then(|_| std::fs::canonicalize(&session_path))
            .map_err(|e| {
                tracing::error!(
                    session_path = %session_path.display(),
                    error = %e,
                    "Failed to create session directory"
                );
                Error::storage(&session_id, Error::Io(e))
            })?;

        tracing::info!(session_path = %session_path.display(), "Session store initialized");
        drop(_enter);

        Ok(Self {
            base_dir,
            session_id,
            session_path,
            backend,
            span,
        })
    }

    /// Open a session that must already exist.
    ///
    /// Unlike [`SessionStore::with_backend`] this never creates a directory,
    /// so a mistyped id cannot leave an empty session behind for cleanup to
    /// count.
    pub fn open_existing<P: AsRef<Path>>(
        base_dir: P,
        session_id: &str,
        backend: Arc<dyn PdfBackend>,
    ) -> Result<Self> {
        validate_session_id(session_id)?;

        let base_dir = base_dir.as_ref().to_path_buf();
        let span = tracing::info_span!("session_store", session_id = %session_id);
        let _enter = span.enter();

        let session_path = base_dir.join(session_id);
        if !session_path.is_dir() {
            tracing::warn!(session_path = %session_path.display(), "Unknown session");
            return Err(Error::validation(format!("Unknown session: {}", session_id)));
        }
        let session_path = std::fs::canonicalize(&session_path)
            .map_err(|e| Error::storage(session_id, Error::Io(e)))?;

        tracing::info!(session_path = %session_path.display(), "Session store reopened");
        drop(_enter);

        Ok(Self {
            base_dir,
            session_id: session_id.to_string(),
            session_path,
            backend,
            span,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Absolute path of the session directory
    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Save the reference and actual uploads into the session directory.
    ///
    /// Files are handled in order, each validated before it is written. If the
    /// second upload is rejected the first one stays on disk.
    pub fn save_files(
        &self,
        reference: &mut impl UploadedFile,
        actual: &mut impl UploadedFile,
    ) -> Result<(PathBuf, PathBuf)> {
        let _enter = self.span.enter();

        let saved = self.write_upload(reference).and_then(|reference_path| {
            let actual_path = self.write_upload(actual)?;
            Ok((reference_path, actual_path))
        });

        match saved {
            Ok((reference_path, actual_path)) => {
                tracing::info!(
                    reference = %reference_path.display(),
                    actual = %actual_path.display(),
                    "Files saved"
                );
                Ok((reference_path, actual_path))
            }
            Err(e) => {
                tracing::error!(error = %e, "Error saving PDF files");
                Err(Error::storage(&self.session_id, e))
            }
        }
    }

    fn write_upload(&self, upload: &mut impl UploadedFile) -> Result<PathBuf> {
        let name = upload.name().to_string();
        if !has_pdf_extension(&name) {
            return Err(Error::validation("Only PDF files are allowed"));
        }
        if !is_bare_file_name(&name) {
            return Err(Error::validation(format!("Invalid file name: {}", name)));
        }

        let path = self.session_path.join(&name);
        let data = upload.read_bytes()?;
        std::fs::write(&path, data)?;
        Ok(path)
    }

    /// Extract the text of a PDF, one marked segment per non-blank page.
    ///
    /// Segments look like `"\n --- Page 3 --- \n<text>"` and are joined with
    /// newlines. Returns an empty string when no page has text.
    pub fn read_pdf<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let path = path.as_ref();
        let _enter = self.span.enter();

        match self.extract_segments(path) {
            Ok(segments) => {
                tracing::info!(
                    file = %path.display(),
                    pages = segments.len(),
                    "PDF read successfully"
                );
                Ok(segments.join("\n"))
            }
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "Error reading PDF");
                Err(Error::extraction(path, e))
            }
        }
    }

    fn extract_segments(&self, path: &Path) -> Result<Vec<String>> {
        let data = std::fs::read(path)?;
        let document = self.backend.load(&data)?;

        if document.is_encrypted() {
            return Err(Error::validation(format!(
                "PDF is encrypted: {}",
                file_name(path)
            )));
        }

        Ok(document
            .pages()
            .iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(index, text)| format!("\n --- Page {} --- \n{}", index + 1, text))
            .collect())
    }

    /// Concatenate the text of every PDF in the session, sorted by filename.
    ///
    /// Each document becomes `"Document: <name>\n<text>"`; documents are
    /// separated by a blank line.
    pub fn combine_documents(&self) -> Result<String> {
        self.combine_documents_counted().map(|(text, _)| text)
    }

    /// Same as [`SessionStore::combine_documents`], also returning how many
    /// documents went into the text
    pub fn combine_documents_counted(&self) -> Result<(String, usize)> {
        let _enter = self.span.enter();

        let combined = self.pdf_paths().and_then(|paths| {
            paths
                .iter()
                .map(|path| {
                    let content = self.read_pdf(path)?;
                    Ok(format!("Document: {}\n{}", file_name(path), content))
                })
                .collect::<Result<Vec<_>>>()
        });

        match combined {
            Ok(parts) => {
                tracing::info!(count = parts.len(), "Documents combined");
                Ok((parts.join("\n\n"), parts.len()))
            }
            Err(e) => {
                tracing::error!(error = %e, "Error combining documents");
                Err(Error::combine(&self.session_id, e))
            }
        }
    }

    /// List the PDFs in the session, sorted by filename
    pub fn list_documents(&self) -> Result<Vec<StoredDocument>> {
        let _enter = self.span.enter();

        let documents = self.pdf_paths().and_then(|paths| {
            paths
                .into_iter()
                .map(describe_document)
                .collect::<Result<Vec<_>>>()
        });

        documents.map_err(|e| {
            tracing::error!(error = %e, "Error listing documents");
            Error::storage(&self.session_id, e)
        })
    }

    /// Regular `.pdf` files directly inside the session directory, sorted
    fn pdf_paths(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&self.session_path)? {
            let path = entry?.path();
            let is_pdf = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
            if is_pdf && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Delete all but the `keep_latest` newest sessions under this store's
    /// base directory. See [`clean_old_sessions`].
    pub fn clean_old_sessions(&self, keep_latest: usize) -> Result<Vec<String>> {
        let _enter = self.span.enter();
        clean_old_sessions(&self.base_dir, keep_latest)
    }
}

/// Names of the session directories under `base_dir`, newest first.
///
/// "Newest" is by descending name, which matches creation order only for
/// ids that sort as strings in time order (generated ids do). A missing
/// base directory has no sessions.
pub fn list_sessions<P: AsRef<Path>>(base_dir: P) -> Result<Vec<String>> {
    let base_dir = base_dir.as_ref();
    if !base_dir.exists() {
        return Ok(Vec::new());
    }

    Ok(session_dirs(base_dir)?
        .iter()
        .map(|path| file_name(path))
        .collect())
}

/// Delete every session directory under `base_dir` except the first
/// `keep_latest` in descending name order. Returns the deleted names.
///
/// Deletion is best effort: a session that cannot be removed is logged and
/// skipped. Only failing to list `base_dir` is an error.
pub fn clean_old_sessions<P: AsRef<Path>>(base_dir: P, keep_latest: usize) -> Result<Vec<String>> {
    clean_sessions_with(base_dir.as_ref(), keep_latest, |path| std::fs::remove_dir_all(path))
}

fn clean_sessions_with(
    base_dir: &Path,
    keep_latest: usize,
    mut remove: impl FnMut(&Path) -> std::io::Result<()>,
) -> Result<Vec<String>> {
    let sessions = session_dirs(base_dir).map_err(|e| {
        tracing::error!(base_dir = %base_dir.display(), error = %e, "Error cleaning old sessions");
        Error::cleanup(base_dir, e)
    })?;

    let mut deleted = Vec::new();
    for folder in sessions.into_iter().skip(keep_latest) {
        match remove(&folder) {
            Ok(()) => {
                tracing::info!(path = %folder.display(), "Old session folder deleted");
                deleted.push(file_name(&folder));
            }
            Err(e) => {
                tracing::warn!(
                    path = %folder.display(),
                    error = %e,
                    "Failed to delete old session folder"
                );
            }
        }
    }

    Ok(deleted)
}

/// Subdirectories of `base_dir`, sorted by name descending
fn session_dirs(base_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(base_dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
    Ok(dirs)
}

fn describe_document(path: PathBuf) -> Result<StoredDocument> {
    let metadata = std::fs::metadata(&path)?;
    let modified = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .and_then(|d| chrono::DateTime::from_timestamp(d.as_secs() as i64, 0))
        .map(|dt| dt.to_rfc3339());
    let page_count = std::fs::read(&path)
        .ok()
        .and_then(|data| page_count(&data).ok());

    Ok(StoredDocument {
        name: file_name(&path),
        size: metadata.len(),
        modified,
        page_count,
        path,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
