//! MCP Server implementation using rmcp

use crate::error::Error;
use crate::pdf::{PdfBackend, PdfiumBackend};
use crate::store::{self, SessionStore, StoredDocument, DEFAULT_BASE_DIR, DEFAULT_KEEP_LATEST};
use crate::upload::MemoryUpload;
use anyhow::Result;
use base64::Engine;
use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    schemars::JsonSchema, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Storage configuration for the comparison server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory holding one subdirectory per session (default: data/document_compare)
    pub base_dir: PathBuf,
    /// Sessions kept by cleanup when the caller does not say (default: 3)
    pub keep_latest: usize,
    /// Run session cleanup once before serving (default: false)
    pub clean_on_start: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            keep_latest: DEFAULT_KEEP_LATEST,
            clean_on_start: false,
        }
    }
}

impl ServerConfig {
    /// Build a configuration from `PDF_COMPARE_*` environment variables,
    /// falling back to defaults for anything unset or unparsable
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("PDF_COMPARE_BASE_DIR").filter(|d| !d.trim().is_empty()) {
            config.base_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("PDF_COMPARE_KEEP_LATEST") {
            match raw.trim().parse() {
                Ok(keep) => config.keep_latest = keep,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid PDF_COMPARE_KEEP_LATEST"),
            }
        }
        if let Some(raw) = lookup("PDF_COMPARE_CLEAN_ON_START") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => config.clean_on_start = true,
                "0" | "false" | "no" | "" => config.clean_on_start = false,
                _ => tracing::warn!(value = %raw, "Ignoring invalid PDF_COMPARE_CLEAN_ON_START"),
            }
        }

        config
    }
}

/// PDF comparison MCP server
#[derive(Clone)]
pub struct CompareServer {
    backend: Arc<dyn PdfBackend>,
    tool_router: ToolRouter<Self>,
    /// Server configuration
    config: Arc<ServerConfig>,
}

// ============================================================================
// Request/Response types for save_documents
// ============================================================================

/// An uploaded PDF carried inline
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UploadParam {
    /// Original filename (must end in .pdf)
    pub name: String,
    /// Base64 encoded file content
    pub base64: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SaveDocumentsParams {
    /// Session to save into. A new session is created when omitted.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Reference document
    pub reference: UploadParam,
    /// Actual document to compare against the reference
    pub actual: UploadParam,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct SaveDocumentsResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Request/Response types for combine_documents
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SessionParams {
    /// Session id returned by save_documents
    pub session_id: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CombineDocumentsResult {
    pub session_id: String,
    /// Number of PDFs combined
    pub document_count: u32,
    /// Combined text of all documents
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Request/Response types for read_pdf
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadPdfParams {
    /// Session id returned by save_documents
    pub session_id: String,
    /// Filename of a PDF in the session
    pub file_name: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ReadPdfResult {
    pub file_name: String,
    /// Extracted text with page markers
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Request/Response types for list_documents
// ============================================================================

#[derive(Debug, Serialize, JsonSchema)]
pub struct DocumentInfo {
    /// Full path to the PDF file
    pub path: String,
    /// Filename only
    pub name: String,
    /// File size in bytes
    pub size: u64,
    /// Last modified time (ISO 8601 format)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    /// Number of pages, if readable without a password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

impl From<StoredDocument> for DocumentInfo {
    fn from(doc: StoredDocument) -> Self {
        Self {
            path: doc.path.to_string_lossy().to_string(),
            name: doc.name,
            size: doc.size,
            modified: doc.modified,
            page_count: doc.page_count,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ListDocumentsResult {
    pub session_id: String,
    pub files: Vec<DocumentInfo>,
    pub total_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Request/Response types for clean_old_sessions
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CleanSessionsParams {
    /// Number of newest sessions to keep (default: server setting)
    #[serde(default)]
    pub keep_latest: Option<usize>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CleanSessionsResult {
    /// Sessions still present, newest first
    pub kept: Vec<String>,
    /// Sessions that were deleted
    pub deleted: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Tool implementations
// ============================================================================

#[tool_router]
impl CompareServer {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    /// Create a new CompareServer using PDFium for text extraction
    pub fn with_config(config: ServerConfig) -> Self {
        Self::with_backend(config, Arc::new(PdfiumBackend::new()))
    }

    /// Create a new CompareServer with a specific PDF backend
    pub fn with_backend(config: ServerConfig, backend: Arc<dyn PdfBackend>) -> Self {
        Self {
            backend,
            tool_router: Self::tool_router(),
            config: Arc::new(config),
        }
    }

    /// Save a reference and an actual PDF into a session
    #[tool(
        description = "Save two PDFs (reference and actual) into a comparison session. Creates a new session unless session_id is given.

Each document is {\"name\": \"file.pdf\", \"base64\": \"...\"}. Only .pdf filenames are accepted."
    )]
    async fn save_documents(&self, Parameters(params): Parameters<SaveDocumentsParams>) -> String {
        let result = self
            .process_save_documents(params)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "save_documents failed");
                SaveDocumentsResult {
                    session_id: None,
                    reference_path: None,
                    actual_path: None,
                    error: Some(e.client_message()),
                }
            });

        serde_json::to_string_pretty(&result).unwrap_or_default()
    }

    /// Combine the text of every PDF in a session
    #[tool(
        description = "Extract and concatenate the text of every PDF in a session, sorted by filename. Each document starts with a \"Document: <name>\" header and each page with a \"--- Page N ---\" marker."
    )]
    async fn combine_documents(&self, Parameters(params): Parameters<SessionParams>) -> String {
        let session_id = params.session_id.clone();
        let result = self
            .process_combine_documents(params)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "combine_documents failed");
                CombineDocumentsResult {
                    session_id,
                    document_count: 0,
                    text: String::new(),
                    error: Some(e.client_message()),
                }
            });

        serde_json::to_string_pretty(&result).unwrap_or_default()
    }

    /// Extract the text of one PDF in a session
    #[tool(description = "Extract the text of a single PDF stored in a session, with page markers.")]
    async fn read_pdf(&self, Parameters(params): Parameters<ReadPdfParams>) -> String {
        let file_name = params.file_name.clone();
        let result = self.process_read_pdf(params).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "read_pdf failed");
            ReadPdfResult {
                file_name,
                text: String::new(),
                error: Some(e.client_message()),
            }
        });

        serde_json::to_string_pretty(&result).unwrap_or_default()
    }

    /// List the PDFs stored in a session
    #[tool(description = "List the PDFs stored in a session with size, modification time and page count.")]
    async fn list_documents(&self, Parameters(params): Parameters<SessionParams>) -> String {
        let session_id = params.session_id.clone();
        let result = self
            .process_list_documents(params)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "list_documents failed");
                ListDocumentsResult {
                    session_id,
                    files: vec![],
                    total_count: 0,
                    error: Some(e.client_message()),
                }
            });

        serde_json::to_string_pretty(&result).unwrap_or_default()
    }

    /// Delete old sessions
    #[tool(
        description = "Delete all but the newest sessions. Sessions are ordered by name, descending; generated session ids sort by creation time."
    )]
    async fn clean_old_sessions(
        &self,
        Parameters(params): Parameters<CleanSessionsParams>,
    ) -> String {
        let result = self
            .process_clean_old_sessions(params)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "clean_old_sessions failed");
                CleanSessionsResult {
                    kept: vec![],
                    deleted: vec![],
                    error: Some(e.client_message()),
                }
            });

        serde_json::to_string_pretty(&result).unwrap_or_default()
    }
}

impl CompareServer {
    /// Run blocking store work off the async runtime
    async fn blocking<T, F>(f: F) -> crate::error::Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    {
        tokio::task::spawn_blocking(f)
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))?
    }

    /// Base directory and backend, owned so they can move into blocking work
    fn store_parts(&self) -> (PathBuf, Arc<dyn PdfBackend>) {
        (self.config.base_dir.clone(), self.backend.clone())
    }

    pub async fn process_save_documents(
        &self,
        params: SaveDocumentsParams,
    ) -> crate::error::Result<SaveDocumentsResult> {
        let engine = base64::engine::general_purpose::STANDARD;
        let reference_data = engine.decode(&params.reference.base64)?;
        let actual_data = engine.decode(&params.actual.base64)?;
        let mut reference = MemoryUpload::new(params.reference.name, reference_data);
        let mut actual = MemoryUpload::new(params.actual.name, actual_data);

        let (base_dir, backend) = self.store_parts();
        Self::blocking(move || {
            let store =
                SessionStore::with_backend(&base_dir, params.session_id.as_deref(), backend)?;
            let (reference_path, actual_path) = store.save_files(&mut reference, &mut actual)?;
            Ok(SaveDocumentsResult {
                session_id: Some(store.session_id().to_string()),
                reference_path: Some(reference_path.to_string_lossy().to_string()),
                actual_path: Some(actual_path.to_string_lossy().to_string()),
                error: None,
            })
        })
        .await
    }

    pub async fn process_combine_documents(
        &self,
        params: SessionParams,
    ) -> crate::error::Result<CombineDocumentsResult> {
        let (base_dir, backend) = self.store_parts();
        Self::blocking(move || {
            let store = SessionStore::open_existing(&base_dir, &params.session_id, backend)?;
            let (text, document_count) = store.combine_documents_counted()?;
            Ok(CombineDocumentsResult {
                session_id: params.session_id,
                document_count: document_count as u32,
                text,
                error: None,
            })
        })
        .await
    }

    pub async fn process_read_pdf(
        &self,
        params: ReadPdfParams,
    ) -> crate::error::Result<ReadPdfResult> {
        if !crate::upload::is_bare_file_name(&params.file_name) {
            return Err(Error::validation(format!(
                "Invalid file name: {}",
                params.file_name
            )));
        }

        let (base_dir, backend) = self.store_parts();
        Self::blocking(move || {
            let store = SessionStore::open_existing(&base_dir, &params.session_id, backend)?;
            let text = store.read_pdf(store.session_path().join(&params.file_name))?;
            Ok(ReadPdfResult {
                file_name: params.file_name,
                text,
                error: None,
            })
        })
        .await
    }

    pub async fn process_list_documents(
        &self,
        params: SessionParams,
    ) -> crate::error::Result<ListDocumentsResult> {
        let (base_dir, backend) = self.store_parts();
        Self::blocking(move || {
            let store = SessionStore::open_existing(&base_dir, &params.session_id, backend)?;
            let files: Vec<DocumentInfo> = store
                .list_documents()?
                .into_iter()
                .map(DocumentInfo::from)
                .collect();
            Ok(ListDocumentsResult {
                session_id: params.session_id,
                total_count: files.len() as u32,
                files,
                error: None,
            })
        })
        .await
    }

    pub async fn process_clean_old_sessions(
        &self,
        params: CleanSessionsParams,
    ) -> crate::error::Result<CleanSessionsResult> {
        let base_dir = self.config.base_dir.clone();
        let keep_latest = params.keep_latest.unwrap_or(self.config.keep_latest);
        Self::blocking(move || {
            let deleted = store::clean_old_sessions(&base_dir, keep_latest)?;
            let kept = store::list_sessions(&base_dir)?;
            Ok(CleanSessionsResult {
                kept,
                deleted,
                error: None,
            })
        })
        .await
    }
}

impl Default for CompareServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for CompareServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "PDF compare store keeps a reference and an actual PDF per session and returns \
                 their combined text for comparison. Call save_documents first, then \
                 combine_documents with the returned session_id."
                    .into(),
            ),
        }
    }
}

/// Run the MCP server with default configuration
pub async fn run_server() -> Result<()> {
    run_server_with_config(ServerConfig::default()).await
}

/// Run the MCP server with full configuration
pub async fn run_server_with_config(config: ServerConfig) -> Result<()> {
    if config.clean_on_start {
        let base_dir = config.base_dir.clone();
        let keep_latest = config.keep_latest;
        if base_dir.exists() {
            let deleted = CompareServer::blocking(move || {
                store::clean_old_sessions(&base_dir, keep_latest)
            })
            .await?;
            tracing::info!(deleted = deleted.len(), "Startup session cleanup finished");
        }
    }

    let server = CompareServer::with_config(config);

    tracing::info!("PDF compare server ready, waiting for connections...");

    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::{fake_encrypted_pdf, fake_pdf, FakeBackend};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn test_server(base_dir: &std::path::Path) -> CompareServer {
        CompareServer::with_backend(
            ServerConfig {
                base_dir: base_dir.to_path_buf(),
                ..ServerConfig::default()
            },
            Arc::new(FakeBackend),
        )
    }

    fn upload(name: &str, data: &[u8]) -> UploadParam {
        UploadParam {
            name: name.to_string(),
            base64: base64::engine::general_purpose::STANDARD.encode(data),
        }
    }

    #[test]
    fn test_default_values() {
        let config = ServerConfig::default();
        assert_eq!(config.base_dir, PathBuf::from("data/document_compare"));
        assert_eq!(config.keep_latest, 3);
        assert!(!config.clean_on_start);
    }

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("PDF_COMPARE_BASE_DIR", "/tmp/sessions"),
            ("PDF_COMPARE_KEEP_LATEST", "7"),
            ("PDF_COMPARE_CLEAN_ON_START", "true"),
        ]);
        let config = ServerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.base_dir, PathBuf::from("/tmp/sessions"));
        assert_eq!(config.keep_latest, 7);
        assert!(config.clean_on_start);
    }

    #[test]
    fn test_config_invalid_values_fall_back() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("PDF_COMPARE_KEEP_LATEST", "many"),
            ("PDF_COMPARE_CLEAN_ON_START", "sometimes"),
        ]);
        let config = ServerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.keep_latest, 3);
        assert!(!config.clean_on_start);
    }

    #[test]
    fn test_params_deserialization() {
        let json = r#"{"reference": {"name": "a.pdf", "base64": "JVBERg=="}, "actual": {"name": "b.pdf", "base64": "JVBERg=="}}"#;
        let params: SaveDocumentsParams = serde_json::from_str(json).unwrap();
        assert!(params.session_id.is_none());
        assert_eq!(params.reference.name, "a.pdf");

        let params: CleanSessionsParams = serde_json::from_str("{}").unwrap();
        assert!(params.keep_latest.is_none());
    }

    #[tokio::test]
    async fn test_save_then_combine() {
        let temp_dir = tempfile::tempdir().unwrap();
        let server = test_server(temp_dir.path());

        let saved = server
            .process_save_documents(SaveDocumentsParams {
                session_id: Some("s1".to_string()),
                reference: upload("a.pdf", &fake_pdf(&["Alpha"])),
                actual: upload("b.pdf", &fake_pdf(&["Beta"])),
            })
            .await
            .unwrap();
        assert_eq!(saved.session_id.as_deref(), Some("s1"));

        let combined = server
            .process_combine_documents(SessionParams {
                session_id: "s1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(combined.document_count, 2);
        assert_eq!(
            combined.text,
            "Document: a.pdf\n\n --- Page 1 --- \nAlpha\n\nDocument: b.pdf\n\n --- Page 1 --- \nBeta"
        );
    }

    #[tokio::test]
    async fn test_save_generates_session() {
        let temp_dir = tempfile::tempdir().unwrap();
        let server = test_server(temp_dir.path());

        let saved = server
            .process_save_documents(SaveDocumentsParams {
                session_id: None,
                reference: upload("a.pdf", &fake_pdf(&["x"])),
                actual: upload("b.pdf", &fake_pdf(&["y"])),
            })
            .await
            .unwrap();

        let session_id = saved.session_id.unwrap();
        assert!(temp_dir.path().join(&session_id).join("a.pdf").is_file());
    }

    #[tokio::test]
    async fn test_save_rejects_non_pdf() {
        let temp_dir = tempfile::tempdir().unwrap();
        let server = test_server(temp_dir.path());

        let err = server
            .process_save_documents(SaveDocumentsParams {
                session_id: Some("s1".to_string()),
                reference: upload("a.docx", b"not a pdf"),
                actual: upload("b.pdf", &fake_pdf(&["y"])),
            })
            .await
            .unwrap_err();
        assert_eq!(err.client_message(), "Only PDF files are allowed");
    }

    #[tokio::test]
    async fn test_save_rejects_bad_base64() {
        let temp_dir = tempfile::tempdir().unwrap();
        let server = test_server(temp_dir.path());

        let err = server
            .process_save_documents(SaveDocumentsParams {
                session_id: Some("s1".to_string()),
                reference: UploadParam {
                    name: "a.pdf".to_string(),
                    base64: "not valid base64!!!".to_string(),
                },
                actual: upload("b.pdf", &fake_pdf(&["y"])),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Base64Decode(_)));
    }

    #[tokio::test]
    async fn test_read_pdf_encrypted_message() {
        let temp_dir = tempfile::tempdir().unwrap();
        let server = test_server(temp_dir.path());
        let session = temp_dir.path().join("s1");
        std::fs::create_dir_all(&session).unwrap();
        std::fs::write(session.join("locked.pdf"), fake_encrypted_pdf()).unwrap();

        let err = server
            .process_read_pdf(ReadPdfParams {
                session_id: "s1".to_string(),
                file_name: "locked.pdf".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.client_message(), "PDF is encrypted: locked.pdf");
    }

    #[tokio::test]
    async fn test_read_pdf_rejects_traversal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let server = test_server(temp_dir.path());

        let err = server
            .process_read_pdf(ReadPdfParams {
                session_id: "s1".to_string(),
                file_name: "../other/x.pdf".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_list_documents() {
        let temp_dir = tempfile::tempdir().unwrap();
        let server = test_server(temp_dir.path());
        let session = temp_dir.path().join("s1");
        std::fs::create_dir_all(&session).unwrap();
        std::fs::write(session.join("b.pdf"), fake_pdf(&["y"])).unwrap();
        std::fs::write(session.join("a.pdf"), fake_pdf(&["x"])).unwrap();
        std::fs::write(session.join("notes.txt"), b"ignored").unwrap();

        let listed = server
            .process_list_documents(SessionParams {
                session_id: "s1".to_string(),
            })
            .await
            .unwrap();
        let names: Vec<&str> = listed.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
        assert_eq!(listed.total_count, 2);
    }

    #[tokio::test]
    async fn test_clean_old_sessions() {
        let temp_dir = tempfile::tempdir().unwrap();
        let server = test_server(temp_dir.path());
        for name in ["s1", "s2", "s3", "s4"] {
            std::fs::create_dir_all(temp_dir.path().join(name)).unwrap();
        }

        let result = server
            .process_clean_old_sessions(CleanSessionsParams {
                keep_latest: Some(2),
            })
            .await
            .unwrap();
        assert_eq!(result.kept, vec!["s4", "s3"]);
        assert_eq!(result.deleted, vec!["s2", "s1"]);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_created() {
        let temp_dir = tempfile::tempdir().unwrap();
        let server = test_server(temp_dir.path());
        for name in ["session_20240101_000000_aaaaaaaa", "session_20240102_000000_bbbbbbbb"] {
            std::fs::create_dir_all(temp_dir.path().join(name)).unwrap();
        }

        let err = server
            .process_list_documents(SessionParams {
                session_id: "zz_typo".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.client_message(), "Unknown session: zz_typo");

        let err = server
            .process_combine_documents(SessionParams {
                session_id: "zz_typo".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = server
            .process_read_pdf(ReadPdfParams {
                session_id: "zz_typo".to_string(),
                file_name: "a.pdf".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(!temp_dir.path().join("zz_typo").exists());

        let result = server
            .process_clean_old_sessions(CleanSessionsParams {
                keep_latest: Some(2),
            })
            .await
            .unwrap();
        assert!(result.deleted.is_empty());
        assert_eq!(
            result.kept,
            vec![
                "session_20240102_000000_bbbbbbbb",
                "session_20240101_000000_aaaaaaaa"
            ]
        );
    }

    #[tokio::test]
    async fn test_combine_counts_combined_documents() {
        let temp_dir = tempfile::tempdir().unwrap();
        let server = test_server(temp_dir.path());
        let session = temp_dir.path().join("s1");
        std::fs::create_dir_all(session.join("nested.pdf")).unwrap();
        std::fs::write(session.join("a.pdf"), fake_pdf(&["x"])).unwrap();
        std::fs::write(session.join("b.pdf"), fake_pdf(&[""])).unwrap();
        std::fs::write(session.join("c.pdf"), fake_pdf(&["z"])).unwrap();

        let combined = server
            .process_combine_documents(SessionParams {
                session_id: "s1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(combined.document_count, 3);
        assert_eq!(combined.text.matches("Document: ").count(), 3);
    }

    #[test]
    fn test_server_default() {
        let server = CompareServer::default();
        assert_eq!(server.config.keep_latest, 3);
    }
}
