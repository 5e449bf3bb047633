//! PDF Compare Store Library
//!
//! Session-scoped storage for the two PDFs of a document comparison:
//! - `store`: save uploads, extract per-page text, combine a session, prune old sessions
//! - `pdf`: text extraction backends (PDFium, with a qpdf encryption check)
//! - `server`: MCP tools over the store

pub mod error;
pub mod pdf;
pub mod server;
pub mod session;
pub mod store;
pub mod upload;

pub use error::{Error, ErrorKind, Result};
pub use server::{run_server, run_server_with_config, CompareServer, ServerConfig};
pub use store::{clean_old_sessions, list_sessions, SessionStore, StoredDocument};
pub use upload::{MemoryUpload, ReaderUpload, UploadedFile};
