//! Session id generation and validation

use crate::error::{Error, Result};

const MAX_SESSION_ID_LEN: usize = 128;

/// Generate a new session id.
///
/// Ids look like `session_20240131_142501_1a2b3c4d`. The timestamp prefix
/// makes lexicographic order match creation order (to the second), which is
/// what session cleanup relies on.
pub fn generate_session_id() -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("session_{}_{}", timestamp, &suffix[..8])
}

/// Check that a session id is safe to use as a single path component
pub fn validate_session_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id != "."
        && id != ".."
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(Error::validation(format!("Invalid session id: {}", id)))
    }
}
