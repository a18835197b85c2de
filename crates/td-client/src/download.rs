//! Saving downloaded tender documents

use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name for a stored document reference: its last path segment,
/// percent-decoded, with anything unsafe for a file name replaced.
pub fn file_name_from_reference(reference: &str) -> String {
    let path = reference.split(['?', '#']).next().unwrap_or(reference);
    let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    let decoded = urlencoding::decode(last)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| last.to_string());
    let cleaned = sanitize_file_name(&decoded);
    if cleaned.trim_matches(['_', '.']).is_empty() {
        "document".to_string()
    } else {
        cleaned
    }
}

/// Replace characters that are not allowed in file names with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Write `bytes` into `dir` under the reference's file name. The directory
/// is created if needed. Returns the written path.
pub fn save_download(dir: &Path, reference: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let target = dir.join(file_name_from_reference(reference));
    std::fs::write(&target, bytes)?;
    info!(path = %target.display(), size = bytes.len(), "Saved document");
    Ok(target)
}
