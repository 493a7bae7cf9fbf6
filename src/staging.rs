//! In-place file publishing.
//!
//! New content is written to a temp file beside the destination and renamed
//! over it, so a failed write never leaves a truncated source file behind.
use std::io::{self, Write};
use std::path::Path;

pub fn publish_text(dest: &Path, text: &str) -> io::Result<()> {
    let dir = dest
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    staged.write_all(text.as_bytes())?;
    staged.as_file().sync_all()?;
    if let Ok(metadata) = std::fs::metadata(dest) {
        staged.as_file().set_permissions(metadata.permissions())?;
    }
    staged.persist(dest).map_err(|err| err.error)?;
    Ok(())
}

/// `\r\n` becomes `\n` and the text always ends with a newline.
pub fn normalize_line_endings(text: &str) -> String {
    let mut normalized = text.replace("\r\n", "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}
