//! Interpret pasted text that may represent a filesystem path.
//!
//! Terminals deliver file drops and "copy as path" as plain text pastes, so
//! before inserting a paste literally the app checks whether it names a
//! single local file. Supported forms:
//!
//! - `file://` URLs (converted to local paths)
//! - shell-escaped or quoted single paths (via `shlex`)

use std::path::PathBuf;

pub(crate) fn normalize_pasted_path(pasted: &str) -> Option<PathBuf> {
    let pasted = pasted.trim();
    if pasted.is_empty() || pasted.contains('\n') {
        return None;
    }

    // file:// URL → filesystem path
    if let Ok(url) = url::Url::parse(pasted)
        && url.scheme() == "file"
    {
        return url.to_file_path().ok();
    }

    // shell-escaped single path → unescaped
    let parts: Vec<String> = shlex::Shlex::new(pasted).collect();
    if parts.len() == 1 {
        return parts.into_iter().next().map(PathBuf::from);
    }

    None
}
