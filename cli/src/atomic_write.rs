//! Crash-safe config writes: write a sibling temp file, then rename over
//! the destination so readers never observe a half-written config.

use std::io::Write as _;
use std::path::Path;

use anyhow::Context;
use tempfile::NamedTempFile;

pub fn write_atomic_text(path: &Path, contents: &str) -> anyhow::Result<()> {
    let Some(parent) = path.parent() else {
        anyhow::bail!("invalid path for atomic write: {}", path.display());
    };
    std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;

    // The temp file must live on the same filesystem as the destination for
    // the rename to be atomic.
    let mut tmp = NamedTempFile::new_in(parent).context("create temp file")?;
    let mut body = contents.to_string();
    if !body.ends_with('\n') {
        body.push('\n');
    }
    tmp.write_all(body.as_bytes()).context("write temp file")?;
    tmp.flush().context("flush temp file")?;

    tmp.persist(path).map_err(|err| {
        anyhow::Error::new(err.error).context(format!("persist file to {}", path.display()))
    })?;

    Ok(())
}
