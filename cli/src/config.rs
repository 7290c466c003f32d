//! Persistent settings in `~/.nesti/config.toml`.
//!
//! The file is user-editable, so writes go through `toml_edit` to preserve
//! comments and layout. Reads tolerate a file that no longer parses as TOML
//! by falling back to a line scan, so one broken table elsewhere in the file
//! does not wipe the saved backend URL.

use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use toml_edit::DocumentMut;
use toml_edit::Item as TomlItem;
use toml_edit::value;

use crate::atomic_write::write_atomic_text;

const BASE_URL_KEY: &str = "base_url";

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn new_default() -> anyhow::Result<Self> {
        let Some(home) = dirs::home_dir() else {
            anyhow::bail!("cannot determine home directory for config path");
        };
        Ok(Self::new(default_config_path(&home)))
    }

    /// The saved backend base URL, if any.
    pub fn base_url(&self) -> anyhow::Result<Option<String>> {
        let Some(content) = read_document_string(&self.path)? else {
            return Ok(None);
        };

        let doc = match content.parse::<DocumentMut>() {
            Ok(doc) => doc,
            Err(_) => return Ok(parse_base_url_fallback(&content)),
        };

        Ok(read_base_url(&doc))
    }

    pub fn set_base_url(&self, base_url: &str) -> anyhow::Result<()> {
        let content = match read_document_string(&self.path) {
            Ok(Some(existing)) => existing,
            Ok(None) => String::new(),
            Err(err) => {
                // If we can't read the existing file, avoid clobbering it.
                return Err(err);
            }
        };

        let updated = match content.parse::<DocumentMut>() {
            Ok(mut doc) => {
                doc[BASE_URL_KEY] = value(base_url);
                doc.to_string()
            }
            Err(_) => append_base_url_fallback(&content, base_url),
        };

        write_atomic_text(&self.path, &updated)
    }
}

fn default_config_path(home: &Path) -> PathBuf {
    home.join(".nesti").join("config.toml")
}

fn read_base_url(doc: &DocumentMut) -> Option<String> {
    doc.get(BASE_URL_KEY)
        .and_then(TomlItem::as_value)
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn parse_base_url_fallback(contents: &str) -> Option<String> {
    for line in contents.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            // The key lives at the top level only.
            return None;
        }

        let Some(line) = strip_toml_comment(trimmed) else {
            continue;
        };
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim() != BASE_URL_KEY {
            continue;
        }

        let token = value.trim();
        let unquoted = token
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .unwrap_or(token);
        if !unquoted.is_empty() {
            return Some(unquoted.to_string());
        }
    }

    None
}

fn strip_toml_comment(line: &str) -> Option<&str> {
    let line = line.split_once('#').map_or(line, |(head, _)| head).trim();
    if line.is_empty() { None } else { Some(line) }
}

fn append_base_url_fallback(existing: &str, base_url: &str) -> String {
    let mut out = existing.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&format!("{BASE_URL_KEY} = \"{base_url}\"\n"));
    out
}

fn read_document_string(path: &Path) -> anyhow::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(anyhow::Error::new(err).context("read config.toml")),
    }
}
