//! File-based tracing output.
//!
//! The UI owns the terminal, so diagnostics go to `~/.nesti/log/nesti.log`
//! instead of stderr. Filtering follows `NESTI_LOG` (`RUST_LOG` syntax),
//! defaulting to `info`.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "NESTI_LOG";

pub fn init_logging() -> anyhow::Result<()> {
    let Some(home) = dirs::home_dir() else {
        anyhow::bail!("cannot determine home directory for log path");
    };
    let log_dir = log_dir(&home);
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("create {}", log_dir.display()))?;

    let log_path = log_dir.join("nesti.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("open {}", log_path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("install tracing subscriber: {err}"))?;

    Ok(())
}

fn log_dir(home: &std::path::Path) -> PathBuf {
    home.join(".nesti").join("log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn log_dir_lives_under_the_nesti_home() {
        let home = std::path::Path::new("home");
        assert_eq!(log_dir(home), home.join(".nesti").join("log"));
    }
}
