mod atomic_write;
mod config;
mod logging;

use clap::CommandFactory;
use clap::FromArgMatches;
use clap::Parser;
use clap::Subcommand;
use nesti_tui::AppConfig;
use nesti_tui::ChatClient;
use nesti_tui::run_app;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Parser, Debug)]
#[command(
    author = "Nesti",
    version,
    about = "Chat with Nesti, the Linux grandpa penguin, from your terminal"
)]
struct Cli {
    /// Base URL of the chat backend.
    ///
    /// Precedence: this flag, then `NESTI_API_URL`, then the saved config,
    /// then `http://localhost:8000`.
    #[arg(long, env = "NESTI_API_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Probe the backend's health endpoint and report reachability.
    Health,
    /// Save a backend base URL to `~/.nesti/config.toml`.
    SetUrl {
        /// The URL to save, e.g. `http://chat.example:8000`.
        url: String,
    },
}

fn parse_cli() -> Cli {
    let matches = Cli::command()
        .version(nesti_tui::NESTI_VERSION)
        .get_matches();
    Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
}

/// Flag and env arrive through clap; this adds the config-file and built-in
/// fallbacks behind them.
fn resolve_base_url(flag_or_env: Option<String>) -> String {
    if let Some(url) = flag_or_env {
        return url;
    }
    match config::ConfigStore::new_default().and_then(|store| store.base_url()) {
        Ok(Some(url)) => url,
        Ok(None) => DEFAULT_BASE_URL.to_string(),
        Err(err) => {
            eprintln!("warning: failed to read config: {err}");
            DEFAULT_BASE_URL.to_string()
        }
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = parse_cli();

    if let Err(err) = logging::init_logging() {
        eprintln!("warning: failed to set up logging: {err}");
    }

    match cli.command {
        Some(CliCommand::Health) => {
            let base_url = resolve_base_url(cli.base_url);
            let client = ChatClient::new(&base_url)?;
            if client.check_health().await {
                println!("backend online at {base_url}");
            } else {
                println!("backend offline at {base_url}");
                std::process::exit(1);
            }
        }
        Some(CliCommand::SetUrl { url }) => {
            url::Url::parse(&url).map_err(|err| anyhow::anyhow!("invalid URL `{url}`: {err}"))?;
            let store = config::ConfigStore::new_default()?;
            store.set_base_url(&url)?;
            println!("saved base URL {url}");
        }
        None => {
            let base_url = resolve_base_url(cli.base_url);
            tracing::info!("starting session against {base_url}");
            let summary = run_app(AppConfig { base_url }).await?;
            println!(
                "Session ended. {} message(s) sent.",
                summary.messages_sent
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn base_url_flag_parses() {
        let cli = Cli::try_parse_from(["nesti", "--base-url", "http://host:9000"])
            .expect("parse args");
        assert_eq!(cli.base_url, Some("http://host:9000".to_string()));
    }

    #[test]
    fn set_url_subcommand_takes_a_url() {
        let cli = Cli::try_parse_from(["nesti", "set-url", "http://host:9000"])
            .expect("parse args");
        let Some(CliCommand::SetUrl { url }) = cli.command else {
            panic!("expected set-url command, got: {:?}", cli.command);
        };
        assert_eq!(url, "http://host:9000");
    }

    #[test]
    fn health_subcommand_parses() {
        let cli = Cli::try_parse_from(["nesti", "health"]).expect("parse args");
        assert!(matches!(cli.command, Some(CliCommand::Health)));
    }

    #[test]
    fn flag_wins_over_the_config_fallback() {
        assert_eq!(
            resolve_base_url(Some("http://flag:1".to_string())),
            "http://flag:1"
        );
    }
}
