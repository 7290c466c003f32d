// Forbid accidental stdout/stderr writes in the library portion of the TUI.
#![deny(clippy::print_stdout, clippy::print_stderr)]

mod app;
mod app_event;
mod app_event_sender;
mod chat_client;
mod clipboard;
mod composer;
mod conversation;
mod history_cell;
mod pasted_paths;
mod terminal;
mod thinking;
mod ui_colors;
mod version;

pub use app::AppConfig;
pub use app::SessionSummary;
pub use app::run_app;
pub use chat_client::ChatClient;
pub use chat_client::OFFLINE_REPLY;
pub use version::NESTI_VERSION;
