/// The Nesti client version.
///
/// In development builds, this defaults to the workspace Cargo package version.
/// Release builds may inject the tag version via the `NESTI_VERSION`
/// environment variable so the client can be released by tagging without
/// editing `Cargo.toml`.
pub const NESTI_VERSION: &str = match option_env!("NESTI_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};
