// Library root
// -----------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) parses the command line and hands the image path to `ui::run`.
//
// Module responsibilities:
// - `config`: Reads endpoint and credential settings from the environment.
// - `auth`: Default credential discovery (API key, access token,
//   credentials file, metadata server).
// - `api`: Wire types for the Vision annotate endpoint and the blocking
//   HTTP client behind the `Annotator` trait.
// - `ui`: The annotate flow and the per-category output lines.
pub mod api;
pub mod auth;
pub mod config;
pub mod ui;
