//! Track Tree command-line front-end
//!
//! Loads one GPX file into an editing session, runs a single command against it and
//! prints the result as text or JSON. Editing commands write the edited track to a
//! new file.

pub mod commands;
pub mod logging;
mod settings;

pub use settings::{Command, Settings};

/// Errors surfaced to the user by the CLI
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Track(#[from] track_tree_lib::TrackError),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
