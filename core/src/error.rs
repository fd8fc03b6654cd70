//! Error types for building, freezing and loading workspaces.

use std::path::PathBuf;

use thiserror::Error;


/// A single control-surface call that failed.
///
/// `op` names the multiplexer operation (e.g. `new-window`), `message`
/// carries whatever the multiplexer reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{op} failed: {message}")]
pub struct MuxError {
    pub op: String,
    pub message: String,
}

impl MuxError {
    pub fn new(op: impl Into<String>, message: impl Into<String>) -> Self {
        MuxError {
            op: op.into(),
            message: message.into(),
        }
    }
}


/// Failure running a workspace's `before_script`.
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("before_script not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("before_script {} could not be run: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("before_script {} exited with {status}{}", .path.display(), format_stderr(.stderr))]
    Failed {
        path: PathBuf,
        status: String,
        stderr: String,
    },
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}


/// Errors surfaced by `WorkspaceBuilder`.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("workspace configuration is empty (needs a session_name and at least one window)")]
    EmptyConfiguration,

    #[error("no session to build in and no way to create one")]
    NoSessionAvailable,

    #[error("session '{0}' already exists")]
    SessionAlreadyExists(String),

    #[error("before_script failed: {0}")]
    PreScriptFailed(#[source] ScriptError),

    #[error(transparent)]
    MultiplexerCallFailed(#[from] MuxError),
}


/// Errors reading settings or workspace files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("unsupported workspace file extension: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("failed to serialize workspace: {0}")]
    Serialize(String),
}
