//! Before-script runner.

use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::ScriptError;


/// Run `path` as a blocking child process with the current environment.
///
/// Stdout passes through; stderr is captured so a failure can report it.
pub fn run_before_script(path: &Path) -> Result<(), ScriptError> {
    tracing::debug!("running before_script {}", path.display());
    let output = Command::new(path)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ScriptError::NotFound(path.to_path_buf())
            } else {
                ScriptError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

    if output.status.success() {
        return Ok(());
    }
    Err(ScriptError::Failed {
        path: path.to_path_buf(),
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
