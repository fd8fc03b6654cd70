//! Freeze — capture a live session as a `WorkspaceConfig`.
//!
//! Read-only. Commands are best effort: only the pane's foreground process
//! name is known, so shells and bare interpreters are dropped rather than
//! recorded as something to replay.

use std::path::PathBuf;

use crate::error::MuxError;
use crate::infrastructure::Multiplexer;
use crate::types::config::FreezeSettings;
use crate::types::session::{PaneInfo, SessionInfo};
use crate::types::workspace::{OptionValue, PaneConfig, WindowConfig, WorkspaceConfig};


pub fn freeze<M: Multiplexer + ?Sized>(
    mux: &mut M,
    session: &SessionInfo,
    settings: &FreezeSettings,
) -> Result<WorkspaceConfig, MuxError> {
    let mut windows = Vec::new();
    for window in mux.list_windows(session)? {
        let options = mux
            .show_window_options(&window)?
            .into_iter()
            .map(|(name, value)| (name, OptionValue::Text(value)))
            .collect();
        let panes = mux.list_panes(&window)?;
        let shared = shared_path(&panes);

        let pane_configs = panes
            .iter()
            .map(|pane| freeze_pane(pane, shared.is_none(), settings))
            .collect();

        windows.push(WindowConfig {
            window_name: Some(window.name.clone()),
            window_index: None,
            start_directory: shared.map(PathBuf::from),
            layout: Some(window.layout.clone()).filter(|l| !l.is_empty()),
            focus: window.active.then_some(true),
            options,
            panes: pane_configs,
        });
    }

    tracing::debug!("froze session '{}': {} window(s)", session.name, windows.len());
    Ok(WorkspaceConfig {
        session_name: session.name.clone(),
        before_script: None,
        windows,
    })
}


/// The path every pane is in, if they all agree.
fn shared_path(panes: &[PaneInfo]) -> Option<String> {
    let first = panes.first()?.current_path.clone()?;
    if panes
        .iter()
        .all(|p| p.current_path.as_deref() == Some(first.as_str()))
    {
        Some(first)
    } else {
        None
    }
}

fn freeze_pane(pane: &PaneInfo, needs_cd: bool, settings: &FreezeSettings) -> PaneConfig {
    let mut shell_command = Vec::new();
    if needs_cd {
        if let Some(path) = &pane.current_path {
            shell_command.push(format!("cd {}", shell_quote(path)));
        }
    }
    if let Some(command) = pane
        .current_command
        .as_deref()
        .filter(|c| !settings.is_shell(c))
    {
        shell_command.push(command.to_string());
    }
    PaneConfig {
        start_directory: None,
        focus: pane.active.then_some(true),
        shell_command,
    }
}

fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-~+,:@%=".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
