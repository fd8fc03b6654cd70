//! Workspace builder — turn a `WorkspaceConfig` into a live session.
//!
//! Windows are created in order, the session's default window is displaced
//! and replaced by the first configured one, panes are split in order and
//! fed their commands. Focus is resolved once, after everything exists, so
//! the incidental selection changes made by window and pane creation do not
//! matter.

use crate::error::{BuildError, MuxError};
use crate::infrastructure::Multiplexer;
use crate::types::config::BuildSettings;
use crate::types::session::{NewWindow, PaneInfo, SessionInfo, WindowInfo};
use crate::types::workspace::{WindowConfig, WorkspaceConfig};
use crate::workspace::script::run_before_script;


/// Where the builder gets its session from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSource {
    /// Build into a session that already exists. It must still hold the
    /// default window the multiplexer gave it.
    Existing(SessionInfo),
    /// Create a new session named after the configuration.
    Create,
}


/// Builds a `WorkspaceConfig` into a live session.
#[derive(Debug, Clone)]
pub struct WorkspaceBuilder {
    config: WorkspaceConfig,
    source: Option<SessionSource>,
    settings: BuildSettings,
}


impl WorkspaceBuilder {
    /// Fails with `EmptyConfiguration` if there is nothing to build.
    pub fn new(config: WorkspaceConfig) -> Result<WorkspaceBuilder, BuildError> {
        if config.is_empty() {
            return Err(BuildError::EmptyConfiguration);
        }
        Ok(WorkspaceBuilder {
            config,
            source: None,
            settings: BuildSettings::default(),
        })
    }

    pub fn with_source(mut self, source: SessionSource) -> WorkspaceBuilder {
        self.source = Some(source);
        self
    }

    pub fn with_settings(mut self, settings: BuildSettings) -> WorkspaceBuilder {
        self.settings = settings;
        self
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Build the workspace and return the session it lives in.
    ///
    /// Only a failing `before_script` is cleaned up (a session this call
    /// created is killed). Any other failure leaves what was created so far.
    pub fn build<M: Multiplexer + ?Sized>(&self, mux: &mut M) -> Result<SessionInfo, BuildError> {
        let source = self.source.as_ref().ok_or(BuildError::NoSessionAvailable)?;
        let (session, created) = match source {
            SessionSource::Existing(session) => (session.clone(), false),
            SessionSource::Create => (self.create_session(mux)?, true),
        };

        if let Some(script) = &self.config.before_script {
            if let Err(e) = run_before_script(script) {
                tracing::warn!("{}", e);
                if created {
                    tracing::warn!("killing session '{}'", session.name);
                    if let Err(kill) = mux.kill_session(&session) {
                        tracing::warn!("{}", kill);
                    }
                }
                return Err(BuildError::PreScriptFailed(e));
            }
        }

        let mut focus_window: Option<WindowInfo> = None;
        let mut focus_panes: Vec<PaneInfo> = Vec::new();

        for (position, wconf) in self.config.windows.iter().enumerate() {
            let window = self.create_window(mux, &session, wconf, position == 0)?;
            if let Some(pane) = self.create_panes(mux, &window, wconf)? {
                focus_panes.push(pane);
            }
            if wconf.is_focused() {
                focus_window = Some(window);
            }
        }

        // Panes first: selecting the window last lands the client on the
        // right pane.
        for pane in &focus_panes {
            mux.select_pane(pane)?;
        }
        if let Some(window) = &focus_window {
            mux.select_window(window)?;
        }

        tracing::info!(
            "built session '{}' with {} window(s)",
            session.name,
            self.config.windows.len()
        );
        Ok(session)
    }

    fn create_session<M: Multiplexer + ?Sized>(&self, mux: &mut M) -> Result<SessionInfo, BuildError> {
        let name = &self.config.session_name;
        if mux.has_session(name)? {
            return Err(BuildError::SessionAlreadyExists(name.clone()));
        }
        let session = mux.new_session(name)?;
        tracing::info!("created session '{}' ({})", session.name, session.id);
        Ok(session)
    }

    /// Create one configured window. The first window replaces the default
    /// window: the default is moved out of the way, the new window takes its
    /// place, then the default is killed.
    fn create_window<M: Multiplexer + ?Sized>(
        &self,
        mux: &mut M,
        session: &SessionInfo,
        wconf: &WindowConfig,
        first: bool,
    ) -> Result<WindowInfo, BuildError> {
        let displaced = if first {
            let default = mux.attached_window(session)?;
            let index = self.free_high_index(mux, session)?;
            tracing::debug!("moving default window {} to index {}", default.id, index);
            mux.move_window(session, &default, index)?;
            Some(default)
        } else {
            None
        };

        // tmux applies -c to the window's first pane only, so resolve it
        // the same way later panes are resolved.
        let start_directory = wconf
            .panes
            .first()
            .and_then(|pane| wconf.pane_start_directory(pane))
            .map(|dir| dir.to_string_lossy().into_owned());

        let window = mux.new_window(
            session,
            &NewWindow {
                name: wconf.window_name.clone(),
                start_directory,
                index: wconf.window_index,
                attach: false,
            },
        )?;
        tracing::debug!("created window {} '{}' at {}", window.id, window.name, window.index);

        if let Some(default) = displaced {
            mux.kill_window(&default)?;
        }

        for (name, value) in &wconf.options {
            tracing::debug!("{}: set {} {}", window.id, name, value);
            mux.set_window_option(&window, name, &value.to_tmux_arg())?;
        }
        Ok(window)
    }

    /// Create the window's panes and send their commands. Returns the last
    /// pane marked `focus`.
    fn create_panes<M: Multiplexer + ?Sized>(
        &self,
        mux: &mut M,
        window: &WindowInfo,
        wconf: &WindowConfig,
    ) -> Result<Option<PaneInfo>, BuildError> {
        let base = mux
            .show_window_option(window, "pane-base-index", true)?
            .and_then(|value| value.trim().parse::<u32>().ok())
            .unwrap_or(0);

        let mut focus = None;
        for (offset, pconf) in wconf.panes.iter().enumerate() {
            let expected = base + offset as u32;
            let pane = if offset == 0 {
                mux.attached_pane(window)?
            } else {
                let dir = wconf
                    .pane_start_directory(pconf)
                    .map(|dir| dir.to_string_lossy().into_owned());
                mux.split_window(window, dir.as_deref(), true)?
            };
            if pane.index != expected {
                return Err(MuxError::new(
                    "split-window",
                    format!(
                        "pane {} in window {} has index {}, expected {}",
                        pane.id, window.id, pane.index, expected
                    ),
                )
                .into());
            }

            if let Some(layout) = &wconf.layout {
                mux.select_layout(window, layout)?;
            }

            for command in &pconf.shell_command {
                tracing::debug!("{}: send {:?}", pane.id, command);
                mux.send_keys(&pane, command, true)?;
            }

            if pconf.is_focused() {
                focus = Some(pane);
            }
        }
        Ok(focus)
    }

    /// First index at or above `displaced_window_index` that no live window
    /// uses and no configured window asks for.
    fn free_high_index<M: Multiplexer + ?Sized>(
        &self,
        mux: &mut M,
        session: &SessionInfo,
    ) -> Result<u32, BuildError> {
        let live: Vec<u32> = mux.list_windows(session)?.iter().map(|w| w.index).collect();
        let wanted: Vec<u32> = self
            .config
            .windows
            .iter()
            .filter_map(|w| w.window_index)
            .collect();
        let index = (self.settings.displaced_window_index..)
            .find(|i| !live.contains(i) && !wanted.contains(i))
            .unwrap_or(self.settings.displaced_window_index);
        Ok(index)
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
