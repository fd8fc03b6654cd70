//! Multiplexer control surface.
//!
//! The builder and freezer only talk to a `Multiplexer`. The `tmux` module
//! provides the implementation that drives a real tmux server; tests use an
//! in-memory one.

pub mod tmux;

use std::collections::BTreeMap;

use crate::error::MuxError;
use crate::types::session::{NewWindow, PaneInfo, SessionInfo, WindowInfo};


/// Blocking primitives for driving a terminal multiplexer.
///
/// Every call is a round trip; implementations report failures as
/// `MuxError` naming the operation.
pub trait Multiplexer {
    // -- sessions --------------------------------------------------------

    fn has_session(&mut self, name: &str) -> Result<bool, MuxError>;

    /// Create a detached session. The multiplexer gives it one window with
    /// one pane.
    fn new_session(&mut self, name: &str) -> Result<SessionInfo, MuxError>;

    fn list_sessions(&mut self) -> Result<Vec<SessionInfo>, MuxError>;

    fn kill_session(&mut self, session: &SessionInfo) -> Result<(), MuxError>;

    // -- windows ---------------------------------------------------------

    fn new_window(
        &mut self,
        session: &SessionInfo,
        spec: &NewWindow,
    ) -> Result<WindowInfo, MuxError>;

    fn list_windows(&mut self, session: &SessionInfo) -> Result<Vec<WindowInfo>, MuxError>;

    /// The session's currently active window.
    fn attached_window(&mut self, session: &SessionInfo) -> Result<WindowInfo, MuxError>;

    fn move_window(
        &mut self,
        session: &SessionInfo,
        window: &WindowInfo,
        index: u32,
    ) -> Result<(), MuxError>;

    fn kill_window(&mut self, window: &WindowInfo) -> Result<(), MuxError>;

    fn select_window(&mut self, window: &WindowInfo) -> Result<(), MuxError>;

    fn select_layout(&mut self, window: &WindowInfo, layout: &str) -> Result<(), MuxError>;

    fn set_window_option(
        &mut self,
        window: &WindowInfo,
        name: &str,
        value: &str,
    ) -> Result<(), MuxError>;

    /// Read one window option; `global` reads the server-wide value.
    fn show_window_option(
        &mut self,
        window: &WindowInfo,
        name: &str,
        global: bool,
    ) -> Result<Option<String>, MuxError>;

    /// All options set locally on the window.
    fn show_window_options(
        &mut self,
        window: &WindowInfo,
    ) -> Result<BTreeMap<String, String>, MuxError>;

    // -- panes -----------------------------------------------------------

    fn split_window(
        &mut self,
        window: &WindowInfo,
        start_directory: Option<&str>,
        attach: bool,
    ) -> Result<PaneInfo, MuxError>;

    fn list_panes(&mut self, window: &WindowInfo) -> Result<Vec<PaneInfo>, MuxError>;

    /// The window's currently active pane.
    fn attached_pane(&mut self, window: &WindowInfo) -> Result<PaneInfo, MuxError>;

    fn select_pane(&mut self, pane: &PaneInfo) -> Result<(), MuxError>;

    /// Type `keys` literally into the pane, then Enter if `enter` is set.
    fn send_keys(&mut self, pane: &PaneInfo, keys: &str, enter: bool) -> Result<(), MuxError>;
}
