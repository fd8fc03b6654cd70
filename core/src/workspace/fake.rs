//! In-memory `Multiplexer` for tests.
//!
//! Models the tmux behavior the builder depends on: a new session starts with
//! one window at index 1 holding one pane, window indices must be unique,
//! pane indices are contiguous from `pane_base_index`, and killing the
//! active window activates another one. Every call is recorded by name.

use std::collections::BTreeMap;

use crate::error::MuxError;
use crate::infrastructure::Multiplexer;
use crate::types::session::{NewWindow, PaneInfo, SessionInfo, WindowInfo};

const BASE_INDEX: u32 = 1;
const DEFAULT_SHELL: &str = "zsh";

/// Calls that change multiplexer state.
pub const MUTATIONS: &[&str] = &[
    "new-session",
    "kill-session",
    "new-window",
    "move-window",
    "kill-window",
    "select-window",
    "select-layout",
    "set-window-option",
    "split-window",
    "select-pane",
    "send-keys",
];


#[derive(Debug, Clone)]
pub struct FakePane {
    pub id: String,
    pub index: u32,
    pub path: Option<String>,
    pub command: Option<String>,
    pub active: bool,
    pub sent: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FakeWindow {
    pub id: String,
    pub index: u32,
    pub name: String,
    pub layout: String,
    pub active: bool,
    pub options: BTreeMap<String, String>,
    pub panes: Vec<FakePane>,
}

#[derive(Debug, Clone)]
pub struct FakeSession {
    pub info: SessionInfo,
    pub windows: Vec<FakeWindow>,
}


#[derive(Debug)]
pub struct FakeMux {
    pub calls: Vec<String>,
    pub sessions: Vec<FakeSession>,
    pub pane_base_index: u32,
    pub default_path: String,
    /// Operation name that fails the next time it is called.
    pub fail_on: Option<&'static str>,
    next_id: u32,
}

impl FakeMux {
    pub fn new() -> FakeMux {
        FakeMux {
            calls: Vec::new(),
            sessions: Vec::new(),
            pane_base_index: 0,
            default_path: "/home/me".to_string(),
            fail_on: None,
            next_id: 0,
        }
    }

    pub fn with_pane_base_index(mut self, index: u32) -> FakeMux {
        self.pane_base_index = index;
        self
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls.iter().filter(|c| c.as_str() == op).count()
    }

    pub fn mutation_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| MUTATIONS.contains(&c.as_str()))
            .count()
    }

    pub fn session(&self, name: &str) -> Option<&FakeSession> {
        self.sessions.iter().find(|s| s.info.name == name)
    }

    /// Windows of `name` ordered by index.
    pub fn windows(&self, name: &str) -> Vec<FakeWindow> {
        let mut windows = self
            .session(name)
            .map(|s| s.windows.clone())
            .unwrap_or_default();
        windows.sort_by_key(|w| w.index);
        windows
    }

    // -- seeding for freeze tests ----------------------------------------

    pub fn add_session(&mut self, name: &str) -> SessionInfo {
        let info = SessionInfo {
            id: self.next("$"),
            name: name.to_string(),
        };
        self.sessions.push(FakeSession {
            info: info.clone(),
            windows: Vec::new(),
        });
        info
    }

    pub fn add_window(
        &mut self,
        session: &SessionInfo,
        name: &str,
        layout: &str,
        active: bool,
    ) -> WindowInfo {
        let id = self.next("@");
        let s = self.session_mut(&session.id).expect("seeded session");
        let index = BASE_INDEX + s.windows.len() as u32;
        s.windows.push(FakeWindow {
            id,
            index,
            name: name.to_string(),
            layout: layout.to_string(),
            active,
            options: BTreeMap::new(),
            panes: Vec::new(),
        });
        window_info(s.windows.last().expect("just pushed"))
    }

    pub fn add_pane(&mut self, window: &WindowInfo, path: &str, command: &str, active: bool) {
        let id = self.next("%");
        let base = self.pane_base_index;
        let w = self.window_mut(&window.id).expect("seeded window");
        let index = base + w.panes.len() as u32;
        w.panes.push(FakePane {
            id,
            index,
            path: Some(path.to_string()),
            command: Some(command.to_string()),
            active,
            sent: Vec::new(),
        });
    }

    pub fn set_option(&mut self, window: &WindowInfo, name: &str, value: &str) {
        let w = self.window_mut(&window.id).expect("seeded window");
        w.options.insert(name.to_string(), value.to_string());
    }

    // -- internals -------------------------------------------------------

    fn next(&mut self, prefix: &str) -> String {
        let id = format!("{}{}", prefix, self.next_id);
        self.next_id += 1;
        id
    }

    fn record(&mut self, op: &str) -> Result<(), MuxError> {
        self.calls.push(op.to_string());
        if self.fail_on == Some(op) {
            self.fail_on = None;
            return Err(MuxError::new(op, "injected failure"));
        }
        Ok(())
    }

    fn session_mut(&mut self, id: &str) -> Option<&mut FakeSession> {
        self.sessions.iter_mut().find(|s| s.info.id == id)
    }

    fn window_mut(&mut self, id: &str) -> Option<&mut FakeWindow> {
        self.sessions
            .iter_mut()
            .flat_map(|s| s.windows.iter_mut())
            .find(|w| w.id == id)
    }

    fn pane_mut(&mut self, id: &str) -> Option<&mut FakePane> {
        self.sessions
            .iter_mut()
            .flat_map(|s| s.windows.iter_mut())
            .flat_map(|w| w.panes.iter_mut())
            .find(|p| p.id == id)
    }

    fn fresh_window(&mut self, index: u32, name: &str, path: Option<String>) -> FakeWindow {
        let id = self.next("@");
        let pane_id = self.next("%");
        FakeWindow {
            id,
            index,
            name: name.to_string(),
            layout: "even-horizontal".to_string(),
            active: false,
            options: BTreeMap::new(),
            panes: vec![FakePane {
                id: pane_id,
                index: self.pane_base_index,
                path: Some(path.unwrap_or_else(|| self.default_path.clone())),
                command: Some(DEFAULT_SHELL.to_string()),
                active: true,
                sent: Vec::new(),
            }],
        }
    }
}

fn window_info(w: &FakeWindow) -> WindowInfo {
    WindowInfo {
        id: w.id.clone(),
        index: w.index,
        name: w.name.clone(),
        layout: w.layout.clone(),
        active: w.active,
    }
}

fn pane_info(p: &FakePane) -> PaneInfo {
    PaneInfo {
        id: p.id.clone(),
        index: p.index,
        current_path: p.path.clone(),
        current_command: p.command.clone(),
        active: p.active,
    }
}

fn missing(op: &str, id: &str) -> MuxError {
    MuxError::new(op, format!("can't find {}", id))
}


impl Multiplexer for FakeMux {
    fn has_session(&mut self, name: &str) -> Result<bool, MuxError> {
        self.record("has-session")?;
        Ok(self.session(name).is_some())
    }

    fn new_session(&mut self, name: &str) -> Result<SessionInfo, MuxError> {
        self.record("new-session")?;
        if self.session(name).is_some() {
            return Err(MuxError::new("new-session", format!("duplicate session: {}", name)));
        }
        let info = SessionInfo {
            id: self.next("$"),
            name: name.to_string(),
        };
        let mut window = self.fresh_window(BASE_INDEX, DEFAULT_SHELL, None);
        window.active = true;
        self.sessions.push(FakeSession {
            info: info.clone(),
            windows: vec![window],
        });
        Ok(info)
    }

    fn list_sessions(&mut self) -> Result<Vec<SessionInfo>, MuxError> {
        self.record("list-sessions")?;
        Ok(self.sessions.iter().map(|s| s.info.clone()).collect())
    }

    fn kill_session(&mut self, session: &SessionInfo) -> Result<(), MuxError> {
        self.record("kill-session")?;
        let before = self.sessions.len();
        self.sessions.retain(|s| s.info.id != session.id);
        if self.sessions.len() == before {
            return Err(missing("kill-session", &session.id));
        }
        Ok(())
    }

    fn new_window(
        &mut self,
        session: &SessionInfo,
        spec: &NewWindow,
    ) -> Result<WindowInfo, MuxError> {
        self.record("new-window")?;
        let used: Vec<u32> = self
            .session_mut(&session.id)
            .ok_or_else(|| missing("new-window", &session.id))?
            .windows
            .iter()
            .map(|w| w.index)
            .collect();
        let index = match spec.index {
            Some(i) if used.contains(&i) => {
                return Err(MuxError::new("new-window", format!("index {} in use", i)));
            }
            Some(i) => i,
            None => (BASE_INDEX..).find(|i| !used.contains(i)).unwrap_or(BASE_INDEX),
        };
        let name = spec.name.clone().unwrap_or_else(|| DEFAULT_SHELL.to_string());
        let mut window = self.fresh_window(index, &name, spec.start_directory.clone());
        let s = self
            .session_mut(&session.id)
            .ok_or_else(|| missing("new-window", &session.id))?;
        if spec.attach {
            s.windows.iter_mut().for_each(|w| w.active = false);
            window.active = true;
        }
        let info = window_info(&window);
        s.windows.push(window);
        Ok(info)
    }

    fn list_windows(&mut self, session: &SessionInfo) -> Result<Vec<WindowInfo>, MuxError> {
        self.record("list-windows")?;
        let mut windows: Vec<WindowInfo> = self
            .session_mut(&session.id)
            .ok_or_else(|| missing("list-windows", &session.id))?
            .windows
            .iter()
            .map(window_info)
            .collect();
        windows.sort_by_key(|w| w.index);
        Ok(windows)
    }

    fn attached_window(&mut self, session: &SessionInfo) -> Result<WindowInfo, MuxError> {
        self.list_windows(session)?
            .into_iter()
            .find(|w| w.active)
            .ok_or_else(|| MuxError::new("list-windows", "no active window"))
    }

    fn move_window(
        &mut self,
        session: &SessionInfo,
        window: &WindowInfo,
        index: u32,
    ) -> Result<(), MuxError> {
        self.record("move-window")?;
        let s = self
            .session_mut(&session.id)
            .ok_or_else(|| missing("move-window", &session.id))?;
        if s.windows.iter().any(|w| w.index == index && w.id != window.id) {
            return Err(MuxError::new("move-window", format!("index {} in use", index)));
        }
        let w = s
            .windows
            .iter_mut()
            .find(|w| w.id == window.id)
            .ok_or_else(|| missing("move-window", &window.id))?;
        w.index = index;
        Ok(())
    }

    fn kill_window(&mut self, window: &WindowInfo) -> Result<(), MuxError> {
        self.record("kill-window")?;
        let s = self
            .sessions
            .iter_mut()
            .find(|s| s.windows.iter().any(|w| w.id == window.id))
            .ok_or_else(|| missing("kill-window", &window.id))?;
        let was_active = s.windows.iter().any(|w| w.id == window.id && w.active);
        s.windows.retain(|w| w.id != window.id);
        if was_active {
            if let Some(w) = s.windows.iter_mut().min_by_key(|w| w.index) {
                w.active = true;
            }
        }
        Ok(())
    }

    fn select_window(&mut self, window: &WindowInfo) -> Result<(), MuxError> {
        self.record("select-window")?;
        let s = self
            .sessions
            .iter_mut()
            .find(|s| s.windows.iter().any(|w| w.id == window.id))
            .ok_or_else(|| missing("select-window", &window.id))?;
        for w in s.windows.iter_mut() {
            w.active = w.id == window.id;
        }
        Ok(())
    }

    fn select_layout(&mut self, window: &WindowInfo, layout: &str) -> Result<(), MuxError> {
        self.record("select-layout")?;
        let w = self
            .window_mut(&window.id)
            .ok_or_else(|| missing("select-layout", &window.id))?;
        w.layout = layout.to_string();
        Ok(())
    }

    fn set_window_option(
        &mut self,
        window: &WindowInfo,
        name: &str,
        value: &str,
    ) -> Result<(), MuxError> {
        self.record("set-window-option")?;
        let w = self
            .window_mut(&window.id)
            .ok_or_else(|| missing("set-window-option", &window.id))?;
        w.options.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn show_window_option(
        &mut self,
        window: &WindowInfo,
        name: &str,
        global: bool,
    ) -> Result<Option<String>, MuxError> {
        self.record("show-window-options")?;
        if global && name == "pane-base-index" {
            return Ok(Some(self.pane_base_index.to_string()));
        }
        let w = self
            .window_mut(&window.id)
            .ok_or_else(|| missing("show-window-options", &window.id))?;
        Ok(w.options.get(name).cloned())
    }

    fn show_window_options(
        &mut self,
        window: &WindowInfo,
    ) -> Result<BTreeMap<String, String>, MuxError> {
        self.record("show-window-options")?;
        let w = self
            .window_mut(&window.id)
            .ok_or_else(|| missing("show-window-options", &window.id))?;
        Ok(w.options.clone())
    }

    fn split_window(
        &mut self,
        window: &WindowInfo,
        start_directory: Option<&str>,
        attach: bool,
    ) -> Result<PaneInfo, MuxError> {
        self.record("split-window")?;
        let id = self.next("%");
        let base = self.pane_base_index;
        let path = start_directory
            .map(str::to_string)
            .unwrap_or_else(|| self.default_path.clone());
        let w = self
            .window_mut(&window.id)
            .ok_or_else(|| missing("split-window", &window.id))?;
        if attach {
            w.panes.iter_mut().for_each(|p| p.active = false);
        }
        let pane = FakePane {
            id,
            index: base + w.panes.len() as u32,
            path: Some(path),
            command: Some(DEFAULT_SHELL.to_string()),
            active: attach,
            sent: Vec::new(),
        };
        let info = pane_info(&pane);
        w.panes.push(pane);
        Ok(info)
    }

    fn list_panes(&mut self, window: &WindowInfo) -> Result<Vec<PaneInfo>, MuxError> {
        self.record("list-panes")?;
        let w = self
            .window_mut(&window.id)
            .ok_or_else(|| missing("list-panes", &window.id))?;
        Ok(w.panes.iter().map(pane_info).collect())
    }

    fn attached_pane(&mut self, window: &WindowInfo) -> Result<PaneInfo, MuxError> {
        self.list_panes(window)?
            .into_iter()
            .find(|p| p.active)
            .ok_or_else(|| MuxError::new("list-panes", "no active pane"))
    }

    fn select_pane(&mut self, pane: &PaneInfo) -> Result<(), MuxError> {
        self.record("select-pane")?;
        let w = self
            .sessions
            .iter_mut()
            .flat_map(|s| s.windows.iter_mut())
            .find(|w| w.panes.iter().any(|p| p.id == pane.id))
            .ok_or_else(|| missing("select-pane", &pane.id))?;
        for p in w.panes.iter_mut() {
            p.active = p.id == pane.id;
        }
        Ok(())
    }

    fn send_keys(&mut self, pane: &PaneInfo, keys: &str, enter: bool) -> Result<(), MuxError> {
        self.record("send-keys")?;
        let p = self
            .pane_mut(&pane.id)
            .ok_or_else(|| missing("send-keys", &pane.id))?;
        if enter {
            p.sent.push(keys.to_string());
        }
        Ok(())
    }
}
