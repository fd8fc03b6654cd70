//! tmux control surface — argument building, output parsing, process calls.
//!
//! Every query uses a `-F` format with tab-separated fields so results can
//! be parsed without guessing at tmux's human-readable output. The
//! free-form field (name, path) always comes last.

use std::collections::BTreeMap;
use std::process::{Command, Output};

use crate::error::MuxError;
use crate::infrastructure::Multiplexer;
use crate::types::config::TmuxSettings;
use crate::types::session::{NewWindow, PaneInfo, SessionInfo, WindowInfo};

pub const SESSION_FORMAT: &str = "#{session_id}\t#{session_name}";
pub const WINDOW_FORMAT: &str =
    "#{window_id}\t#{window_index}\t#{window_active}\t#{window_layout}\t#{window_name}";
pub const PANE_FORMAT: &str =
    "#{pane_id}\t#{pane_index}\t#{pane_active}\t#{pane_current_command}\t#{pane_current_path}";


// ---------------------------------------------------------------------------
// Command builder
// ---------------------------------------------------------------------------

/// Builds tmux subcommand argument lists. Pure; nothing is executed.
#[derive(Debug, Clone, Default)]
pub struct TmuxCommandBuilder;

impl TmuxCommandBuilder {
    pub fn new() -> Self {
        TmuxCommandBuilder
    }

    pub fn has_session(&self, name: &str) -> Vec<String> {
        // `=` forces an exact match instead of tmux's prefix matching.
        args(&["has-session", "-t", &format!("={}", name)])
    }

    pub fn new_session(&self, name: &str) -> Vec<String> {
        args(&["new-session", "-d", "-P", "-F", SESSION_FORMAT, "-s", name])
    }

    pub fn list_sessions(&self) -> Vec<String> {
        args(&["list-sessions", "-F", SESSION_FORMAT])
    }

    pub fn kill_session(&self, session_id: &str) -> Vec<String> {
        args(&["kill-session", "-t", session_id])
    }

    pub fn new_window(&self, session_id: &str, spec: &NewWindow) -> Vec<String> {
        let mut out = args(&["new-window", "-P", "-F", WINDOW_FORMAT]);
        if !spec.attach {
            out.push("-d".into());
        }
        if let Some(name) = &spec.name {
            out.extend(["-n".to_string(), name.clone()]);
        }
        if let Some(dir) = &spec.start_directory {
            out.extend(["-c".to_string(), dir.clone()]);
        }
        let target = match spec.index {
            Some(index) => format!("{}:{}", session_id, index),
            None => format!("{}:", session_id),
        };
        out.extend(["-t".to_string(), target]);
        out
    }

    pub fn list_windows(&self, session_id: &str) -> Vec<String> {
        args(&["list-windows", "-t", session_id, "-F", WINDOW_FORMAT])
    }

    pub fn move_window(&self, session_id: &str, window_id: &str, index: u32) -> Vec<String> {
        args(&[
            "move-window",
            "-s",
            window_id,
            "-t",
            &format!("{}:{}", session_id, index),
        ])
    }

    pub fn kill_window(&self, window_id: &str) -> Vec<String> {
        args(&["kill-window", "-t", window_id])
    }

    pub fn select_window(&self, window_id: &str) -> Vec<String> {
        args(&["select-window", "-t", window_id])
    }

    pub fn select_layout(&self, window_id: &str, layout: &str) -> Vec<String> {
        args(&["select-layout", "-t", window_id, layout])
    }

    pub fn set_window_option(&self, window_id: &str, name: &str, value: &str) -> Vec<String> {
        args(&["set-window-option", "-t", window_id, name, value])
    }

    pub fn show_window_option(&self, window_id: &str, name: &str, global: bool) -> Vec<String> {
        if global {
            args(&["show-window-options", "-gv", name])
        } else {
            args(&["show-window-options", "-v", "-t", window_id, name])
        }
    }

    pub fn show_window_options(&self, window_id: &str) -> Vec<String> {
        args(&["show-window-options", "-t", window_id])
    }

    pub fn split_window(&self, window_id: &str, start_directory: Option<&str>, attach: bool) -> Vec<String> {
        let mut out = args(&["split-window", "-t", window_id, "-P", "-F", PANE_FORMAT]);
        if !attach {
            out.push("-d".into());
        }
        if let Some(dir) = start_directory {
            out.extend(["-c".to_string(), dir.to_string()]);
        }
        out
    }

    pub fn list_panes(&self, window_id: &str) -> Vec<String> {
        args(&["list-panes", "-t", window_id, "-F", PANE_FORMAT])
    }

    pub fn select_pane(&self, pane_id: &str) -> Vec<String> {
        args(&["select-pane", "-t", pane_id])
    }

    /// `-l` sends the text literally so words like `Enter` are not key names.
    pub fn send_keys_literal(&self, pane_id: &str, keys: &str) -> Vec<String> {
        args(&["send-keys", "-t", pane_id, "-l", keys])
    }

    pub fn send_enter(&self, pane_id: &str) -> Vec<String> {
        args(&["send-keys", "-t", pane_id, "Enter"])
    }
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}


// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

/// Parse `SESSION_FORMAT` lines. Malformed lines are skipped.
pub fn parse_sessions(output: &str) -> Vec<SessionInfo> {
    lines(output)
        .filter_map(|line| {
            let mut parts = line.splitn(2, '\t');
            let id = parts.next()?;
            let name = parts.next()?;
            Some(SessionInfo {
                id: id.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}

/// Parse `WINDOW_FORMAT` lines. Malformed lines are skipped.
pub fn parse_windows(output: &str) -> Vec<WindowInfo> {
    lines(output)
        .filter_map(|line| {
            let parts: Vec<&str> = line.splitn(5, '\t').collect();
            if parts.len() != 5 {
                tracing::warn!("skipping malformed window line: {:?}", line);
                return None;
            }
            Some(WindowInfo {
                id: parts[0].to_string(),
                index: parts[1].parse().ok()?,
                active: parts[2] == "1",
                layout: parts[3].to_string(),
                name: parts[4].to_string(),
            })
        })
        .collect()
}

/// Parse `PANE_FORMAT` lines. Malformed lines are skipped.
pub fn parse_panes(output: &str) -> Vec<PaneInfo> {
    lines(output)
        .filter_map(|line| {
            let parts: Vec<&str> = line.splitn(5, '\t').collect();
            if parts.len() != 5 {
                tracing::warn!("skipping malformed pane line: {:?}", line);
                return None;
            }
            Some(PaneInfo {
                id: parts[0].to_string(),
                index: parts[1].parse().ok()?,
                active: parts[2] == "1",
                current_command: non_empty(parts[3]),
                current_path: non_empty(parts[4]),
            })
        })
        .collect()
}

/// Parse `show-window-options` output (`name value` per line). Quoted
/// values are unquoted.
pub fn parse_window_options(output: &str) -> BTreeMap<String, String> {
    lines(output)
        .filter_map(|line| {
            let (name, value) = line.split_once(' ')?;
            Some((name.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

fn lines(output: &str) -> impl Iterator<Item = &str> {
    output
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}


// ---------------------------------------------------------------------------
// Process runner
// ---------------------------------------------------------------------------

/// `Multiplexer` backed by the `tmux` executable.
#[derive(Debug, Clone)]
pub struct Tmux {
    command: String,
    args: Vec<String>,
    builder: TmuxCommandBuilder,
}

impl Tmux {
    pub fn new(settings: &TmuxSettings) -> Tmux {
        Tmux {
            command: settings.resolve_command(),
            args: settings.args.clone(),
            builder: TmuxCommandBuilder::new(),
        }
    }

    fn output(&self, args: &[String]) -> Result<Output, MuxError> {
        let op = args.first().map(String::as_str).unwrap_or("tmux");
        tracing::trace!("{} {} {}", self.command, self.args.join(" "), args.join(" "));
        Command::new(&self.command)
            .args(&self.args)
            .args(args)
            .output()
            .map_err(|e| MuxError::new(op, format!("could not run {}: {}", self.command, e)))
    }

    /// Run a subcommand and return stdout; non-zero exit is an error.
    fn run(&self, args: Vec<String>) -> Result<String, MuxError> {
        let output = self.output(&args)?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(failure(&args, &output))
        }
    }

    fn run_one<T>(
        &self,
        args: Vec<String>,
        parse: fn(&str) -> Vec<T>,
    ) -> Result<T, MuxError> {
        let op = args.first().cloned().unwrap_or_default();
        let stdout = self.run(args)?;
        parse(&stdout)
            .into_iter()
            .next()
            .ok_or_else(|| MuxError::new(op, format!("unexpected output: {:?}", stdout.trim())))
    }
}

impl Multiplexer for Tmux {
    fn has_session(&mut self, name: &str) -> Result<bool, MuxError> {
        let args = self.builder.has_session(name);
        let output = self.output(&args)?;
        if output.status.success() {
            Ok(true)
        } else if reports_absence(&String::from_utf8_lossy(&output.stderr)) {
            Ok(false)
        } else {
            Err(failure(&args, &output))
        }
    }

    fn new_session(&mut self, name: &str) -> Result<SessionInfo, MuxError> {
        self.run_one(self.builder.new_session(name), parse_sessions)
    }

    fn list_sessions(&mut self) -> Result<Vec<SessionInfo>, MuxError> {
        let args = self.builder.list_sessions();
        let output = self.output(&args)?;
        if output.status.success() {
            Ok(parse_sessions(&String::from_utf8_lossy(&output.stdout)))
        } else if reports_absence(&String::from_utf8_lossy(&output.stderr)) {
            Ok(Vec::new())
        } else {
            Err(failure(&args, &output))
        }
    }

    fn kill_session(&mut self, session: &SessionInfo) -> Result<(), MuxError> {
        self.run(self.builder.kill_session(&session.id)).map(drop)
    }

    fn new_window(
        &mut self,
        session: &SessionInfo,
        spec: &NewWindow,
    ) -> Result<WindowInfo, MuxError> {
        self.run_one(self.builder.new_window(&session.id, spec), parse_windows)
    }

    fn list_windows(&mut self, session: &SessionInfo) -> Result<Vec<WindowInfo>, MuxError> {
        let stdout = self.run(self.builder.list_windows(&session.id))?;
        Ok(parse_windows(&stdout))
    }

    fn attached_window(&mut self, session: &SessionInfo) -> Result<WindowInfo, MuxError> {
        self.list_windows(session)?
            .into_iter()
            .find(|w| w.active)
            .ok_or_else(|| {
                MuxError::new("list-windows", format!("no active window in {}", session.name))
            })
    }

    fn move_window(
        &mut self,
        session: &SessionInfo,
        window: &WindowInfo,
        index: u32,
    ) -> Result<(), MuxError> {
        self.run(self.builder.move_window(&session.id, &window.id, index))
            .map(drop)
    }

    fn kill_window(&mut self, window: &WindowInfo) -> Result<(), MuxError> {
        self.run(self.builder.kill_window(&window.id)).map(drop)
    }

    fn select_window(&mut self, window: &WindowInfo) -> Result<(), MuxError> {
        self.run(self.builder.select_window(&window.id)).map(drop)
    }

    fn select_layout(&mut self, window: &WindowInfo, layout: &str) -> Result<(), MuxError> {
        self.run(self.builder.select_layout(&window.id, layout)).map(drop)
    }

    fn set_window_option(
        &mut self,
        window: &WindowInfo,
        name: &str,
        value: &str,
    ) -> Result<(), MuxError> {
        self.run(self.builder.set_window_option(&window.id, name, value))
            .map(drop)
    }

    fn show_window_option(
        &mut self,
        window: &WindowInfo,
        name: &str,
        global: bool,
    ) -> Result<Option<String>, MuxError> {
        let stdout = self.run(self.builder.show_window_option(&window.id, name, global))?;
        Ok(non_empty(stdout.trim()))
    }

    fn show_window_options(
        &mut self,
        window: &WindowInfo,
    ) -> Result<BTreeMap<String, String>, MuxError> {
        let stdout = self.run(self.builder.show_window_options(&window.id))?;
        Ok(parse_window_options(&stdout))
    }

    fn split_window(
        &mut self,
        window: &WindowInfo,
        start_directory: Option<&str>,
        attach: bool,
    ) -> Result<PaneInfo, MuxError> {
        self.run_one(
            self.builder.split_window(&window.id, start_directory, attach),
            parse_panes,
        )
    }

    fn list_panes(&mut self, window: &WindowInfo) -> Result<Vec<PaneInfo>, MuxError> {
        let stdout = self.run(self.builder.list_panes(&window.id))?;
        Ok(parse_panes(&stdout))
    }

    fn attached_pane(&mut self, window: &WindowInfo) -> Result<PaneInfo, MuxError> {
        self.list_panes(window)?
            .into_iter()
            .find(|p| p.active)
            .ok_or_else(|| MuxError::new("list-panes", format!("no active pane in {}", window.id)))
    }

    fn select_pane(&mut self, pane: &PaneInfo) -> Result<(), MuxError> {
        self.run(self.builder.select_pane(&pane.id)).map(drop)
    }

    fn send_keys(&mut self, pane: &PaneInfo, keys: &str, enter: bool) -> Result<(), MuxError> {
        if !keys.is_empty() {
            self.run(self.builder.send_keys_literal(&pane.id, keys))?;
        }
        if enter {
            self.run(self.builder.send_enter(&pane.id))?;
        }
        Ok(())
    }
}

/// stderr fragments tmux prints when there is no server or no such session.
const ABSENCE_MARKERS: &[&str] = &[
    "no server running",
    "can't find session",
    "no such session",
    "error connecting",
];

fn reports_absence(stderr: &str) -> bool {
    ABSENCE_MARKERS.iter().any(|marker| stderr.contains(marker))
}

fn failure(args: &[String], output: &Output) -> MuxError {
    let op = args.first().cloned().unwrap_or_default();
    MuxError::new(op, format!("{}{}", output.status, format_output(output)))
}

fn format_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut parts = Vec::new();
    if !stdout.trim().is_empty() {
        parts.push(stdout.trim().to_string());
    }
    if !stderr.trim().is_empty() {
        parts.push(stderr.trim().to_string());
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(": {}", parts.join("\n"))
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
