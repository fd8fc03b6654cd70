//! Settings — how muxspace talks to tmux and how freeze classifies panes.
//!
//! Loaded from `settings.yaml` in the config directory. Every field has a
//! serde default, so a missing file or a partial file both work.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const SETTINGS_FILE: &str = "settings.yaml";
const DEFAULT_TMUX_COMMAND: &str = "tmux";


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub tmux: TmuxSettings,
    #[serde(default)]
    pub build: BuildSettings,
    #[serde(default)]
    pub freeze: FreezeSettings,
}


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TmuxSettings {
    /// Executable to run. Blank or missing means `tmux`.
    #[serde(default)]
    pub command: Option<String>,
    /// Arguments placed before every subcommand, e.g. `["-L", "work"]`.
    #[serde(default)]
    pub args: Vec<String>,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Index the session's default window is moved to before it is replaced.
    #[serde(default = "default_displaced_window_index")]
    pub displaced_window_index: u32,
}


/// Heuristics freeze uses to decide a pane is just sitting at a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreezeSettings {
    /// Commands starting with this are login shells (tmux reports `-bash`).
    #[serde(default = "default_login_shell_prefix")]
    pub login_shell_prefix: String,
    /// Shells and interpreters that are never recorded as a pane command.
    #[serde(default = "default_shell_names")]
    pub shell_names: Vec<String>,
}


fn default_displaced_window_index() -> u32 {
    99
}

fn default_login_shell_prefix() -> String {
    "-".to_string()
}

fn default_shell_names() -> Vec<String> {
    [
        "sh", "bash", "zsh", "fish", "dash", "ksh", "tcsh", "csh", "python", "ipython",
        "bpython", "ptpython", "ruby", "irb", "pry", "node",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for BuildSettings {
    fn default() -> Self {
        BuildSettings {
            displaced_window_index: default_displaced_window_index(),
        }
    }
}

impl Default for FreezeSettings {
    fn default() -> Self {
        FreezeSettings {
            login_shell_prefix: default_login_shell_prefix(),
            shell_names: default_shell_names(),
        }
    }
}


impl TmuxSettings {
    pub fn resolve_command(&self) -> String {
        self.command
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_TMUX_COMMAND)
            .to_string()
    }
}


impl FreezeSettings {
    /// True when `command` is an interactive shell or bare interpreter.
    /// Names compare case-insensitively (macOS reports `Python`).
    pub fn is_shell(&self, command: &str) -> bool {
        if !self.login_shell_prefix.is_empty() && command.starts_with(&self.login_shell_prefix) {
            return true;
        }
        let base = command
            .rsplit('/')
            .next()
            .unwrap_or(command)
            .to_ascii_lowercase();
        self.shell_names.iter().any(|name| {
            let name = name.to_ascii_lowercase();
            // python3.12, ruby2.7
            !name.is_empty()
                && base.strip_prefix(name.as_str()).is_some_and(|rest| {
                    rest.chars().all(|c| c.is_ascii_digit() || c == '.')
                })
        })
    }
}


impl Settings {
    /// Load `settings.yaml` from `config_dir`. A missing or blank file
    /// yields the defaults; a malformed one is an error.
    pub fn load(config_dir: &Path) -> Result<Settings, ConfigError> {
        let path = config_dir.join(SETTINGS_FILE);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no settings at {}, using defaults", path.display());
                return Ok(Settings::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        if contents.trim().is_empty() {
            return Ok(Settings::default());
        }
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path,
            message: e.to_string(),
        })
    }
}


/// Config directory: `$MUXSPACE_CONFIG_DIR`, else `~/.config/muxspace`.
pub fn resolve_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MUXSPACE_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".config").join("muxspace")
}
