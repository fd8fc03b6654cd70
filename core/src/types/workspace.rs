//! Workspace configuration — the declarative session/window/pane tree.
//!
//! This is both the input of the builder and the output of freeze. Files are
//! read as YAML or JSON; no shorthand expansion happens here beyond the
//! `pane` placeholder that freeze writes for panes with nothing to replay.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// String written in place of a pane that has no directory, focus or commands.
pub const BLANK_PANE: &str = "pane";


#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub session_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_script: Option<PathBuf>,
    #[serde(default)]
    pub windows: Vec<WindowConfig>,
}


#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_directory: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, OptionValue>,
    #[serde(default)]
    pub panes: Vec<PaneConfig>,
}


#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawPane", into = "RawPane")]
pub struct PaneConfig {
    pub start_directory: Option<PathBuf>,
    pub focus: Option<bool>,
    pub shell_command: Vec<String>,
}


/// A window option value as written in a workspace file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Text(String),
}


impl WorkspaceConfig {
    /// True when there is nothing buildable: no session name, no windows, or
    /// a window without panes.
    pub fn is_empty(&self) -> bool {
        self.session_name.trim().is_empty()
            || self.windows.is_empty()
            || self.windows.iter().any(|w| w.panes.is_empty())
    }

    pub fn from_yaml_str(input: &str) -> Result<WorkspaceConfig, serde_yaml::Error> {
        serde_yaml::from_str(input)
    }

    pub fn from_json_str(input: &str) -> Result<WorkspaceConfig, serde_json::Error> {
        serde_json::from_str(input)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}


impl WindowConfig {
    pub fn is_focused(&self) -> bool {
        self.focus.unwrap_or(false)
    }

    /// Directory a pane starts in: the pane's own, else the window's, else
    /// whatever the multiplexer defaults to.
    pub fn pane_start_directory<'a>(&'a self, pane: &'a PaneConfig) -> Option<&'a Path> {
        pane.start_directory
            .as_deref()
            .or(self.start_directory.as_deref())
    }
}


impl PaneConfig {
    pub fn with_commands<I, S>(commands: I) -> PaneConfig
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PaneConfig {
            shell_command: commands.into_iter().map(Into::into).collect(),
            ..PaneConfig::default()
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focus.unwrap_or(false)
    }

    /// A pane with nothing to replay.
    pub fn is_blank(&self) -> bool {
        self.start_directory.is_none() && self.focus.is_none() && self.shell_command.is_empty()
    }
}


impl OptionValue {
    /// Render as a tmux option argument (`on`/`off` for booleans).
    pub fn to_tmux_arg(&self) -> String {
        match self {
            OptionValue::Bool(true) => "on".to_string(),
            OptionValue::Bool(false) => "off".to_string(),
            OptionValue::Int(n) => n.to_string(),
            OptionValue::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_tmux_arg())
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}


// ---------------------------------------------------------------------------
// Pane wire shape
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawPane {
    Placeholder(Option<String>),
    Full(PaneFields),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PaneFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_directory: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    focus: Option<bool>,
    #[serde(default)]
    shell_command: Vec<String>,
}

impl TryFrom<RawPane> for PaneConfig {
    type Error = String;

    fn try_from(raw: RawPane) -> Result<Self, Self::Error> {
        match raw {
            RawPane::Placeholder(None) => Ok(PaneConfig::default()),
            RawPane::Placeholder(Some(s)) if s == BLANK_PANE => Ok(PaneConfig::default()),
            RawPane::Placeholder(Some(s)) => Err(format!(
                "pane must be a mapping or '{}', got '{}'",
                BLANK_PANE, s
            )),
            RawPane::Full(fields) => Ok(PaneConfig {
                start_directory: fields.start_directory,
                focus: fields.focus,
                shell_command: fields.shell_command,
            }),
        }
    }
}

impl From<PaneConfig> for RawPane {
    fn from(pane: PaneConfig) -> Self {
        if pane.is_blank() {
            return RawPane::Placeholder(Some(BLANK_PANE.to_string()));
        }
        RawPane::Full(PaneFields {
            start_directory: pane.start_directory,
            focus: pane.focus,
            shell_command: pane.shell_command,
        })
    }
}


// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// On-disk workspace file format, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceFormat {
    Yaml,
    Json,
}

impl WorkspaceFormat {
    pub fn from_path(path: &Path) -> Option<WorkspaceFormat> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(WorkspaceFormat::Yaml),
            "json" => Some(WorkspaceFormat::Json),
            _ => None,
        }
    }
}


/// Read a workspace file as YAML or JSON depending on its extension.
pub fn load_workspace(path: &Path) -> Result<WorkspaceConfig, ConfigError> {
    let format = WorkspaceFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = match format {
        WorkspaceFormat::Yaml => {
            WorkspaceConfig::from_yaml_str(&contents).map_err(|e| e.to_string())
        }
        WorkspaceFormat::Json => {
            WorkspaceConfig::from_json_str(&contents).map_err(|e| e.to_string())
        }
    };
    parsed.map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}
