//! Command — the typed interface for all muxspace operations.

use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command")]
pub enum Command {
    /// Build the workspace described by the file at `path`. With `session`,
    /// build into that existing session instead of creating one.
    #[serde(rename = "load")]
    Load {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session: Option<String>,
    },

    /// Capture a live session as a workspace file.
    #[serde(rename = "freeze")]
    Freeze {
        session: String,
        #[serde(default)]
        format: FreezeFormat,
        /// Write here instead of returning the text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<String>,
    },

    #[serde(rename = "session.list")]
    SessionList,
}


#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FreezeFormat {
    #[default]
    Yaml,
    Json,
}
