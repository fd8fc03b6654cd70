//! Live multiplexer objects as reported by the control surface.
//!
//! These are snapshots: they identify a session, window or pane and carry
//! the attributes read at query time. The multiplexer owns the real object.

use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Multiplexer id, e.g. `$3`.
    pub id: String,
    pub name: String,
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    /// Multiplexer id, e.g. `@7`.
    pub id: String,
    pub index: u32,
    pub name: String,
    pub layout: String,
    pub active: bool,
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneInfo {
    /// Multiplexer id, e.g. `%12`.
    pub id: String,
    pub index: u32,
    pub current_path: Option<String>,
    pub current_command: Option<String>,
    pub active: bool,
}


/// Arguments for creating a window inside a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewWindow {
    pub name: Option<String>,
    pub start_directory: Option<String>,
    /// Explicit index; `None` lets the multiplexer pick.
    pub index: Option<u32>,
    /// Switch the client to the new window on creation.
    pub attach: bool,
}
