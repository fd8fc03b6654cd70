//! Workspace translation — config to live session and back.
//!
//! The `builder` module drives a `Multiplexer` top-down to create a session
//! from a `WorkspaceConfig`. The `freeze` module walks a live session and
//! reconstructs the config. The `script` module runs a workspace's
//! `before_script`.

pub mod builder;
pub mod freeze;
pub mod script;

#[cfg(test)]
pub(crate) mod fake;

pub use builder::{SessionSource, WorkspaceBuilder};
pub use freeze::freeze;
