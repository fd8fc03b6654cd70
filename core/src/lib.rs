//! muxspace-core — build tmux workspaces from declarative config and freeze
//! live sessions back into config.
//!
//! - [`workspace`]: the builder, freeze, and before-script runner
//! - [`infrastructure`]: the `Multiplexer` control surface and its tmux
//!   implementation
//! - [`types`]: workspace config, live session snapshots, settings
//! - [`command`], [`sys`], [`response`]: typed commands and their dispatcher

pub mod command;
pub mod error;
pub mod infrastructure;
pub mod response;
pub mod sys;
pub mod types;
pub mod workspace;

pub use error::{BuildError, ConfigError, MuxError, ScriptError};
pub use infrastructure::Multiplexer;
pub use types::workspace::{PaneConfig, WindowConfig, WorkspaceConfig};
pub use workspace::{freeze, SessionSource, WorkspaceBuilder};
