use std::fs;
use std::path::Path;

use crate::command::{Command, FreezeFormat};
use crate::error::MuxError;
use crate::infrastructure::tmux::Tmux;
use crate::infrastructure::Multiplexer;
use crate::response::Response;
use crate::types::config::Settings;
use crate::types::session::SessionInfo;
use crate::types::workspace::load_workspace;
use crate::workspace::{freeze, SessionSource, WorkspaceBuilder};


/// Central runtime for muxspace. Dispatches commands against a multiplexer.
pub struct Sys<M: Multiplexer> {
    mux: M,
    settings: Settings,
}


impl Sys<Tmux> {
    /// Runtime backed by the tmux executable named in `settings`.
    pub fn tmux(settings: Settings) -> Sys<Tmux> {
        let mux = Tmux::new(&settings.tmux);
        Sys::new(mux, settings)
    }
}


impl<M: Multiplexer> Sys<M> {
    pub fn new(mux: M, settings: Settings) -> Sys<M> {
        Sys { mux, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The single dispatch method.
    pub fn execute(&mut self, cmd: Command) -> Response {
        match cmd {
            Command::Load { path, session } => self.cmd_load(&path, session.as_deref()),
            Command::Freeze {
                session,
                format,
                output,
            } => self.cmd_freeze(&session, format, output.as_deref()),
            Command::SessionList => self.cmd_session_list(),
        }
    }

    fn cmd_load(&mut self, path: &str, existing: Option<&str>) -> Response {
        let config = match load_workspace(Path::new(path)) {
            Ok(config) => config,
            Err(e) => return Response::error(e),
        };
        let source = match existing {
            Some(name) => match self.find_session(name) {
                Ok(Some(session)) => SessionSource::Existing(session),
                Ok(None) => return Response::error(format!("no session named '{}'", name)),
                Err(e) => return Response::error(e),
            },
            None => SessionSource::Create,
        };
        let builder = match WorkspaceBuilder::new(config) {
            Ok(builder) => builder
                .with_source(source)
                .with_settings(self.settings.build.clone()),
            Err(e) => return Response::error(e),
        };
        match builder.build(&mut self.mux) {
            Ok(session) => Response::ok(format!("Session '{}' ready", session.name)),
            Err(e) => Response::error(e),
        }
    }

    fn cmd_freeze(&mut self, name: &str, format: FreezeFormat, output: Option<&str>) -> Response {
        let session = match self.find_session(name) {
            Ok(Some(session)) => session,
            Ok(None) => return Response::error(format!("no session named '{}'", name)),
            Err(e) => return Response::error(e),
        };
        let config = match freeze(&mut self.mux, &session, &self.settings.freeze) {
            Ok(config) => config,
            Err(e) => return Response::error(e),
        };
        let text = match format {
            FreezeFormat::Yaml => config.to_yaml(),
            FreezeFormat::Json => config.to_json(),
        };
        let text = match text {
            Ok(text) => text,
            Err(e) => return Response::error(e),
        };
        match output {
            Some(path) => match fs::write(path, &text) {
                Ok(()) => Response::ok(format!("Froze '{}' to {}", name, path)),
                Err(e) => Response::error(format!("failed to write {}: {}", path, e)),
            },
            None => Response::ok(text),
        }
    }

    fn cmd_session_list(&mut self) -> Response {
        match self.mux.list_sessions() {
            Ok(sessions) => {
                let json_array: Vec<serde_json::Value> = sessions
                    .into_iter()
                    .map(|s| serde_json::json!({ "name": s.name, "id": s.id }))
                    .collect();
                Response::ok(serde_json::Value::Array(json_array).to_string())
            }
            Err(e) => Response::error(e),
        }
    }

    fn find_session(&mut self, name: &str) -> Result<Option<SessionInfo>, MuxError> {
        Ok(self
            .mux
            .list_sessions()?
            .into_iter()
            .find(|s| s.name == name))
    }
}
