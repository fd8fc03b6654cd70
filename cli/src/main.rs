//! muxspace CLI — build tmux workspaces from files and freeze sessions back.

use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use muxspace_core::command::{Command, FreezeFormat};
use muxspace_core::response::Response;
use muxspace_core::sys::Sys;
use muxspace_core::types::config::{resolve_config_dir, Settings};


#[derive(Debug, Parser)]
#[command(name = "muxspace", version, about = "Declarative tmux workspaces")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Build a workspace from a YAML or JSON file
    Load {
        file: String,
        /// Build into this existing session instead of creating one
        #[arg(long)]
        existing: Option<String>,
    },
    /// Print a live session as a workspace file
    Freeze {
        session: String,
        /// Emit JSON instead of YAML
        #[arg(long)]
        json: bool,
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<String>,
    },
    /// List tmux sessions as JSON
    Ls,
}

impl From<CliCommand> for Command {
    fn from(cmd: CliCommand) -> Command {
        match cmd {
            CliCommand::Load { file, existing } => Command::Load {
                path: file,
                session: existing,
            },
            CliCommand::Freeze {
                session,
                json,
                output,
            } => Command::Freeze {
                session,
                format: if json { FreezeFormat::Json } else { FreezeFormat::Yaml },
                output,
            },
            CliCommand::Ls => Command::SessionList,
        }
    }
}


fn main() {
    init_tracing();
    let cli = Cli::parse();

    let config_dir = resolve_config_dir();
    let settings = match Settings::load(&config_dir) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("muxspace: {}", e);
            process::exit(1);
        }
    };

    let mut sys = Sys::tmux(settings);
    match sys.execute(cli.command.into()) {
        Response::Ok { output } => {
            if !output.is_empty() {
                println!("{}", output.trim_end());
            }
        }
        Response::Error { message } => {
            eprintln!("muxspace error: {}", message);
            process::exit(1);
        }
    }
}


/// Log to stderr, filtered by `MUXSPACE_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("MUXSPACE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
