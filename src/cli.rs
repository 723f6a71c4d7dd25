// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands, the console grammar, and their mapping to intents.

use crate::output::OutputMode;
use clap::{Parser, Subcommand};
use dockpanel::config::Defaults;
use dockpanel::dispatch::{Intent, SHELL_PROBE_COMMAND};
use dockpanel::types::ContainerId;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dockpanel")]
#[command(about = "Control Docker containers and images over the Engine API or SSH")]
#[command(version)]
pub struct Cli {
    /// Config file (default: dockpanel.yml in the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Engine API endpoint, e.g. tcp://localhost:2375
    #[arg(long, global = true, value_name = "URI", conflicts_with = "ssh")]
    pub host: Option<String>,

    /// Use the SSH shell backend
    #[arg(long, global = true, value_name = "[USER@]HOST[:PORT]")]
    pub ssh: Option<String>,

    /// SSH password (overrides the config file)
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputMode::Normal)]
    pub output: OutputMode,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Create a dockpanel.yml template
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// List containers, optionally filtered by name
    Ps {
        /// Case-insensitive substring of the container name
        filter: Option<String>,

        /// Hide stopped containers
        #[arg(long)]
        running: bool,
    },

    /// Start a container
    Start { id: String },

    /// Stop a container
    Stop { id: String },

    /// Restart a container
    Restart { id: String },

    /// Force-remove a container
    Rm { id: String },

    /// Create and start a detached container
    Run {
        /// Image to run (default from config)
        image: Option<String>,

        /// Command to run (default from config)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// List images, optionally filtered by tag
    Images {
        /// Case-sensitive substring of any tag
        filter: Option<String>,
    },

    /// Pull an image
    Pull {
        /// Image reference (default from config)
        reference: Option<String>,
    },

    /// Force-remove an image
    Rmi { image: String },

    /// Show one memory and CPU sample for a container
    Stats { id: String },

    /// Show the last lines of a container's output
    Logs {
        id: String,

        /// Number of lines (default from config)
        #[arg(long)]
        tail: Option<u64>,

        /// Write the lines to a file instead (default: <ID>_logs.txt)
        #[arg(long, value_name = "PATH")]
        save: Option<Option<PathBuf>>,
    },

    /// Run a command inside a running container
    Exec {
        id: String,

        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Check the SSH backend by listing remote containers
    SshTest,

    /// Run a command on the SSH host
    Sh {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Read commands from stdin, one per line, over one connection
    Console,
}

impl Commands {
    /// The intent this command dispatches. `None` for commands that are
    /// handled locally.
    pub fn to_intent(&self, defaults: &Defaults) -> Option<Intent> {
        let intent = match self {
            Commands::Init { .. } | Commands::Console => return None,
            Commands::Ps { filter, running } => Intent::ListContainers {
                filter: filter.clone().unwrap_or_default(),
                include_stopped: !running,
            },
            Commands::Start { id } => Intent::Start {
                id: ContainerId::new(id),
            },
            Commands::Stop { id } => Intent::Stop {
                id: ContainerId::new(id),
            },
            Commands::Restart { id } => Intent::Restart {
                id: ContainerId::new(id),
            },
            Commands::Rm { id } => Intent::remove(ContainerId::new(id)),
            Commands::Run { image, command } => Intent::CreateAndRun {
                image: image.clone().unwrap_or_else(|| defaults.run_image.clone()),
                command: Some(if command.is_empty() {
                    defaults.run_command.clone()
                } else {
                    shell_words::join(command)
                }),
            },
            Commands::Images { filter } => Intent::ListImages {
                filter: filter.clone().unwrap_or_default(),
            },
            Commands::Pull { reference } => Intent::PullImage {
                reference: reference
                    .clone()
                    .unwrap_or_else(|| defaults.pull_image.clone()),
            },
            Commands::Rmi { image } => Intent::remove_image(image),
            Commands::Stats { id } => Intent::FetchStats {
                id: ContainerId::new(id),
            },
            Commands::Logs { id, tail, .. } => Intent::TailLogs {
                id: ContainerId::new(id),
                lines: tail.unwrap_or(defaults.log_tail),
            },
            Commands::Exec { id, command } => Intent::ExecInContainer {
                id: ContainerId::new(id),
                command: shell_words::join(command),
            },
            Commands::SshTest => Intent::RemoteCommand {
                command: SHELL_PROBE_COMMAND.to_string(),
            },
            Commands::Sh { command } => Intent::RemoteCommand {
                command: command.join(" "),
            },
        };
        Some(intent)
    }

    /// Where `logs --save` should write, if it was given.
    pub fn log_file(&self) -> Option<PathBuf> {
        match self {
            Commands::Logs {
                id,
                save: Some(path),
                ..
            } => Some(
                path.clone()
                    .unwrap_or_else(|| PathBuf::from(format!("{id}_logs.txt"))),
            ),
            _ => None,
        }
    }
}

/// One line typed into `dockpanel console`.
#[derive(Parser)]
#[command(name = "console", no_binary_name = true, disable_version_flag = true)]
pub struct ConsoleLine {
    #[command(subcommand)]
    pub command: ConsoleCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConsoleCommand {
    /// Switch to an engine endpoint (reuses a cached client)
    Connect {
        /// Engine URI (default from --host or config)
        uri: Option<String>,
    },

    /// Switch to the SSH shell backend
    ConnectSsh {
        /// [USER@]HOST[:PORT] (default from --ssh or config)
        target: Option<String>,
    },

    /// Drop the active connection
    Disconnect,

    /// Leave the console
    #[command(alias = "quit")]
    Exit,

    #[command(flatten)]
    Panel(Commands),
}

impl ConsoleLine {
    /// Parse a line with shell quoting rules.
    pub fn parse_line(line: &str) -> Result<Self, String> {
        let words = shell_words::split(line).map_err(|e| e.to_string())?;
        ConsoleLine::try_parse_from(words).map_err(|e| e.render().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(args: &[&str]) -> Option<Intent> {
        let cli = Cli::try_parse_from(std::iter::once("dockpanel").chain(args.iter().copied()))
            .unwrap();
        cli.command.to_intent(&Defaults::default())
    }

    #[test]
    fn ps_lists_all_containers_by_default() {
        assert_eq!(
            intent(&["ps"]),
            Some(Intent::ListContainers {
                filter: String::new(),
                include_stopped: true
            })
        );
        assert_eq!(
            intent(&["ps", "web", "--running"]),
            Some(Intent::ListContainers {
                filter: "web".into(),
                include_stopped: false
            })
        );
    }

    #[test]
    fn run_uses_configured_defaults() {
        assert_eq!(
            intent(&["run"]),
            Some(Intent::CreateAndRun {
                image: "alpine:latest".into(),
                command: Some("echo Hello from Docker".into())
            })
        );
        assert_eq!(
            intent(&["run", "busybox", "sh", "-c", "echo hi; sleep 1"]),
            Some(Intent::CreateAndRun {
                image: "busybox".into(),
                command: Some("sh -c 'echo hi; sleep 1'".into())
            })
        );
    }

    #[test]
    fn logs_default_to_config_tail() {
        assert_eq!(
            intent(&["logs", "abc"]),
            Some(Intent::TailLogs {
                id: ContainerId::new("abc"),
                lines: 50
            })
        );
        assert_eq!(
            intent(&["logs", "abc", "--tail", "5"]),
            Some(Intent::TailLogs {
                id: ContainerId::new("abc"),
                lines: 5
            })
        );
    }

    #[test]
    fn logs_save_defaults_to_id_file_name() {
        let file = |args: &[&str]| {
            Cli::try_parse_from(std::iter::once("dockpanel").chain(args.iter().copied()))
                .unwrap()
                .command
                .log_file()
        };

        assert_eq!(file(&["logs", "abc"]), None);
        assert_eq!(
            file(&["logs", "abc", "--save"]),
            Some(PathBuf::from("abc_logs.txt"))
        );
        assert_eq!(
            file(&["logs", "abc", "--save", "out/web.log", "--tail", "5"]),
            Some(PathBuf::from("out/web.log"))
        );
        assert_eq!(file(&["ps"]), None);
        // Saving does not change what is fetched.
        assert_eq!(
            intent(&["logs", "abc", "--save"]),
            Some(Intent::TailLogs {
                id: ContainerId::new("abc"),
                lines: 50
            })
        );
    }

    #[test]
    fn shell_commands_become_remote_commands() {
        assert_eq!(
            intent(&["ssh-test"]),
            Some(Intent::RemoteCommand {
                command: "docker ps -a".into()
            })
        );
        assert_eq!(
            intent(&["sh", "uptime", "-p"]),
            Some(Intent::RemoteCommand {
                command: "uptime -p".into()
            })
        );
    }

    #[test]
    fn local_commands_have_no_intent() {
        assert_eq!(intent(&["init"]), None);
        assert_eq!(intent(&["console"]), None);
    }

    #[test]
    fn host_and_ssh_conflict() {
        assert!(
            Cli::try_parse_from(["dockpanel", "--host", "tcp://a:2375", "--ssh", "b", "ps"])
                .is_err()
        );
    }

    #[test]
    fn console_parses_quoted_lines() {
        let line = ConsoleLine::parse_line("exec abc sh -c 'ls /tmp'").unwrap();
        match line.command {
            ConsoleCommand::Panel(Commands::Exec { id, command }) => {
                assert_eq!(id, "abc");
                assert_eq!(command, vec!["sh", "-c", "ls /tmp"]);
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(
            ConsoleLine::parse_line("quit").unwrap().command,
            ConsoleCommand::Exit
        ));
        assert!(matches!(
            ConsoleLine::parse_line("connect tcp://10.0.0.2:2375").unwrap().command,
            ConsoleCommand::Connect { uri: Some(_) }
        ));
        assert!(ConsoleLine::parse_line("frobnicate").is_err());
        assert!(ConsoleLine::parse_line("logs 'unterminated").is_err());
    }
}
