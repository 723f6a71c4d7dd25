// ABOUTME: Entry point for the dockpanel CLI application.
// ABOUTME: Parses arguments, connects the chosen backend, and dispatches intents.

mod cli;
mod output;

use clap::Parser;
use cli::{Cli, Commands, ConsoleCommand, ConsoleLine};
use dockpanel::config::{self, Config, EnvValue, SshConfig};
use dockpanel::connector::{Backend, Connector};
use dockpanel::dispatch::{Dispatcher, Intent, Payload};
use dockpanel::error::{Error, Result};
use dockpanel::ssh::SessionConfig;
use output::{Output, OutputMode};
use std::env;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let output = Output::new(cli.output);
    if let Err(e) = run(cli, &output).await {
        match e {
            Error::Operation(ref op) => output.operation_error(op),
            ref other => output.error(&other.to_string()),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let cwd = env::current_dir()?;

    if let Commands::Init { force } = cli.command {
        let path = config::init_config(&cwd, force)?;
        output.success(&format!("Created {}", path.display()));
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::discover_or_default(&cwd)?,
    };

    let mut panel = Panel::new(&cli, config);

    if let Commands::Console = cli.command {
        return panel.console(output).await;
    }

    let Some(intent) = cli.command.to_intent(&panel.config.defaults) else {
        return Ok(());
    };

    // --ssh selects the shell backend for every command; shell-only commands
    // use it even without the flag.
    let backend = if cli.ssh.is_some() {
        Backend::Shell
    } else {
        intent.backend()
    };
    let save_to = cli.command.log_file();
    panel.connect(backend, None).await?;
    panel.execute(intent, save_to.as_deref(), output).await
}

/// A dispatcher plus the settings needed to (re)connect it.
struct Panel {
    dispatcher: Dispatcher,
    config: Config,
    host: Option<String>,
    ssh: Option<String>,
    password: Option<String>,
}

impl Panel {
    fn new(cli: &Cli, config: Config) -> Self {
        let connector = Connector::new(config.engine.timeout);
        Self {
            dispatcher: Dispatcher::new(connector),
            config,
            host: cli.host.clone(),
            ssh: cli.ssh.clone(),
            password: cli.password.clone(),
        }
    }

    fn engine_uri(&self) -> String {
        self.host
            .clone()
            .unwrap_or_else(|| self.config.engine.uri.clone())
    }

    /// Merge the file's ssh section with a command-line target and password.
    fn session_config(&self, target: Option<&str>) -> Result<SessionConfig> {
        let target = target
            .or(self.ssh.as_deref())
            .map(SshConfig::parse)
            .transpose()
            .map_err(Error::InvalidConfig)?;

        let mut ssh = match (self.config.ssh.clone(), target) {
            (Some(file), Some(target)) => file.retarget(target),
            (Some(file), None) => file,
            (None, Some(target)) => target,
            (None, None) => {
                return Err(Error::InvalidConfig(
                    "no SSH host: pass --ssh or add an ssh section to dockpanel.yml".to_string(),
                ));
            }
        };
        if let Some(password) = &self.password {
            ssh.password = Some(EnvValue::Literal(password.clone()));
        }
        ssh.session_config()
    }

    /// Connect the dispatcher to `backend`, optionally at an explicit address.
    async fn connect(&mut self, backend: Backend, address: Option<&str>) -> Result<()> {
        match backend {
            Backend::TcpApi => {
                let uri = address.map(str::to_string).unwrap_or_else(|| self.engine_uri());
                self.dispatcher.connect_tcp(&uri).await?;
            }
            Backend::Shell => {
                let session = self.session_config(address)?;
                self.dispatcher.connect_shell(session).await?;
            }
        }
        Ok(())
    }

    /// Dispatch `intent` and print the result, or write text results to `save_to`.
    async fn execute(
        &self,
        intent: Intent,
        save_to: Option<&Path>,
        output: &Output,
    ) -> Result<()> {
        let mut output_timer = Output::new(output.mode());
        if matches!(intent, Intent::PullImage { .. } | Intent::CreateAndRun { .. }) {
            output_timer.start_timer();
            if let Intent::PullImage { reference } = &intent {
                output.progress(&format!("Pulling {reference}..."));
            }
        }

        let payload = self.dispatcher.dispatch(intent).await?;
        match (save_to, &payload) {
            (Some(path), Payload::Text(text)) => {
                tokio::fs::write(path, text).await?;
                output_timer.success(&format!("Saved logs to {}", path.display()));
            }
            _ => output_timer.payload(&payload),
        }
        Ok(())
    }

    /// Run commands from stdin until EOF or `exit`.
    async fn console(&mut self, output: &Output) -> Result<()> {
        let backend = if self.ssh.is_some() {
            Backend::Shell
        } else {
            Backend::TcpApi
        };
        // A failed first connect is reported but leaves the console usable.
        if let Err(e) = self.connect(backend, None).await {
            output.error(&e.to_string());
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            if output.mode() == OutputMode::Normal {
                print!("dockpanel> ");
                std::io::stdout().flush()?;
            }

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parsed = match ConsoleLine::parse_line(line) {
                Ok(parsed) => parsed,
                Err(message) => {
                    eprint!("{message}");
                    continue;
                }
            };

            match parsed.command {
                ConsoleCommand::Exit => break,
                ConsoleCommand::Disconnect => self.dispatcher.disconnect(),
                ConsoleCommand::Connect { uri } => {
                    match self.connect(Backend::TcpApi, uri.as_deref()).await {
                        Ok(()) => output.success("Connected to Docker engine"),
                        Err(e) => output.error(&e.to_string()),
                    }
                }
                ConsoleCommand::ConnectSsh { target } => {
                    match self.connect(Backend::Shell, target.as_deref()).await {
                        Ok(()) => output.success("Connected over SSH"),
                        Err(e) => output.error(&e.to_string()),
                    }
                }
                ConsoleCommand::Panel(command) => {
                    let Some(intent) = command.to_intent(&self.config.defaults) else {
                        output.error("init and console are not available inside the console");
                        continue;
                    };
                    let refresh = intent.is_mutating() && output.mode() == OutputMode::Normal;
                    let save_to = command.log_file();
                    match self.execute(intent, save_to.as_deref(), output).await {
                        Ok(()) if refresh => {
                            // Show the effect of a state change, like the panel's container list.
                            if let Ok(listing) =
                                self.dispatcher.dispatch(Intent::list_containers("")).await
                            {
                                output.payload(&listing);
                            }
                        }
                        Ok(()) => {}
                        Err(Error::Operation(e)) => output.operation_error(&e),
                        Err(e) => output.error(&e.to_string()),
                    }
                }
            }
        }
        Ok(())
    }
}
