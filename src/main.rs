use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use crossterm::event::EventStream;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{ExitCode, ExitStatus};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

mod app;
mod config;
mod error;
mod models;
mod signals;
mod ssh_config;
mod ssh_service;
mod tui;
mod ui;

use app::{run_menu, App, MenuOutcome};
use config::{default_ssh_config_path, ensure_ssh_config, ConfigManager, Settings};
use error::Error;
use signals::{ProcessSignal, Signals};
use ssh_config::parse_ssh_config;
use ssh_service::{connect_direct, connect_to_host, copy_key_to_host, Launcher, SystemLauncher};
use tui::Tui;

/// Pick a host from your SSH config and connect to it
#[derive(Parser, Debug)]
#[command(name = "ssh-connect", version, about)]
struct Cli {
    /// SSH config file to read instead of ~/.ssh/config
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory whose keys replace every IdentityFile path when connecting
    #[arg(short, long, value_name = "DIR")]
    key_dir: Option<PathBuf>,

    /// Connect to this host alias directly, without the menu
    host: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:?}", err);
            match err.downcast_ref::<Error>() {
                Some(e) => {
                    eprintln!("{e}");
                    match e {
                        Error::Interrupted(caught) => ExitCode::from(caught.exit_code()),
                        _ => ExitCode::FAILURE,
                    }
                }
                None => {
                    eprintln!("Error: {err:#}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_manager = ConfigManager::new()?;
    init_logging(&config_manager.log_dir())?;
    debug!("Starting with {:?}", cli);

    let app_config = config_manager.load_config()?;
    let settings = Settings::resolve(&app_config, cli.config.as_deref(), cli.key_dir.as_deref());
    tracing::info!("SSH config path: {:?}", settings.ssh_config_path);
    check_paths(&settings)?;

    let launcher = SystemLauncher;
    match cli.host {
        Some(alias) => connect_direct(&launcher, &settings, &alias).await,
        None => run_interactive(&launcher, &settings).await,
    }
}

fn init_logging(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join(format!(
        "ssh-connect_{}.log",
        Local::now().format("%Y%m%d_%H%M%S")
    ));
    let file = File::create(&log_file).context("Failed to create log file")?;

    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ssh_connect=debug".parse()?))
        .with_ansi(false)
        .with_writer(file)
        .init();

    Ok(())
}

/// The default `~/.ssh/config` is created when missing; any other path must exist.
fn check_paths(settings: &Settings) -> Result<()> {
    let path = &settings.ssh_config_path;
    if !path.exists() {
        if Some(path) == default_ssh_config_path().as_ref() {
            ensure_ssh_config(path)?;
        } else {
            return Err(Error::ConfigNotFound(path.clone()).into());
        }
    }

    if let Some(key_dir) = &settings.key_dir {
        if !key_dir.is_dir() {
            return Err(Error::KeyDirNotFound(key_dir.clone()).into());
        }
    }

    Ok(())
}

/// Menu, child process, menu again. The config is re-read on every round.
async fn run_interactive<L: Launcher>(launcher: &L, settings: &Settings) -> Result<()> {
    tui::install_panic_hook();
    let mut status_message = None;

    loop {
        let parsed = parse_ssh_config(&settings.ssh_config_path)?;
        if parsed.is_empty() {
            return Err(Error::NoHostsParsed(settings.ssh_config_path.clone()).into());
        }

        let mut app =
            App::new(parsed.hosts, settings.key_search_dir()).with_status(status_message.take());
        let outcome = {
            let mut signals = Signals::new().context("Failed to register signal handlers")?;
            let mut tui = Tui::enter()?;
            let mut events = EventStream::new();
            run_menu(&mut *tui, &mut app, &mut events, signals.recv()).await?
        };

        let (action, alias, result) = match outcome {
            MenuOutcome::Quit => return Ok(()),
            MenuOutcome::Connect(host) => {
                let result = connect_to_host(launcher, settings, &host).await;
                ("SSH session", host.alias, result)
            }
            MenuOutcome::CopyKey { host, key } => {
                let result = copy_key_to_host(launcher, settings, &host, &key).await;
                ("Key copy", host.alias, result)
            }
        };
        if let Some(caught) = stops_program(&result) {
            return Err(Error::Interrupted(caught).into());
        }
        status_message = Some(describe(action, &alias, result));
    }
}

/// SIGINT only cancels the current action; SIGTERM and SIGHUP end the program.
fn stops_program(result: &Result<ExitStatus>) -> Option<ProcessSignal> {
    match result.as_ref().err()?.downcast_ref::<Error>()? {
        Error::Interrupted(ProcessSignal::Interrupt) => None,
        Error::Interrupted(caught) => Some(*caught),
        _ => None,
    }
}

fn describe(action: &str, alias: &str, result: Result<ExitStatus>) -> String {
    match result {
        Ok(status) if status.success() => format!("{action} with {alias} ended"),
        Ok(status) => format!("{action} with {alias} failed: {status}"),
        Err(e) if matches!(e.downcast_ref::<Error>(), Some(Error::Interrupted(_))) => {
            format!("{action} with {alias} cancelled")
        }
        Err(e) => {
            tracing::error!("{} with {} failed: {:?}", action, alias, e);
            format!("Error: {e:#}")
        }
    }
}
