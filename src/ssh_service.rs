use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;

use crate::config::{default_ssh_config_path, Settings};
use crate::error::Error;
use crate::models::HostEntry;
use crate::signals::{ProcessSignal, Signals};
use crate::ssh_config::{parse_ssh_config, write_derived_config};

/// Runs the external programs that do the real work.
pub trait Launcher {
    /// `ssh [-F config] alias`
    async fn connect(&self, config: Option<&Path>, alias: &str) -> Result<ExitStatus>;

    /// `ssh-copy-id -i key destination`
    async fn copy_id(&self, key: &Path, destination: &str) -> Result<ExitStatus>;
}

/// Spawns the real `ssh` and `ssh-copy-id` with the terminal handed over to them.
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    async fn connect(&self, config: Option<&Path>, alias: &str) -> Result<ExitStatus> {
        let mut cmd = Command::new("ssh");
        if let Some(config) = config {
            cmd.arg("-F").arg(config);
        }
        cmd.arg(alias);

        tracing::info!("Executing SSH: ssh {:?} {}", config, alias);
        run_inherited(cmd).await
    }

    async fn copy_id(&self, key: &Path, destination: &str) -> Result<ExitStatus> {
        let mut cmd = Command::new("ssh-copy-id");
        cmd.arg("-i").arg(key).arg(destination);

        tracing::info!("Executing ssh-copy-id -i {:?} {}", key, destination);
        run_inherited(cmd).await
    }
}

/// Wait for the child to exit. Ctrl+C reaches the child through the terminal,
/// so SIGINT is only logged here. SIGTERM and SIGHUP kill the child and are
/// reported once it is gone; callers get to clean up either way.
async fn run_inherited(mut cmd: Command) -> Result<ExitStatus> {
    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    let program = cmd.as_std().get_program().to_string_lossy().into_owned();

    let mut signals = Signals::new().context("Failed to register signal handlers")?;
    let mut child = cmd
        .spawn()
        .with_context(|| format!("Failed to execute {program}"))?;
    let mut stopped_by = None;

    loop {
        tokio::select! {
            status = child.wait() => {
                let status = status.with_context(|| format!("Failed to wait for {program}"))?;
                return match stopped_by {
                    Some(caught) => Err(Error::Interrupted(caught).into()),
                    None => Ok(status),
                };
            }
            caught = signals.recv() => match caught {
                ProcessSignal::Interrupt => {
                    tracing::info!("Interrupt received, waiting for {} to exit", program);
                }
                other => {
                    tracing::warn!("{} received, stopping {}", other, program);
                    stopped_by = Some(other);
                    if let Err(e) = child.start_kill() {
                        tracing::error!("Failed to kill {}: {}", program, e);
                    }
                }
            },
        }
    }
}

/// `user@hostname` for the host block, falling back to the alias and `default_user`.
pub fn copy_destination(entry: &HostEntry, default_user: &str) -> String {
    let attributes = &entry.attributes;
    let hostname = attributes
        .get_ignore_case("HostName")
        .unwrap_or(&entry.alias);
    let user = attributes.get_ignore_case("User").unwrap_or(default_user);
    format!("{user}@{hostname}")
}

/// Private keys in `dir` that have a matching `.pub` next to them, sorted.
pub fn list_key_pairs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;

    let mut keys = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() || path.extension().is_some_and(|ext| ext == "pub") {
            continue;
        }
        let mut public = path.clone().into_os_string();
        public.push(".pub");
        if Path::new(&public).is_file() {
            keys.push(path);
        }
    }
    keys.sort();
    Ok(keys)
}

/// Hand the terminal to `ssh` for `entry`. With a key directory configured,
/// ssh reads a derived config that is deleted as soon as it exits.
/// A signal during the short delay before ssh starts skips the connection.
pub async fn connect_to_host<L: Launcher>(
    launcher: &L,
    settings: &Settings,
    entry: &HostEntry,
) -> Result<ExitStatus> {
    println!("\nConnecting to host: {}...\n", entry.alias);
    let mut signals = Signals::new().context("Failed to register signal handlers")?;
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_millis(settings.connect_delay_ms)) => {}
        caught = signals.recv() => {
            tracing::info!("{} received before connecting to {}", caught, entry.alias);
            return Err(Error::Interrupted(caught).into());
        }
    }

    let derived = match &settings.key_dir {
        Some(key_dir) => Some(write_derived_config(&settings.ssh_config_path, key_dir)?),
        None => None,
    };

    let config = match &derived {
        Some(derived) => Some(derived.path()),
        None if Some(&settings.ssh_config_path) != default_ssh_config_path().as_ref() => {
            Some(settings.ssh_config_path.as_path())
        }
        None => None,
    };

    let status = launcher.connect(config, &entry.alias).await?;
    if status.success() {
        tracing::info!("SSH session for {} ended.", entry.alias);
    } else {
        tracing::error!("SSH command finished with a non-zero status: {}", status);
    }
    Ok(status)
}

pub async fn copy_key_to_host<L: Launcher>(
    launcher: &L,
    settings: &Settings,
    entry: &HostEntry,
    key: &Path,
) -> Result<ExitStatus> {
    let destination = copy_destination(entry, &settings.default_user);
    println!("\nCopying {} to {}...\n", key.display(), destination);

    let status = launcher.copy_id(key, &destination).await?;
    if !status.success() {
        tracing::error!("ssh-copy-id finished with a non-zero status: {}", status);
    }
    Ok(status)
}

/// Connect to `alias` without the menu. Nothing is spawned unless the alias exists.
pub async fn connect_direct<L: Launcher>(
    launcher: &L,
    settings: &Settings,
    alias: &str,
) -> Result<()> {
    let parsed = parse_ssh_config(&settings.ssh_config_path)?;
    if parsed.is_empty() {
        return Err(Error::NoHostsParsed(settings.ssh_config_path.clone()).into());
    }

    let Some(entry) = parsed.find(alias) else {
        tracing::warn!("Unknown host {}; known hosts: {:?}", alias, parsed.aliases());
        return Err(Error::UnknownHostAlias(alias.to_string()).into());
    };

    connect_to_host(launcher, settings, entry).await?;
    Ok(())
}
