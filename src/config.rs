use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "ssh-connect";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub ssh_file_config: String,
    /// Directory whose keys replace every `IdentityFile` path when connecting.
    pub key_dir: Option<String>,
    /// User for `ssh-copy-id` when the host block has no `User`.
    pub default_user: String,
    /// How long the "Connecting to ..." message stays up before ssh takes over.
    pub connect_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ssh_file_config: "~/.ssh/config".to_string(),
            key_dir: None,
            default_user: "root".to_string(),
            connect_delay_ms: 800,
        }
    }
}

/// Effective settings after merging the config file with command-line flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub ssh_config_path: PathBuf,
    pub key_dir: Option<PathBuf>,
    pub default_user: String,
    pub connect_delay_ms: u64,
}

impl Settings {
    pub fn resolve(
        app_config: &AppConfig,
        config_flag: Option<&Path>,
        key_dir_flag: Option<&Path>,
    ) -> Self {
        let ssh_config_path = match config_flag {
            Some(p) => expand_tilde(&p.to_string_lossy()),
            None => expand_tilde(&app_config.ssh_file_config),
        };
        let key_dir = match key_dir_flag {
            Some(p) => Some(expand_tilde(&p.to_string_lossy())),
            None => app_config.key_dir.as_deref().map(expand_tilde),
        };

        Self {
            ssh_config_path,
            key_dir,
            default_user: app_config.default_user.clone(),
            connect_delay_ms: app_config.connect_delay_ms,
        }
    }

    /// Directory the key picker lists: the configured key dir, else `~/.ssh`.
    pub fn key_search_dir(&self) -> Option<PathBuf> {
        self.key_dir.clone().or_else(default_ssh_dir)
    }
}

#[derive(Debug)]
pub struct ConfigManager {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join(APP_NAME);
        Ok(Self::with_dir(config_dir))
    }

    pub fn with_dir(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join(format!("{APP_NAME}.toml"));
        Self {
            config_dir,
            config_file,
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.config_dir.join("logs")
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        // If config file doesn't exist, create it with default values
        if !self.config_file.exists() {
            let default_config = AppConfig::default();
            self.save_config(&default_config)?;
        }

        let content: String =
            fs::read_to_string(&self.config_file).context("Failed to read config file")?;

        let config: AppConfig = toml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir).context("Failed to create config directory")?;
        }
        let toml = toml::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.config_file, toml).context("Failed to write config file")?;
        Ok(())
    }
}

pub fn default_ssh_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ssh"))
}

pub fn default_ssh_config_path() -> Option<PathBuf> {
    default_ssh_dir().map(|dir| dir.join("config"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Create `~/.ssh` (0700) and an empty `~/.ssh/config` (0600) when they are missing.
pub fn ensure_ssh_config(config_path: &Path) -> Result<()> {
    if let Some(ssh_dir) = config_path.parent() {
        if !ssh_dir.exists() {
            tracing::info!("Creating directory {:?}", ssh_dir);
            fs::create_dir_all(ssh_dir)
                .with_context(|| format!("Failed to create {}", ssh_dir.display()))?;
            set_mode(ssh_dir, 0o700)?;
        }
    }

    if !config_path.exists() {
        tracing::info!("Creating file {:?}", config_path);
        fs::write(config_path, "# SSH client configuration\n")
            .with_context(|| format!("Failed to create {}", config_path.display()))?;
        set_mode(config_path, 0o600)?;
    }

    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("Failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
