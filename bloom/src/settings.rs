//! User settings from ~/.bloom/settings.toml and the environment

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable pointing at an alternative settings file
pub const SETTINGS_ENV: &str = "BLOOM_SETTINGS";

const STORE_ENV: &str = "BLOOM_STORE";
const TEMP_DIR_ENV: &str = "BLOOM_TEMP_DIR";
const BASE_URL_ENV: &str = "BLOOM_BASE_URL_PATH";
const HOST_ENV: &str = "BLOOM_HOST";
const USER_ENV: &str = "BLOOM_USER";
const BASE_DIR_ENV: &str = "BLOOM_BASE_DIR";
const HEXO_PROJECT_ENV: &str = "BLOOM_HEXO_PROJECT";

/// Everything bloom needs to know about the machine it runs on
///
/// Built once in `main` and passed down to the commands. Every value is
/// optional; the accessors report which key and variable to set when a
/// command needs one that is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding one sub-directory per article
    pub store: Option<PathBuf>,

    /// Where the zhihu platform drops its output
    pub temp_dir: Option<PathBuf>,

    pub image: ImageSettings,

    pub upload: UploadSettings,

    pub hexo: HexoSettings,
}

/// The `[image]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// URL under which uploaded images are served, one directory per article
    pub base_url: Option<String>,
}

/// The `[upload]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Image server reachable over ssh
    pub host: Option<String>,

    /// Login on the image server
    pub user: Option<String>,

    /// Directory on the image server that `base_url` maps to
    pub base_dir: Option<String>,
}

/// The `[hexo]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HexoSettings {
    /// Root of the hexo blog project
    pub project: Option<PathBuf>,
}

impl Settings {
    /// Load settings from the settings file and the process environment
    ///
    /// The file is `$BLOOM_SETTINGS` when set, `~/.bloom/settings.toml`
    /// otherwise. A missing file is not an error.
    ///
    /// # Returns
    /// * `Ok(Settings)` - Settings with environment overrides applied
    /// * `Err(SettingsError)` - The settings file exists but cannot be read or parsed
    pub fn load() -> Result<Self, SettingsError> {
        let path = env::var_os(SETTINGS_ENV)
            .map(PathBuf::from)
            .or_else(default_settings_path);

        let mut settings = match path {
            Some(path) if path.is_file() => {
                log::debug!("Reading settings from {}", path.display());
                Self::from_file(&path)?
            }
            _ => Self::default(),
        };
        settings.apply_overrides(|key| env::var(key).ok().filter(|value| !value.is_empty()));
        Ok(settings)
    }

    /// Parse a settings file without looking at the environment
    ///
    /// # Parameters
    /// * `path` - Path to a settings.toml file
    ///
    /// # Returns
    /// * `Ok(Settings)` - Parsed settings
    /// * `Err(SettingsError)` - Error reading or parsing the file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Replace values with those found by `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(STORE_ENV) {
            self.store = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(TEMP_DIR_ENV) {
            self.temp_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(BASE_URL_ENV) {
            self.image.base_url = Some(value);
        }
        if let Some(value) = lookup(HOST_ENV) {
            self.upload.host = Some(value);
        }
        if let Some(value) = lookup(USER_ENV) {
            self.upload.user = Some(value);
        }
        if let Some(value) = lookup(BASE_DIR_ENV) {
            self.upload.base_dir = Some(value);
        }
        if let Some(value) = lookup(HEXO_PROJECT_ENV) {
            self.hexo.project = Some(PathBuf::from(value));
        }
    }

    pub fn store(&self) -> Result<&Path, SettingsError> {
        required(self.store.as_deref(), "store", STORE_ENV)
    }

    /// Output directory for temp-file publishing, the system temp dir by default
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(env::temp_dir)
    }

    pub fn image_base_url(&self) -> Result<&str, SettingsError> {
        required(self.image.base_url.as_deref(), "image.base_url", BASE_URL_ENV)
    }

    pub fn upload_host(&self) -> Result<&str, SettingsError> {
        required(self.upload.host.as_deref(), "upload.host", HOST_ENV)
    }

    pub fn upload_user(&self) -> Result<&str, SettingsError> {
        required(self.upload.user.as_deref(), "upload.user", USER_ENV)
    }

    pub fn upload_base_dir(&self) -> Result<&str, SettingsError> {
        required(self.upload.base_dir.as_deref(), "upload.base_dir", BASE_DIR_ENV)
    }

    pub fn hexo_project(&self) -> Result<&Path, SettingsError> {
        required(self.hexo.project.as_deref(), "hexo.project", HEXO_PROJECT_ENV)
    }
}

fn default_settings_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(".bloom").join("settings.toml"))
}

fn required<'a, T: ?Sized>(
    value: Option<&'a T>,
    key: &'static str,
    env: &'static str,
) -> Result<&'a T, SettingsError> {
    value.ok_or(SettingsError::Missing { key, env })
}

/// Errors that can occur when reading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Setting `{key}' is not configured (set it in settings.toml or via {env})")]
    Missing {
        key: &'static str,
        env: &'static str,
    },
}
