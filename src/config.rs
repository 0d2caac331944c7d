use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::CacheBackend;
use crate::error::AppError;

const APP_DIR: &str = "profitstats";

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ConfigSortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ConfigColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) orders_file: Option<PathBuf>,
    #[serde(default)]
    pub(crate) products_file: Option<PathBuf>,
    #[serde(default)]
    pub(crate) settings_file: Option<PathBuf>,
    #[serde(default)]
    pub(crate) cache_backend: Option<CacheBackend>,
    #[serde(default)]
    pub(crate) cache_path: Option<PathBuf>,
    #[serde(default)]
    pub(crate) cache_ttl_hours: Option<u64>,
    #[serde(default)]
    pub(crate) hourly_labor_rate: Option<Decimal>,
    #[serde(default)]
    pub(crate) batch_size: Option<usize>,
    #[serde(default)]
    pub(crate) per_page: Option<usize>,
    #[serde(default)]
    pub(crate) timezone: Option<String>,
    #[serde(default)]
    pub(crate) order: Option<ConfigSortOrder>,
    #[serde(default)]
    pub(crate) color: Option<ConfigColorMode>,
    #[serde(default)]
    pub(crate) no_color: bool,
    #[serde(default)]
    pub(crate) debug: bool,

    /// File the values came from
    #[serde(skip)]
    pub(crate) path: Option<PathBuf>,
    /// Problems with searched files, reported once logging is up
    #[serde(skip)]
    pub(crate) warnings: Vec<String>,
}

impl Config {
    /// Load `explicit` if given (failures are errors), otherwise the first
    /// readable file from the search path (failures are warnings).
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self, AppError> {
        if let Some(path) = explicit {
            let content = fs::read_to_string(path).map_err(|e| AppError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            let mut config = Self::parse(&content).map_err(|message| AppError::Config {
                path: path.to_path_buf(),
                message,
            })?;
            config.path = Some(path.to_path_buf());
            return Ok(config);
        }

        let mut warnings = Vec::new();
        for path in Self::get_config_paths() {
            if path.exists()
                && let Ok(content) = fs::read_to_string(&path)
            {
                match Self::parse(&content) {
                    Ok(mut config) => {
                        config.path = Some(path);
                        config.warnings = warnings;
                        return Ok(config);
                    }
                    Err(e) => warnings.push(format!("Failed to parse {}: {e}", path.display())),
                }
            }
        }

        Ok(Self {
            warnings,
            ..Self::default()
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str::<Config>(content).map_err(|e| e.to_string())
    }

    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config: ~/.config/profitstats/config.toml (Linux/cross-platform)
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join(APP_DIR).join("config.toml"));
        }

        // 2. Platform config dir, e.g. ~/Library/Application Support/profitstats/config.toml
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join(APP_DIR).join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 3. Home directory: ~/.profitstats.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(format!(".{APP_DIR}.toml")));
        }

        paths
    }
}

/// Default location of an input document: ~/.local/share/profitstats/<name>
pub(crate) fn default_data_file(name: &str) -> PathBuf {
    dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(name)
}

/// Default snapshot location for a backend: ~/.cache/profitstats/<file>
pub(crate) fn default_cache_path(backend: CacheBackend) -> PathBuf {
    dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(backend.default_file_name())
}
