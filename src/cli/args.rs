//! CLI argument definitions
//!
//! Global CLI options and configuration merging logic.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::cache::CacheBackend;
use crate::config::{Config, ConfigColorMode, ConfigSortOrder};

use super::commands::Commands;

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq)]
pub(crate) enum SortOrder {
    /// Oldest first (default)
    #[default]
    Asc,
    /// Newest first
    Desc,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq)]
pub(crate) enum ColorMode {
    /// Auto-detect based on terminal (default)
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Parser)]
#[command(name = "profitstats")]
#[command(about = "Daily profit timelines for a WooCommerce shop", version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,

    /// Config file (skips the default search)
    #[arg(long, global = true, value_name = "FILE")]
    pub(crate) config: Option<PathBuf>,

    /// Order export (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub(crate) orders: Option<PathBuf>,

    /// Product export with cost meta (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub(crate) products: Option<PathBuf>,

    /// Overhead settings (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub(crate) settings: Option<PathBuf>,

    /// Report cache location
    #[arg(long, global = true, value_name = "PATH")]
    pub(crate) cache: Option<PathBuf>,

    /// Report cache backend
    #[arg(long, global = true, value_enum)]
    pub(crate) backend: Option<CacheBackend>,

    /// Show from date (YYYYMMDD or YYYY-MM-DD)
    #[arg(short, long, global = true)]
    pub(crate) since: Option<String>,

    /// Show until date (YYYYMMDD or YYYY-MM-DD)
    #[arg(short, long, global = true)]
    pub(crate) until: Option<String>,

    /// Page to show (1-based)
    #[arg(short, long, global = true, default_value_t = 1)]
    pub(crate) page: usize,

    /// Rows per page
    #[arg(long, global = true)]
    pub(crate) per_page: Option<usize>,

    /// Output as JSON
    #[arg(short, long, global = true, conflicts_with = "csv")]
    pub(crate) json: bool,

    /// Output as CSV
    #[arg(long, global = true)]
    pub(crate) csv: bool,

    /// Sort order for results
    #[arg(short, long, global = true, value_enum, default_value = "asc")]
    pub(crate) order: SortOrder,

    /// Color output mode
    #[arg(long, global = true, value_enum, default_value = "auto")]
    pub(crate) color: ColorMode,

    /// Disable colored output (shorthand for --color=never)
    #[arg(long, global = true)]
    pub(crate) no_color: bool,

    /// Timezone deciding which day is "today" (e.g., "Europe/Berlin", "UTC")
    #[arg(long, global = true, value_name = "TZ")]
    pub(crate) timezone: Option<String>,

    /// Enable debug output (show processing details)
    #[arg(long, global = true)]
    pub(crate) debug: bool,
}

impl Cli {
    /// Merge config file values into CLI (CLI args take precedence)
    pub(crate) fn with_config(mut self, config: &Config) -> Self {
        // For boolean flags, config only applies if CLI is false (default)
        if !self.no_color && config.no_color {
            self.no_color = true;
        }
        if !self.debug && config.debug {
            self.debug = true;
        }

        // For enum values, apply config only if CLI is at default
        if self.order == SortOrder::Asc
            && let Some(ConfigSortOrder::Desc) = config.order
        {
            self.order = SortOrder::Desc;
        }
        if self.color == ColorMode::Auto {
            match config.color {
                Some(ConfigColorMode::Always) => self.color = ColorMode::Always,
                Some(ConfigColorMode::Never) => self.color = ColorMode::Never,
                Some(ConfigColorMode::Auto) | None => {}
            }
        }

        // Options: only apply if CLI didn't set them
        if self.orders.is_none() {
            self.orders = config.orders_file.clone();
        }
        if self.products.is_none() {
            self.products = config.products_file.clone();
        }
        if self.settings.is_none() {
            self.settings = config.settings_file.clone();
        }
        if self.cache.is_none() {
            self.cache = config.cache_path.clone();
        }
        if self.backend.is_none() {
            self.backend = config.cache_backend;
        }
        if self.per_page.is_none() {
            self.per_page = config.per_page;
        }
        if self.timezone.is_none() {
            self.timezone = config.timezone.clone();
        }

        self
    }

    pub(crate) fn use_color(&self) -> bool {
        if self.no_color || self.is_machine_output() {
            return false;
        }
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        }
    }

    /// JSON or CSV on stdout
    pub(crate) fn is_machine_output(&self) -> bool {
        self.json || self.csv
    }
}
