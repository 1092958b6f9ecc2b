//! Scan configuration
//!
//! `ScanConfig` is the single explicit value the scan entry point and the
//! presenters read. It is built from CLI arguments and the environment
//! (`NPM_CONFIG_PREFIX`, `PREFIX`, `APPDATA`, `NO_COLOR`).

use crate::cli::CliArgs;
use crate::error::ConfigError;
use crate::output::{OutputConfig, OutputMode};
use crate::registry::DEFAULT_REGISTRY;
use crate::tree::default_global_prefix;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

/// Default number of concurrent registry lookups
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default time limit for one registry lookup (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Which installed tree to scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// A project directory with a package.json
    Project { root: PathBuf },
    /// Globally installed packages under an install prefix
    Global { prefix: PathBuf },
}

impl Scope {
    pub fn is_global(&self) -> bool {
        matches!(self, Scope::Global { .. })
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::Project {
            root: PathBuf::from("."),
        }
    }
}

/// Everything a scan and its presentation depend on
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Tree to scan
    pub scope: Scope,
    /// Only scan these package names (empty means all)
    pub packages: Vec<String>,
    /// Ask the registry for fresh metadata
    pub prefer_online: bool,
    /// Whether to use colors in table output
    pub color: bool,
    /// Presentation mode
    pub output_mode: OutputMode,
    /// Maximum concurrent lookups (at least 1)
    pub concurrency: usize,
    /// Time limit for one lookup
    pub timeout: Duration,
    /// Treat any lookup failure as fatal
    pub strict: bool,
    /// Show dependency type and homepage
    pub long: bool,
    /// Registry base URL
    pub registry: String,
    /// Show a progress bar on stderr
    pub progress: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scope: Scope::default(),
            packages: Vec::new(),
            prefer_online: true,
            color: false,
            output_mode: OutputMode::default(),
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            strict: false,
            long: false,
            registry: DEFAULT_REGISTRY.to_string(),
            progress: false,
        }
    }
}

impl ScanConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self, ConfigError> {
        let scope = if args.global {
            Scope::Global {
                prefix: args.prefix.clone().unwrap_or_else(default_global_prefix),
            }
        } else {
            let root = std::path::absolute(&args.dir).map_err(|e| ConfigError::InvalidPath {
                path: args.dir.clone(),
                message: e.to_string(),
            })?;
            Scope::Project { root }
        };

        let output_mode = if args.json {
            OutputMode::Json
        } else if args.parseable {
            OutputMode::Parseable
        } else {
            OutputMode::Table
        };

        let registry = match args.registry.as_deref() {
            Some(url) => validate_registry(url)?,
            None => DEFAULT_REGISTRY.to_string(),
        };

        let color = !args.no_color
            && std::env::var_os("NO_COLOR").is_none()
            && std::io::stdout().is_terminal();
        let progress =
            !args.quiet && output_mode == OutputMode::Table && std::io::stderr().is_terminal();

        Ok(Self {
            scope,
            packages: args.packages.clone(),
            prefer_online: !args.prefer_offline,
            color,
            output_mode,
            concurrency: usize::from(args.concurrency).max(1),
            timeout: args.timeout,
            strict: args.strict,
            long: args.long,
            registry,
            progress,
        })
    }

    /// Presenter settings for this scan
    pub fn output_config(&self) -> OutputConfig {
        let relative_to = if self.scope.is_global() {
            None
        } else {
            std::env::current_dir().ok()
        };

        OutputConfig {
            mode: self.output_mode,
            color: self.color,
            long: self.long,
            relative_to,
        }
    }
}

fn validate_registry(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"));

    match host {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidRegistry {
            value: value.to_string(),
        }),
    }
}
