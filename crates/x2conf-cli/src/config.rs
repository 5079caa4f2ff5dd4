//! Configuration management for the CLI
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//! - Command-line arguments, which always win over file settings

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use x2conf_core::ResolverOptions;

/// File name of the template manifest inside a templates directory
pub const MANIFEST_FILE_NAME: &str = "template-mapping.yaml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Path settings
    pub paths: PathConfig,

    /// Template resolution settings
    pub conversion: ConversionConfig,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Use colored output by default
    pub color: bool,

    /// Show progress indicators
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); verbosity flags override it
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,

    /// Log file path
    pub file: Option<PathBuf>,
}

/// Path configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Directory holding the template fragments
    pub templates_dir: Option<PathBuf>,

    /// Template manifest; defaults to `template-mapping.yaml` in the templates directory
    pub manifest: Option<PathBuf>,

    /// Default directory for conversion reports
    pub report_dir: Option<PathBuf>,
}

/// Conversion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Leading path segment marking source-document paths in templates
    pub namespace: String,

    /// Spaces per block level in templates
    pub indent_unit: usize,

    /// Record literal `key = value` template lines as default values
    pub track_hardcoded_defaults: bool,

    /// Source type assumed when none is given
    pub source_type: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            progress: true,
        }
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        let options = ResolverOptions::default();
        Self {
            namespace: options.namespace,
            indent_unit: options.indent_unit,
            track_hardcoded_defaults: options.track_hardcoded_defaults,
            source_type: "datax".to_string(),
        }
    }
}

impl ConversionConfig {
    /// Resolver options for the core engine
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            namespace: self.namespace.clone(),
            indent_unit: self.indent_unit,
            track_hardcoded_defaults: self.track_hardcoded_defaults,
            ..ResolverOptions::default()
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config = if is_yaml(path) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Every file found is merged, user-wide files first, so project files win.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        for path in Self::default_config_paths().iter().rev() {
            if path.exists() {
                match Self::from_file(path) {
                    Ok(found) => config.merge(found),
                    Err(e) => {
                        eprintln!("Warning: Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) if !path.exists() => Err(Error::FileNotFound {
                path: path.to_path_buf(),
            }),
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".x2conf.yaml"),
            PathBuf::from(".x2conf.json"),
            PathBuf::from("x2conf.yaml"),
            PathBuf::from("x2conf.json"),
        ];

        // User config directory
        if let Some(config_dir) = dirs::config_dir() {
            let x2conf_dir = config_dir.join("x2conf");
            paths.push(x2conf_dir.join("config.yaml"));
            paths.push(x2conf_dir.join("config.json"));
        }

        // Home directory
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".x2conf.yaml"));
            paths.push(home_dir.join(".x2conf.json"));
        }

        paths
    }

    /// Merge with another config (other takes precedence where it sets a value)
    pub fn merge(&mut self, other: Config) {
        self.output = other.output;
        self.conversion = other.conversion;

        if other.logging.level.is_some() {
            self.logging.level = other.logging.level;
        }
        if other.logging.format.is_some() {
            self.logging.format = other.logging.format;
        }
        if other.logging.file.is_some() {
            self.logging.file = other.logging.file;
        }

        if other.paths.templates_dir.is_some() {
            self.paths.templates_dir = other.paths.templates_dir;
        }
        if other.paths.manifest.is_some() {
            self.paths.manifest = other.paths.manifest;
        }
        if other.paths.report_dir.is_some() {
            self.paths.report_dir = other.paths.report_dir;
        }
    }

    /// Templates directory: the override, then the configured one, then the bundled set
    pub fn templates_dir(&self, cli_override: Option<&Path>) -> PathBuf {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.paths.templates_dir.clone())
            .unwrap_or_else(bundled_templates_dir)
    }

    /// Manifest path: the override, then the configured one, then the templates directory's
    pub fn manifest_path(&self, cli_override: Option<&Path>, templates_dir: &Path) -> PathBuf {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.paths.manifest.clone())
            .unwrap_or_else(|| templates_dir.join(MANIFEST_FILE_NAME))
    }

    /// Save configuration to a file
    #[allow(dead_code)]
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_yaml(path) {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Templates shipped with the CLI
///
/// `./templates` when present, else the `templates` directory of this crate.
pub fn bundled_templates_dir() -> PathBuf {
    let local = PathBuf::from("templates");
    if local.join(MANIFEST_FILE_NAME).exists() {
        return local;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates")
}

/// Builder for creating configurations programmatically
#[allow(dead_code)]
pub struct ConfigBuilder {
    config: Config,
}

#[allow(dead_code)]
impl ConfigBuilder {
    /// Create a new config builder
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the templates directory
    pub fn templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.paths.templates_dir = Some(dir.into());
        self
    }

    /// Set the manifest path
    pub fn manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.paths.manifest = Some(path.into());
        self
    }

    /// Set the template namespace
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.conversion.namespace = namespace.into();
        self
    }

    /// Record literal template values as defaults
    pub fn track_hardcoded_defaults(mut self, enabled: bool) -> Self {
        self.config.conversion.track_hardcoded_defaults = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
