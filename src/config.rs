//! Configuration location, settings file, and file filtering.
//!
//! All persisted state lives in one per-user configuration directory:
//! - `paths.json` holds the registered directories (see [`crate::registry`])
//! - `settings.toml` optionally tunes filtering and the category table
//!
//! # Settings File Format
//!
//! ```toml
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = ["desktop.ini"]
//! extensions = ["part", "crdownload"]
//! patterns = ["*.tmp"]
//! regex = ["^~\\$"]
//!
//! [filters.include]
//! patterns = []
//!
//! [categories]
//! ebooks = ["epub", "mobi"]
//! ```

use crate::file_category::{CategoryTable, validate_category_name};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::PathBuf;

/// Name of the per-user configuration folder.
pub const APP_NAME: &str = "gniphyl";

const REGISTRY_FILE: &str = "paths.json";
const SETTINGS_FILE: &str = "settings.toml";

/// Errors that can occur while locating, reading, or writing configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration directory cannot be derived on this system.
    ConfigDirUnavailable(String),
    /// A configuration source exists but cannot be read or parsed.
    ConfigLoad {
        /// Where the configuration came from (a file path or a bundled resource).
        origin: String,
        reason: String,
    },
    /// The registry could not be persisted.
    ConfigWrite { path: PathBuf, reason: String },
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    InvalidRegexPattern { pattern: String, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigDirUnavailable(reason) => {
                write!(f, "Cannot locate configuration directory: {}", reason)
            }
            ConfigError::ConfigLoad { origin, reason } => {
                write!(f, "Failed to load configuration from {}: {}", origin, reason)
            }
            ConfigError::ConfigWrite { path, reason } => {
                write!(f, "Failed to save {}: {}", path.display(), reason)
            }
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Derives the configuration directory for an operating system.
///
/// `os` takes the values of `std::env::consts::OS` and `var` looks up an
/// environment variable, so the function stays free of process state.
///
/// - `windows`: `%LOCALAPPDATA%\gniphyl`
/// - `linux`, `macos`: `$HOME/.config/gniphyl`
pub fn resolve_config_dir<F>(os: &str, var: F) -> Result<PathBuf, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |name: &str| {
        var(name)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                ConfigError::ConfigDirUnavailable(format!(
                    "{} environment variable not set",
                    name
                ))
            })
    };

    match os {
        "windows" => Ok(PathBuf::from(required("LOCALAPPDATA")?).join(APP_NAME)),
        "linux" | "macos" => Ok(PathBuf::from(required("HOME")?)
            .join(".config")
            .join(APP_NAME)),
        other => Err(ConfigError::ConfigDirUnavailable(format!(
            "unsupported system: {}",
            other
        ))),
    }
}

/// Resolved locations of the configuration files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    dir: PathBuf,
}

impl ConfigLocation {
    /// Uses an explicit configuration directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Derives the configuration directory from the running OS and environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        resolve_config_dir(std::env::consts::OS, |name| std::env::var(name).ok()).map(Self::new)
    }

    pub fn registry_file(&self) -> PathBuf {
        self.dir.join(REGISTRY_FILE)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }
}

/// Optional user settings read from `settings.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub filters: FilterRules,

    /// Categories to add to, or replace in, the bundled category table.
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
}

/// Root-level filter rules configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether files starting with "." are organized. Defaults to true.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Whitelist that overrides every exclude rule.
    #[serde(default)]
    pub include: IncludeRules,
}

fn default_enable_hidden_files() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

/// Rules for leaving files where they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact file names (e.g., "desktop.ini").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the file name (e.g., "*.tmp").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions without the dot, compared case-insensitively.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Settings {
    /// Loads `settings.toml` from the configuration directory.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigLoad` if the file exists but cannot be read
    /// or is not valid TOML.
    pub fn load(location: &ConfigLocation) -> Result<Self, ConfigError> {
        let path = location.settings_file();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ConfigLoad {
            origin: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::ConfigLoad { reason, .. } => ConfigError::ConfigLoad {
                origin: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Parses settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigLoad {
            origin: SETTINGS_FILE.to_string(),
            reason: e.to_string(),
        })
    }

    /// Builds the category table: bundled defaults plus user overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigLoad` if a category name cannot be used as
    /// a folder inside the organized directory, or is the reserved `others`.
    pub fn category_table(&self) -> Result<CategoryTable, ConfigError> {
        let mut table = CategoryTable::load()?;
        for (name, extensions) in &self.categories {
            validate_category_name(name).map_err(|reason| ConfigError::ConfigLoad {
                origin: SETTINGS_FILE.to_string(),
                reason,
            })?;
            table.set_category(name, extensions);
        }
        Ok(table)
    }

    /// Compiles the filter rules for matching.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob patterns are invalid.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Filter rules with patterns compiled once, ready to be checked per file.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl Default for CompiledFilters {
    /// Accepts every file.
    fn default() -> Self {
        Self {
            enable_hidden_files: true,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let compile_globs = |patterns: &[String]| {
            patterns
                .iter()
                .map(|pattern| {
                    Pattern::new(pattern)
                        .map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
                })
                .collect::<Result<Vec<_>, _>>()
        };

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns: compile_globs(rules.exclude.patterns.as_slice())?,
            exclude_regexes,
            include_patterns: compile_globs(rules.include.patterns.as_slice())?,
        })
    }

    /// Checks whether a file should be organized.
    ///
    /// `file_name` is the bare name of an entry in the organized directory and
    /// `extension` its lower-cased extension without the dot. Include patterns
    /// win over everything; otherwise the first matching exclude rule drops
    /// the file.
    pub fn should_include(&self, file_name: &str, extension: &str) -> bool {
        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches(file_name))
        {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name) {
            return false;
        }

        if !extension.is_empty() && self.exclude_extensions.contains(extension) {
            return false;
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(file_name))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(file_name))
    }
}
