//! Configuration for cleanup runs.
//!
//! Settings are read from a TOML file. Every section and key is optional;
//! missing values fall back to the defaults shown here:
//!
//! ```toml
//! [history]
//! file_name = ".tidy_history"
//!
//! [buckets]
//! fallback = "misc"
//!
//! [filters]
//! # Glob patterns for files that are never moved (the tool's own artifacts).
//! protected = ["tidy", "tidy.exe", "main.go"]
//! # Extensions that are always skipped, in addition to `cup --skip`.
//! skip = []
//! ```

use crate::file_category::DEFAULT_FALLBACK_BUCKET;
use crate::history::DEFAULT_HISTORY_FILE;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".tidyrc.toml";

/// File names protected when no configuration says otherwise.
pub const DEFAULT_PROTECTED: &[&str] = &["tidy", "tidy.exe", "main.go"];

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// A protected pattern is not a valid glob.
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern { pattern: String, reason: String },
    /// A setting that names a file or directory is not a plain file name.
    #[error("Invalid {field} '{value}': expected a single file name")]
    InvalidName { field: &'static str, value: String },
    #[error("IO error reading configuration: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TidyConfig {
    pub history: HistoryConfig,
    pub buckets: BucketConfig,
    pub filters: FilterRules,
}

/// Where the transaction log lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Log file name, created inside the organized directory.
    pub file_name: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_HISTORY_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketConfig {
    /// Bucket for files without an extension.
    pub fallback: String,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            fallback: DEFAULT_FALLBACK_BUCKET.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    /// Glob patterns matched against file names; matches are never moved.
    pub protected: Vec<String>,
    /// Extensions that are always skipped.
    pub skip: Vec<String>,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            protected: DEFAULT_PROTECTED.iter().map(|s| s.to_string()).collect(),
            skip: Vec::new(),
        }
    }
}

impl TidyConfig {
    /// Load configuration, falling back to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if given (it must exist)
    /// 2. `.tidyrc.toml` in `base_path`
    /// 3. `tidy/config.toml` in the user's config directory
    /// 4. built-in defaults
    pub fn load(config_path: Option<&Path>, base_path: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = base_path.join(LOCAL_CONFIG_FILE);
        if local_config.is_file() {
            return Self::load_from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tidy").join("config.toml");
            if user_config.is_file() {
                return Self::load_from_file(&user_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that names used as paths are single components.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_plain_file_name(&self.history.file_name) {
            return Err(ConfigError::InvalidName {
                field: "history.file_name",
                value: self.history.file_name.clone(),
            });
        }
        if !is_plain_file_name(&self.buckets.fallback) {
            return Err(ConfigError::InvalidName {
                field: "buckets.fallback",
                value: self.buckets.fallback.clone(),
            });
        }
        Ok(())
    }

    /// Compiles the protected patterns.
    pub fn protected_artifacts(&self) -> Result<ProtectedArtifacts, ConfigError> {
        ProtectedArtifacts::new(&self.filters.protected)
    }
}

fn is_plain_file_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Compiled set of file names that a cleanup must leave alone.
#[derive(Debug, Clone)]
pub struct ProtectedArtifacts {
    patterns: Vec<Pattern>,
    names: HashSet<String>,
}

impl ProtectedArtifacts {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern.as_ref()).map_err(|e| ConfigError::InvalidGlobPattern {
                    pattern: pattern.as_ref().to_string(),
                    reason: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns,
            names: HashSet::from([LOCAL_CONFIG_FILE.to_string()]),
        })
    }

    /// Protects one exact file name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    /// Protects the running executable if it lives in `base_path`.
    pub fn with_current_exe(self, base_path: &Path) -> Self {
        let Ok(exe) = std::env::current_exe() else {
            return self;
        };
        let same_dir = match (exe.parent().map(Path::canonicalize), base_path.canonicalize()) {
            (Some(Ok(exe_dir)), Ok(base)) => exe_dir == base,
            _ => false,
        };

        if same_dir && let Some(name) = exe.file_name().and_then(|n| n.to_str()) {
            return self.with_name(name);
        }
        self
    }

    pub fn is_protected(&self, file_name: &str) -> bool {
        self.names.contains(file_name)
            || self
                .patterns
                .iter()
                .any(|pattern| pattern.matches(file_name))
    }
}

impl Default for ProtectedArtifacts {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_PROTECTED
                .iter()
                .filter_map(|p| Pattern::new(p).ok())
                .collect(),
            names: HashSet::from([LOCAL_CONFIG_FILE.to_string()]),
        }
    }
}
