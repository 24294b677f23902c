//! Configuration module for `coursemap`

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::models::{CollisionPolicy, UNKNOWN_PHASE};
use crate::core::render::OutputFormat;

/// Default CLI configuration loaded based on build profile.
/// Uses release defaults in release mode, debug defaults in debug mode.
#[cfg(not(debug_assertions))]
const CONFIG_DEFAULTS: &str = include_str!("../assets/DefaultCLIConfigRelease.toml");

#[cfg(debug_assertions)]
const CONFIG_DEFAULTS: &str = include_str!("../assets/DefaultCLIConfigDebug.toml");

#[cfg(not(debug_assertions))]
const CONFIG_FILE_NAME: &str = "config.toml";

#[cfg(debug_assertions)]
const CONFIG_FILE_NAME: &str = "dconfig.toml";

/// Colour used when neither the phase nor `Unknown` has one configured
const FALLBACK_COLOR: &str = "lightgray";

/// Errors raised while loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("cannot read config file `{}`: {source}", .path.display())]
    Read {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The file is not valid configuration TOML
    #[error("cannot parse config file `{}`: {source}", .path.display())]
    Parse {
        /// Config file path
        path: PathBuf,
        /// TOML diagnostic
        #[source]
        source: toml::de::Error,
    },
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    #[serde(default)]
    pub level: String,
    /// Log file path
    #[serde(default)]
    pub file: String,
    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,
}

/// Document scanning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Front-matter key holding the course block
    pub root_key: String,
    /// Recognized document extensions, without the dot
    pub extensions: Vec<String>,
    /// Ignore patterns; a leading `/` anchors the pattern to a path suffix,
    /// otherwise it matches anywhere in the relative path
    pub ignore: Vec<String>,
    /// Identifier collision policy
    pub collision: CollisionPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root_key: "course-map".to_string(),
            extensions: vec!["qmd".to_string(), "md".to_string()],
            ignore: vec!["/index.qmd".to_string()],
            collision: CollisionPolicy::default(),
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Default output format
    pub format: OutputFormat,
    /// Layout engine executable (name on `PATH` or a path)
    pub engine: String,
    /// Graphviz rank direction (TB, LR, BT, RL)
    pub rankdir: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Svg,
            engine: "dot".to_string(),
            rankdir: "TB".to_string(),
        }
    }
}

fn default_phases() -> IndexMap<String, String> {
    [
        ("Pre", "lightblue"),
        ("InClass", "lightgreen"),
        ("Post", "orange"),
        (UNKNOWN_PHASE, FALLBACK_COLOR),
    ]
    .into_iter()
    .map(|(phase, color)| (phase.to_string(), color.to_string()))
    .collect()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Scanner settings
    #[serde(default)]
    pub scan: ScanConfig,
    /// Renderer settings
    #[serde(default)]
    pub render: RenderConfig,
    /// Phase name -> node fill colour, in declaration order
    #[serde(default = "default_phases")]
    pub phase: IndexMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            scan: ScanConfig::default(),
            render: RenderConfig::default(),
            phase: default_phases(),
        }
    }
}

/// Optional CLI overrides for configuration values
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override logging level
    pub level: Option<String>,
    /// Override log file path
    pub file: Option<String>,
    /// Override verbose flag
    pub verbose: Option<bool>,
    /// Override engine executable
    pub engine: Option<String>,
    /// Override default output format
    pub format: Option<OutputFormat>,
}

fn join_list(values: &[String]) -> String {
    values.join(",")
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
        .collect()
}

impl Config {
    /// Get the `$COURSEMAP` directory path
    ///
    /// Returns:
    /// - Linux: `~/.config/coursemap`
    /// - macOS: `~/Library/Application Support/coursemap`
    /// - Windows: `%APPDATA%\coursemap`
    #[must_use]
    pub fn get_coursemap_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("coursemap")
    }

    /// Get the user config file path
    ///
    /// `config.toml` for release builds, `dconfig.toml` for debug builds, inside
    /// [`get_coursemap_dir`](Self::get_coursemap_dir).
    #[must_use]
    pub fn get_config_file_path() -> PathBuf {
        Self::get_coursemap_dir().join(CONFIG_FILE_NAME)
    }

    /// Merge missing fields from defaults into this config
    ///
    /// Only fields that are empty here and non-empty in `defaults` are filled,
    /// so upgrading picks up new settings without touching user choices.
    ///
    /// # Returns
    ///
    /// `true` if any fields were added/changed, `false` otherwise
    #[allow(clippy::useless_let_if_seq)]
    pub fn merge_defaults(&mut self, defaults: &Self) -> bool {
        let mut changed = false;

        if self.logging.level.is_empty() && !defaults.logging.level.is_empty() {
            self.logging.level.clone_from(&defaults.logging.level);
            changed = true;
        }
        if self.logging.file.is_empty() && !defaults.logging.file.is_empty() {
            self.logging.file.clone_from(&defaults.logging.file);
            changed = true;
        }

        if self.scan.root_key.is_empty() && !defaults.scan.root_key.is_empty() {
            self.scan.root_key.clone_from(&defaults.scan.root_key);
            changed = true;
        }
        if self.scan.extensions.is_empty() && !defaults.scan.extensions.is_empty() {
            self.scan.extensions.clone_from(&defaults.scan.extensions);
            changed = true;
        }

        if self.render.engine.is_empty() && !defaults.render.engine.is_empty() {
            self.render.engine.clone_from(&defaults.render.engine);
            changed = true;
        }
        if self.render.rankdir.is_empty() && !defaults.render.rankdir.is_empty() {
            self.render.rankdir.clone_from(&defaults.render.rankdir);
            changed = true;
        }

        if self.phase.is_empty() && !defaults.phase.is_empty() {
            self.phase.clone_from(&defaults.phase);
            changed = true;
        }

        changed
    }

    /// Apply CLI-provided overrides onto the loaded configuration
    ///
    /// Overrides last for this run only; the configuration file is not modified.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(level) = &overrides.level {
            self.logging.level.clone_from(level);
        }
        if let Some(file) = &overrides.file {
            self.logging.file.clone_from(file);
        }
        if let Some(verbose) = overrides.verbose {
            self.logging.verbose = verbose;
        }
        if let Some(engine) = &overrides.engine {
            self.render.engine.clone_from(engine);
        }
        if let Some(format) = overrides.format {
            self.render.format = format;
        }
    }

    /// Expand the `$COURSEMAP` variable to the config directory
    #[must_use]
    fn expand_variables(value: &str) -> String {
        if value.contains("$COURSEMAP") {
            let coursemap_dir = Self::get_coursemap_dir();
            value.replace("$COURSEMAP", coursemap_dir.to_str().unwrap_or("."))
        } else {
            value.to_string()
        }
    }

    /// Initialize config from a TOML string
    ///
    /// Missing sections and fields take their documented defaults. `$COURSEMAP`
    /// is expanded in the log file and engine paths.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML cannot be parsed or doesn't match the expected schema
    ///
    /// # Examples
    ///
    /// ```
    /// use coursemap::config::Config;
    ///
    /// let config = Config::from_toml("[render]\nengine = \"/opt/graphviz/bin/dot\"\n").unwrap();
    /// assert_eq!(config.render.engine, "/opt/graphviz/bin/dot");
    /// assert_eq!(config.scan.root_key, "course-map");
    /// ```
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(toml_str)?;

        config.logging.file = Self::expand_variables(&config.logging.file);
        config.render.engine = Self::expand_variables(&config.render.engine);

        Ok(config)
    }

    /// Load configuration from an explicit file
    ///
    /// # Errors
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is not valid configuration TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from embedded defaults
    ///
    /// - Debug: Uses `DefaultCLIConfigDebug.toml`
    /// - Release: Uses `DefaultCLIConfigRelease.toml`
    ///
    /// # Panics
    /// Panics if the embedded default configuration is invalid TOML. The
    /// defaults are compiled into the binary and covered by tests.
    #[must_use]
    pub fn from_defaults() -> Self {
        Self::from_toml(CONFIG_DEFAULTS).expect("Failed to parse compiled-in default configuration")
    }

    /// Load configuration from the user config file, or create it from defaults
    ///
    /// - If the file exists: load it, merge missing fields from defaults, save if changed
    /// - If it does not (first run): create the directory and write the defaults
    ///
    /// Falls back to defaults if the file cannot be read or parsed.
    #[must_use]
    pub fn load() -> Self {
        let config_file = Self::get_config_file_path();
        let defaults = Self::from_defaults();

        if config_file.exists() {
            if let Ok(mut config) = Self::from_file(&config_file) {
                if config.merge_defaults(&defaults) {
                    let _ = config.save();
                }
                return config;
            }
        } else {
            if let Some(parent) = config_file.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = defaults.save();
            return defaults;
        }

        defaults
    }

    /// Save configuration to the user config file
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized, the directory cannot
    /// be created, or the file cannot be written.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::get_config_file_path())
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(path, toml_str)?;
        Ok(())
    }

    /// Colour for a phase, falling back to the `Unknown` phase, then light gray
    #[must_use]
    pub fn phase_color(&self, phase: &str) -> &str {
        self.phase
            .get(phase)
            .or_else(|| self.phase.get(UNKNOWN_PHASE))
            .map_or(FALLBACK_COLOR, String::as_str)
    }

    /// Whether a document path (relative to the scan root) matches an ignore pattern
    #[must_use]
    pub fn should_ignore(&self, relative_path: &Path) -> bool {
        let path = relative_path.to_string_lossy().replace('\\', "/");
        self.scan.ignore.iter().any(|pattern| {
            pattern.strip_prefix('/').map_or_else(
                || !pattern.is_empty() && path.contains(pattern.as_str()),
                |anchored| {
                    !anchored.is_empty()
                        && (path == anchored || path.ends_with(&format!("/{anchored}")))
                },
            )
        })
    }

    /// Whether a file has one of the recognized document extensions
    #[must_use]
    pub fn accepts_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.scan
                    .extensions
                    .iter()
                    .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }

    /// Get a configuration value by key
    ///
    /// Supported keys: `level`, `file`, `verbose`, `root_key`, `extensions`,
    /// `ignore`, `collision`, `format`, `engine`, `rankdir` and `phase.<NAME>`.
    /// List values are comma-separated.
    ///
    /// # Returns
    /// `None` if the key is not recognized
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(phase) = key.strip_prefix("phase.") {
            return self.phase.get(phase).cloned();
        }
        match key {
            "level" => Some(self.logging.level.clone()),
            "file" => Some(self.logging.file.clone()),
            "verbose" => Some(self.logging.verbose.to_string()),
            "root_key" | "root-key" => Some(self.scan.root_key.clone()),
            "extensions" => Some(join_list(&self.scan.extensions)),
            "ignore" => Some(join_list(&self.scan.ignore)),
            "collision" => Some(self.scan.collision.to_string()),
            "format" => Some(self.render.format.to_string()),
            "engine" => Some(self.render.engine.clone()),
            "rankdir" => Some(self.render.rankdir.clone()),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// Only the in-memory config changes; call [`save()`](Config::save) to persist.
    ///
    /// # Errors
    /// Returns an error if the key is not recognized or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        if let Some(phase) = key.strip_prefix("phase.") {
            if phase.is_empty() {
                return Err(format!("Unknown config key: '{key}'"));
            }
            self.phase.insert(phase.to_string(), value.to_string());
            return Ok(());
        }
        match key {
            "level" => {
                value
                    .parse::<crate::logger::Level>()
                    .map_err(|e| format!("Invalid value for 'level': {e}"))?;
                self.logging.level = value.to_ascii_lowercase();
            }
            "file" => self.logging.file = value.to_string(),
            "verbose" => {
                self.logging.verbose = value
                    .parse::<bool>()
                    .map_err(|_| format!("Invalid boolean value for 'verbose': '{value}'"))?;
            }
            "root_key" | "root-key" => self.scan.root_key = value.to_string(),
            "extensions" => self.scan.extensions = split_list(value),
            "ignore" => self.scan.ignore = split_list(value),
            "collision" => self.scan.collision = value.parse()?,
            "format" => self.render.format = value.parse()?,
            "engine" => self.render.engine = value.to_string(),
            "rankdir" => {
                let upper = value.to_ascii_uppercase();
                if !matches!(upper.as_str(), "TB" | "LR" | "BT" | "RL") {
                    return Err(format!(
                        "Invalid value for 'rankdir': '{value}' (expected TB, LR, BT or RL)"
                    ));
                }
                self.render.rankdir = upper;
            }
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Unset a configuration value by key (reset to default)
    ///
    /// A `phase.<NAME>` key that has no default is removed.
    ///
    /// # Errors
    /// Returns an error if the key is not recognized.
    pub fn unset(&mut self, key: &str, defaults: &Self) -> Result<(), String> {
        if let Some(phase) = key.strip_prefix("phase.") {
            match defaults.phase.get(phase) {
                Some(color) => {
                    self.phase.insert(phase.to_string(), color.clone());
                }
                None => {
                    self.phase.shift_remove(phase);
                }
            }
            return Ok(());
        }
        match key {
            "level" => self.logging.level.clone_from(&defaults.logging.level),
            "file" => self.logging.file.clone_from(&defaults.logging.file),
            "verbose" => self.logging.verbose = defaults.logging.verbose,
            "root_key" | "root-key" => self.scan.root_key.clone_from(&defaults.scan.root_key),
            "extensions" => self.scan.extensions.clone_from(&defaults.scan.extensions),
            "ignore" => self.scan.ignore.clone_from(&defaults.scan.ignore),
            "collision" => self.scan.collision = defaults.scan.collision,
            "format" => self.render.format = defaults.render.format,
            "engine" => self.render.engine.clone_from(&defaults.render.engine),
            "rankdir" => self.render.rankdir.clone_from(&defaults.render.rankdir),
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Reset all configuration to defaults by deleting the user config file
    ///
    /// The next [`load()`](Config::load) recreates it from defaults.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be deleted.
    pub fn reset() -> Result<(), std::io::Error> {
        let config_file = Self::get_config_file_path();
        if config_file.exists() {
            fs::remove_file(config_file)?;
        }
        Ok(())
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[logging]")?;
        writeln!(f, "  level = \"{}\"", self.logging.level)?;
        writeln!(f, "  file = \"{}\"", self.logging.file)?;
        writeln!(f, "  verbose = {}", self.logging.verbose)?;

        writeln!(f, "\n[scan]")?;
        writeln!(f, "  root_key = \"{}\"", self.scan.root_key)?;
        writeln!(f, "  extensions = {:?}", self.scan.extensions)?;
        writeln!(f, "  ignore = {:?}", self.scan.ignore)?;
        writeln!(f, "  collision = \"{}\"", self.scan.collision)?;

        writeln!(f, "\n[render]")?;
        writeln!(f, "  format = \"{}\"", self.render.format)?;
        writeln!(f, "  engine = \"{}\"", self.render.engine)?;
        writeln!(f, "  rankdir = \"{}\"", self.render.rankdir)?;

        writeln!(f, "\n[phase]")?;
        for (phase, color) in &self.phase {
            writeln!(f, "  {phase} = \"{color}\"")?;
        }

        Ok(())
    }
}
