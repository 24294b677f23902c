//! CLI argument definitions for `coursemap`

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use coursemap::config::ConfigOverrides;
use coursemap::logger::Level;
use coursemap::OutputFormat;

/// CLI log level argument
///
/// Represents log levels that can be passed via CLI arguments. Converts to lowercase
/// strings for config storage and to `logger::Level` for runtime use.
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevelArg {
    /// Error-level logging
    Error,
    /// Warning-level logging
    Warn,
    /// Info-level logging
    Info,
    /// Debug-level logging
    Debug,
}

impl From<LogLevelArg> for Level {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => Self::Error,
            LogLevelArg::Warn => Self::Warn,
            LogLevelArg::Info => Self::Info,
            LogLevelArg::Debug => Self::Debug,
        }
    }
}

impl std::fmt::Display for LogLevelArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let as_str = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        write!(f, "{as_str}")
    }
}

/// CLI output format argument
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum FormatArg {
    /// Scalable vector graphics
    Svg,
    /// Raster image
    Png,
    /// Graphviz source
    Dot,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Svg => Self::Svg,
            FormatArg::Png => Self::Png,
            FormatArg::Dot => Self::Dot,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Display configuration values.
    ///
    /// If a KEY is provided, displays only that configuration value.
    /// If no KEY is provided, displays all configuration values.
    Get {
        /// Optional configuration key to display (e.g., `engine`, `phase.Pre`)
        #[arg(value_name = "KEY")]
        key: Option<String>,
    },
    /// Set a configuration value.
    Set {
        /// Configuration key to set
        #[arg(value_name = "KEY")]
        key: String,
        /// Value to set
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Unset a configuration value.
    Unset {
        /// Configuration key to unset
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Reset configuration to defaults (requires confirmation).
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render a course map.
    ///
    /// Scans INPUT for course documents and writes the rendered map to a file,
    /// or prints embeddable SVG with --inline.
    Generate {
        /// Directory containing course documents
        #[arg(value_name = "INPUT", default_value = ".")]
        input: PathBuf,

        /// Output file (defaults to `course_map.<format>`)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format (defaults to config `format`)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Print inline SVG to stdout instead of writing a file
        #[arg(long, conflicts_with_all = ["output", "format"])]
        inline: bool,
    },
    /// Print the Graphviz DOT description of a course map.
    Dot {
        /// Directory containing course documents
        #[arg(value_name = "INPUT", default_value = ".")]
        input: PathBuf,
    },
    /// List the courses found and any document problems.
    List {
        /// Directory containing course documents
        #[arg(value_name = "INPUT", default_value = ".")]
        input: PathBuf,
    },
    /// Check that the rendering engine is installed.
    Check,
    /// Manage configuration.
    ///
    /// If no subcommand is provided, displays all configuration values.
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "coursemap",
    about = "Render course prerequisite maps from Quarto/Markdown front matter",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Set the runtime log level (error|warn|info|debug). Falls back to config if omitted.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Enable verbose output (runtime only)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Enable debug-level logging and runtime debug flag (shorthand)
    #[arg(long = "debug")]
    pub debug_flag: bool,

    /// Write runtime logs to a file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Use this configuration file instead of the user config
    #[arg(short = 'c', long = "config", value_name = "PATH", global = true)]
    pub config_path: Option<PathBuf>,

    // --- Config overrides ---
    /// Override config logging level
    #[arg(long = "config-level", value_enum)]
    pub config_level: Option<LogLevelArg>,

    /// Override config engine executable
    #[arg(long = "config-engine", value_name = "PATH")]
    pub config_engine: Option<String>,

    /// Override config default output format
    #[arg(long = "config-format", value_enum)]
    pub config_format: Option<FormatArg>,

    /// Subcommand to execute.
    /// A subcommand is required to run the CLI.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Convert CLI flags into config overrides
    ///
    /// # Returns
    /// A `ConfigOverrides` struct with values from CLI flags, where `None` means no override.
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            level: self.config_level.map(|lvl| lvl.to_string()),
            file: None,
            verbose: None,
            engine: self.config_engine.clone(),
            format: self.config_format.map(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("coursemap").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevelArg::Error.to_string(), "error");
        assert_eq!(LogLevelArg::Warn.to_string(), "warn");
        assert_eq!(LogLevelArg::Info.to_string(), "info");
        assert_eq!(LogLevelArg::Debug.to_string(), "debug");
    }

    #[test]
    fn test_log_level_to_logger_level() {
        assert_eq!(Level::from(LogLevelArg::Error), Level::Error);
        assert_eq!(Level::from(LogLevelArg::Warn), Level::Warn);
        assert_eq!(Level::from(LogLevelArg::Info), Level::Info);
        assert_eq!(Level::from(LogLevelArg::Debug), Level::Debug);
    }

    #[test]
    fn test_generate_defaults() {
        let cli = parse(&["generate"]);
        match cli.command {
            Command::Generate {
                input,
                output,
                format,
                inline,
            } => {
                assert_eq!(input, PathBuf::from("."));
                assert!(output.is_none());
                assert!(format.is_none());
                assert!(!inline);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_inline_conflicts_with_output() {
        let result = Cli::try_parse_from(["coursemap", "generate", "--inline", "-o", "map.svg"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_to_config_overrides_empty() {
        let overrides = parse(&["check"]).to_config_overrides();
        assert!(overrides.level.is_none());
        assert!(overrides.engine.is_none());
        assert!(overrides.format.is_none());
    }

    #[test]
    fn test_to_config_overrides_with_values() {
        let cli = parse(&[
            "--config-level",
            "debug",
            "--config-engine",
            "/opt/graphviz/bin/dot",
            "--config-format",
            "png",
            "-c",
            "custom.toml",
            "list",
            "courses",
        ]);

        assert_eq!(cli.config_path, Some(PathBuf::from("custom.toml")));
        let overrides = cli.to_config_overrides();
        assert_eq!(overrides.level, Some("debug".to_string()));
        assert_eq!(overrides.engine, Some("/opt/graphviz/bin/dot".to_string()));
        assert_eq!(overrides.format, Some(OutputFormat::Png));
    }
}
