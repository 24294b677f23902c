//! Command-line interface entry point for `coursemap`

mod args;
mod commands;

use args::{Cli, Command};
use clap::Parser;
use coursemap::config::Config;
use coursemap::logger::{enable_debug, enable_verbose, init_file_logging, set_level, Level};
use coursemap::{info, OutputFormat};

fn main() {
    let args = Cli::parse();

    // Load configuration once at startup and apply CLI overrides to it
    let stored = match &args.config_path {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("✗ {e}");
                std::process::exit(1);
            }
        },
        None => Config::load(),
    };
    let defaults = Config::from_defaults();
    let mut config = stored.clone();
    config.apply_overrides(&args.to_config_overrides());

    // CLI flag overrides config logging.level; fallback warn
    let mut level = args
        .log_level
        .map(Into::into)
        .or_else(|| config.logging.level.parse::<Level>().ok())
        .unwrap_or(Level::Warn);

    if args.debug_flag || level == Level::Debug {
        level = Level::Debug;
        enable_debug();
    }

    let verbose = args.verbose || config.logging.verbose;
    if verbose {
        enable_verbose();
    }
    set_level(level);

    // File logging: CLI flag wins, otherwise config logging.file if set
    let config_log_path: Option<std::path::PathBuf> = if config.logging.file.is_empty() {
        None
    } else {
        Some(std::path::PathBuf::from(&config.logging.file))
    };

    if let Some(log_path) = args.log_file.as_ref().or(config_log_path.as_ref()) {
        let display_path = log_path.to_string_lossy();
        match init_file_logging(log_path) {
            Ok(()) if verbose => eprintln!("✓ File logging initialized at: {display_path}"),
            Ok(()) => info!("File logging initialized at: {display_path}"),
            Err(e) => eprintln!("✗ Failed to initialize file logging at {display_path}: {e}"),
        }
    }

    let ok = match args.command {
        Command::Generate {
            input,
            output,
            format,
            inline,
        } => {
            if inline {
                commands::generate::run_inline(&input, config)
            } else {
                let format = format.map_or(config.render.format, OutputFormat::from);
                commands::generate::run(&input, output.as_deref(), format, config)
            }
        }
        Command::Dot { input } => commands::generate::run_dot(&input, config),
        Command::List { input } => commands::list::run(&input, config),
        Command::Check => commands::check::run(config),
        // Edits are saved from the stored config so overrides stay runtime-only
        Command::Config { subcommand } => {
            let mut stored = stored;
            commands::config::run(subcommand, &mut stored, &defaults, args.config_path.as_deref());
            true
        }
    };

    if !ok {
        std::process::exit(1);
    }
}
