//! Config command handler

use crate::args::ConfigSubcommand;
use coursemap::config::Config;
use std::io::{self, Write};
use std::path::Path;

/// Dispatch config subcommands
///
/// Changes are saved to `config_path` when one was given on the command line,
/// otherwise to the user config file.
pub fn run(
    subcommand: Option<ConfigSubcommand>,
    config: &mut Config,
    defaults: &Config,
    config_path: Option<&Path>,
) {
    match subcommand {
        None => handle_config_get(config, None),
        Some(ConfigSubcommand::Get { key }) => handle_config_get(config, key),
        Some(ConfigSubcommand::Set { key, value }) => {
            handle_config_set(config, &key, &value, config_path);
        }
        Some(ConfigSubcommand::Unset { key }) => {
            handle_config_unset(config, defaults, &key, config_path);
        }
        Some(ConfigSubcommand::Reset) => handle_config_reset(),
    }
}

fn save(config: &Config, config_path: Option<&Path>) {
    let result = match config_path {
        Some(path) => config.save_to(path),
        None => config.save(),
    };
    if let Err(e) = result {
        eprintln!("Failed to save config: {e}");
        std::process::exit(1);
    }
}

/// Handle the config get subcommand
pub fn handle_config_get(config: &Config, key: Option<String>) {
    if let Some(k) = key {
        // Print specific config value
        match config.get(&k) {
            Some(value) => println!("{value}"),
            None => eprintln!("Unknown config key: '{k}'"),
        }
    } else {
        // Print all config values
        println!("\n=== Configuration ===\n");
        print!("{config}");
    }
}

/// Handle the config set subcommand
pub fn handle_config_set(config: &mut Config, key: &str, value: &str, config_path: Option<&Path>) {
    if let Err(e) = config.set(key, value) {
        eprintln!("{e}");
        std::process::exit(1);
    }
    save(config, config_path);

    println!("✓ Set {key} = {value}");
}

/// Handle the config unset subcommand
pub fn handle_config_unset(
    config: &mut Config,
    defaults: &Config,
    key: &str,
    config_path: Option<&Path>,
) {
    if let Err(e) = config.unset(key, defaults) {
        eprintln!("{e}");
        std::process::exit(1);
    }
    save(config, config_path);

    println!("✓ Reset {key} to default");
}

/// Handle the config reset subcommand
pub fn handle_config_reset() {
    if !Config::get_config_file_path().exists() {
        println!("✓ Config is already at defaults");
        return;
    }

    // Ask for confirmation
    print!("Are you sure you want to reset config to defaults? (y/n): ");
    io::stdout().flush().ok();

    let mut response = String::new();
    io::stdin().read_line(&mut response).ok();

    if response.trim().eq_ignore_ascii_case("y") || response.trim().eq_ignore_ascii_case("yes") {
        if let Err(e) = Config::reset() {
            eprintln!("Failed to remove config file: {e}");
            std::process::exit(1);
        }
        println!("✓ Config reset to defaults");
    } else {
        println!("✗ Reset cancelled");
    }
}
