//! CLI command handlers for `coursemap`.
//!
//! This module provides handlers for the CLI subcommands.
//! Each command is implemented in its own submodule.

pub mod check;
pub mod config;
pub mod generate;
pub mod list;

use coursemap::{CourseMapError, ErrorKind};

/// Print a fatal error with a hint for the common cases
pub fn report_error(err: &CourseMapError) {
    eprintln!("✗ {err}");
    match err.kind() {
        ErrorKind::EngineNotFound | ErrorKind::EngineUnavailable => eprintln!(
            "\n\
            Course maps are laid out by Graphviz. Install it:\n\
            \n\
            • Ubuntu/Debian:  sudo apt install graphviz\n\
            • Fedora/RHEL:    sudo dnf install graphviz\n\
            • macOS:          brew install graphviz\n\
            • Windows:        Download from https://graphviz.org/download/\n\
            \n\
            Alternatively, point coursemap at an existing executable:\n\
            \x20 coursemap config set engine /path/to/dot\n\
            \n\
            The `dot` subcommand and `--format dot` work without Graphviz."
        ),
        ErrorKind::InputNotFound => {
            eprintln!("  Pass the directory holding your .qmd/.md course documents.");
        }
        _ => {}
    }
}
