//! Generate and dot command handlers

use std::path::{Path, PathBuf};

use coursemap::config::Config;
use coursemap::{CourseMap, OutputFormat};

use super::report_error;

/// Default output file for `format`
fn default_output(format: OutputFormat) -> PathBuf {
    PathBuf::from(format!("course_map.{}", format.extension()))
}

/// Render `input` into a file
pub fn run(input: &Path, output: Option<&Path>, format: OutputFormat, config: Config) -> bool {
    let output = output.map_or_else(|| default_output(format), Path::to_path_buf);

    match CourseMap::new(config).generate(input, &output, format) {
        Ok(path) => {
            println!("✓ Course map generated: {}", path.display());
            true
        }
        Err(e) => {
            report_error(&e);
            false
        }
    }
}

/// Print inline SVG for `input` to stdout
pub fn run_inline(input: &Path, config: Config) -> bool {
    match CourseMap::new(config).generate_inline_svg(input) {
        Ok(svg) => {
            println!("{svg}");
            true
        }
        Err(e) => {
            report_error(&e);
            false
        }
    }
}

/// Print the DOT description of `input` to stdout
pub fn run_dot(input: &Path, config: Config) -> bool {
    match CourseMap::new(config).generate_dot(input) {
        Ok(dot) => {
            print!("{dot}");
            true
        }
        Err(e) => {
            report_error(&e);
            false
        }
    }
}
