//! Check command handler

use coursemap::config::Config;
use coursemap::{CourseMap, CourseMapError};

use super::report_error;

/// Probe the configured engine; `false` when it cannot be used
pub fn run(config: Config) -> bool {
    let probe = CourseMap::new(config).probe_engine();
    if probe.available {
        println!("✓ {}", probe);
        true
    } else {
        report_error(&CourseMapError::EngineUnavailable {
            engine: probe.engine,
            details: probe.details,
        });
        false
    }
}
