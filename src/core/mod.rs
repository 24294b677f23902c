//! Core course map functionality shared by the library and the CLI

pub mod config;
pub mod error;
pub mod graph;
pub mod map;
pub mod models;
pub mod parser;
pub mod render;

pub use error::{CourseMapError, ErrorKind, ExtractionError, FailureKind, RenderError};
pub use map::{
    check_engine_available, check_engine_available_with_config, generate_course_map,
    generate_inline_svg, get_engine_info, get_engine_info_with_config, inline_svg_or_diagnostic,
    CourseMap,
};
pub use render::OutputFormat;

/// Returns the current version of the `coursemap` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
