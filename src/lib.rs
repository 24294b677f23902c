//! Course dependency maps from annotated Quarto/Markdown documents
//!
//! Documents carry a `course-map` block in their YAML front matter. The
//! library scans a directory of them, builds the prerequisite graph and
//! renders it through Graphviz.

pub mod core;
pub mod logger;

pub use crate::core::*;
