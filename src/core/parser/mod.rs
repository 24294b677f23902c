//! Document parsing: front-matter extraction and directory scanning

pub mod metadata;
pub mod scanner;

pub use metadata::{extract, MetadataExtractor, DEFAULT_ROOT_KEY};
pub use scanner::scan_directory;
