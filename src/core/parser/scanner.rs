//! Document tree scanner
//!
//! Collects every candidate document under a root directory, extracts its
//! course record, and aggregates the results. A broken document is recorded
//! as a failure and never stops the scan.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use super::metadata::MetadataExtractor;
use crate::core::config::Config;
use crate::core::error::{CourseMapError, FailureKind};
use crate::core::models::{ParseFailure, ScanResult};
use crate::{debug, info};

/// Scan `root` for course documents
///
/// Documents are processed in path order, so the collision policy always
/// resolves the same way for the same tree.
///
/// # Errors
/// Returns [`CourseMapError::InputNotFound`] when `root` does not exist, is
/// not a directory, or cannot be listed. Everything below the root is
/// reported on the returned [`ScanResult`] instead.
pub fn scan_directory<P: AsRef<Path>>(root: P, config: &Config) -> Result<ScanResult, CourseMapError> {
    let root = root.as_ref();
    let input_not_found = |message: String| CourseMapError::InputNotFound {
        path: root.to_path_buf(),
        message,
    };

    let metadata = fs::metadata(root).map_err(|e| input_not_found(e.to_string()))?;
    if !metadata.is_dir() {
        return Err(input_not_found("not a directory".to_string()));
    }
    fs::read_dir(root).map_err(|e| input_not_found(e.to_string()))?;

    let mut result = ScanResult::new();
    let mut documents = collect_documents(root, config, &mut result);
    documents.sort();

    info!(
        "Scanning {} candidate document(s) under {}",
        documents.len(),
        root.display()
    );

    let extractor = MetadataExtractor::new(config.scan.root_key.clone());
    for path in documents {
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                result.record_failure(ParseFailure::new(path, FailureKind::Unreadable, e.to_string()));
                continue;
            }
        };

        match extractor.extract(&text) {
            Ok(record) => {
                debug!("Found course {} in {}", record.id, path.display());
                let _ = result.insert(record.with_source(path), config.scan.collision);
            }
            Err(err) => result.record_failure(ParseFailure::from_extraction(path, &err)),
        }
    }

    Ok(result)
}

/// Walk the tree under `root` and return the candidate documents
///
/// Hidden entries are skipped. `.gitignore` and `.ignore` files are not
/// consulted; the configured ignore patterns are the only filter.
fn collect_documents(root: &Path, config: &Config, result: &mut ScanResult) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(true)
        .build();

    let mut documents = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = error_path(&err).unwrap_or(root).to_path_buf();
                result.record_failure(ParseFailure::new(
                    path,
                    FailureKind::Unreadable,
                    err.to_string(),
                ));
                continue;
            }
        };

        let path = entry.path();
        if entry.file_type().is_some_and(|t| t.is_dir())
            || !path.is_file()
            || !config.accepts_extension(path)
        {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if config.should_ignore(relative) {
            debug!("Ignoring {}", relative.display());
            continue;
        }
        documents.push(path.to_path_buf());
    }
    documents
}

/// Path an error from the walker refers to, if it names one
fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child.as_path()),
        ignore::Error::Partial(errs) => errs.iter().find_map(error_path),
        _ => None,
    }
}
