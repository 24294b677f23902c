//! Aggregate result of scanning a document tree

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::CourseRecord;
use crate::core::error::{ExtractionError, FailureKind};

/// What to do when two documents declare the same course identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Keep the record seen first (documents are visited in path order)
    #[default]
    FirstWins,
    /// Replace the earlier record with the later one
    LastWins,
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-wins" | "first" => Ok(Self::FirstWins),
            "last-wins" | "last" => Ok(Self::LastWins),
            _ => Err(format!(
                "Unknown collision policy: '{s}' (expected first-wins or last-wins)"
            )),
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstWins => write!(f, "first-wins"),
            Self::LastWins => write!(f, "last-wins"),
        }
    }
}

/// A document that could not be turned into a course record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// Offending file (or directory, for unreadable subdirectories)
    pub path: PathBuf,
    /// Failure classification
    pub kind: FailureKind,
    /// Human-readable diagnostic
    pub message: String,
}

impl ParseFailure {
    /// Create a failure record
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }

    /// Record an extraction error for `path`
    #[must_use]
    pub fn from_extraction(path: impl Into<PathBuf>, err: &ExtractionError) -> Self {
        Self::new(path, err.kind(), err.to_string())
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.path.display(), self.kind, self.message)
    }
}

/// Two documents declared the same identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierCollision {
    /// Shared identifier
    pub id: String,
    /// Document whose record is kept
    pub kept: PathBuf,
    /// Document whose record is discarded
    pub rejected: PathBuf,
}

impl fmt::Display for IdentifierCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "course '{}' declared twice: keeping {}, ignoring {}",
            self.id,
            self.kept.display(),
            self.rejected.display()
        )
    }
}

/// Records found by a scan, keyed by identifier, plus everything that went wrong
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    records: BTreeMap<String, CourseRecord>,
    failures: Vec<ParseFailure>,
    collisions: Vec<IdentifierCollision>,
}

impl ScanResult {
    /// Create an empty result
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, resolving an identifier collision with `policy`
    ///
    /// Returns the collision when one occurred; it is also kept on the result.
    pub fn insert(
        &mut self,
        record: CourseRecord,
        policy: CollisionPolicy,
    ) -> Option<&IdentifierCollision> {
        let collision = match self.records.entry(record.id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
                return None;
            }
            Entry::Occupied(mut slot) => match policy {
                CollisionPolicy::FirstWins => IdentifierCollision {
                    id: record.id,
                    kept: slot.get().source.clone(),
                    rejected: record.source,
                },
                CollisionPolicy::LastWins => {
                    let kept = record.source.clone();
                    let previous = slot.insert(record);
                    IdentifierCollision {
                        id: previous.id,
                        kept,
                        rejected: previous.source,
                    }
                }
            },
        };
        self.collisions.push(collision);
        self.collisions.last()
    }

    /// Record a per-document failure
    pub fn record_failure(&mut self, failure: ParseFailure) {
        self.failures.push(failure);
    }

    /// Records keyed by identifier
    #[must_use]
    pub const fn records(&self) -> &BTreeMap<String, CourseRecord> {
        &self.records
    }

    /// Look up a record
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CourseRecord> {
        self.records.get(id)
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Per-document failures in the order they were found
    #[must_use]
    pub fn failures(&self) -> &[ParseFailure] {
        &self.failures
    }

    /// Identifier collisions in the order they were found
    #[must_use]
    pub fn collisions(&self) -> &[IdentifierCollision] {
        &self.collisions
    }

    /// Give up ownership of the records
    #[must_use]
    pub fn into_records(self) -> BTreeMap<String, CourseRecord> {
        self.records
    }
}
