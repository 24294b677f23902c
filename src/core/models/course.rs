//! Course record model

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Phase used when a course block does not declare one
pub const UNKNOWN_PHASE: &str = "Unknown";

/// One course, as declared by the front matter of one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    /// Unique course identifier (e.g., "CS201")
    pub id: String,

    /// Display title (e.g., "Algorithms")
    pub title: String,

    /// Teaching phase (e.g., "Pre", "InClass"); selects the node colour
    pub phase: String,

    /// Declared prerequisite identifiers, in declaration order
    pub prerequisites: Vec<String>,

    /// Document the record was extracted from
    pub source: PathBuf,

    /// Remaining scalar fields of the course block
    pub attributes: BTreeMap<String, String>,
}

impl CourseRecord {
    /// Create a record with no prerequisites, the unknown phase and no source path
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            phase: UNKNOWN_PHASE.to_string(),
            prerequisites: Vec::new(),
            source: PathBuf::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Set the phase
    #[must_use]
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    /// Set the source document
    #[must_use]
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = source.into();
        self
    }

    /// Append prerequisites, skipping ones already declared
    #[must_use]
    pub fn with_prerequisites<I, S>(mut self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for prereq in prerequisites {
            self.add_prerequisite(prereq.into());
        }
        self
    }

    /// Add a free-form attribute
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    fn add_prerequisite(&mut self, prereq_key: String) {
        if !self.prerequisites.contains(&prereq_key) {
            self.prerequisites.push(prereq_key);
        }
    }

    /// Document the record came from
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_creation() {
        let course = CourseRecord::new("CS101", "Intro");

        assert_eq!(course.id, "CS101");
        assert_eq!(course.title, "Intro");
        assert_eq!(course.phase, UNKNOWN_PHASE);
        assert!(course.prerequisites.is_empty());
        assert!(course.attributes.is_empty());
        assert_eq!(course.source(), Path::new(""));
    }

    #[test]
    fn test_prerequisites_keep_order_and_skip_duplicates() {
        let course = CourseRecord::new("CS301", "Compilers").with_prerequisites([
            "CS201", "MATH101", "CS201",
        ]);

        assert_eq!(course.prerequisites, vec!["CS201", "MATH101"]);
    }

    #[test]
    fn test_builder_fields() {
        let course = CourseRecord::new("CS201", "Algorithms")
            .with_phase("Pre")
            .with_source("courses/algorithms.qmd")
            .with_attribute("credits", "4");

        assert_eq!(course.phase, "Pre");
        assert_eq!(course.source(), Path::new("courses/algorithms.qmd"));
        assert_eq!(course.attributes.get("credits").map(String::as_str), Some("4"));
    }
}
