//! Front-matter extraction for course documents
//!
//! A course document starts with a YAML front-matter block whose course
//! block (by default under `course-map`) declares the course:
//!
//! ```yaml
//! ---
//! title: "Algorithms"
//! course-map:
//!   id: CS201
//!   phase: Pre
//!   prerequisites: [CS101]
//! ---
//! ```

use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};

use crate::core::error::{ExtractionError, SourcePosition};
use crate::core::models::{CourseRecord, UNKNOWN_PHASE};

/// Default front-matter key of the course block
pub const DEFAULT_ROOT_KEY: &str = "course-map";

const ID_KEY: &str = "id";
const TITLE_KEY: &str = "title";
const PHASE_KEY: &str = "phase";
const PREREQUISITES_KEY: &str = "prerequisites";

/// Raw front matter located at the top of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrontMatter<'a> {
    /// YAML between the delimiters
    yaml: &'a str,
    /// Document line number of the first YAML line (1-based)
    first_line: usize,
}

/// Extracts course records from document text
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    root_key: String,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_KEY)
    }
}

impl MetadataExtractor {
    /// Create an extractor looking for the course block under `root_key`
    #[must_use]
    pub fn new(root_key: impl Into<String>) -> Self {
        Self {
            root_key: root_key.into(),
        }
    }

    /// Front-matter key of the course block
    #[must_use]
    pub fn root_key(&self) -> &str {
        &self.root_key
    }

    /// Parse a document's front matter into a course record
    ///
    /// The returned record has an empty source path; the scanner fills it in.
    ///
    /// # Errors
    /// - [`ExtractionError::MissingMetadata`] when there is no front matter or no course block
    /// - [`ExtractionError::Malformed`] when the front matter is not valid YAML
    /// - [`ExtractionError::MissingField`] when the identifier or title is absent
    /// - [`ExtractionError::InvalidField`] when a field has an unusable value
    pub fn extract(&self, document: &str) -> Result<CourseRecord, ExtractionError> {
        let front = split_front_matter(document)?;
        let root = parse_yaml(front)?;

        let Some(root) = root else {
            return Err(ExtractionError::MissingMetadata(
                "front matter is empty".to_string(),
            ));
        };

        let block = match root.get(self.root_key.as_str()) {
            None => {
                return Err(ExtractionError::MissingMetadata(format!(
                    "front matter has no `{}` block",
                    self.root_key
                )))
            }
            Some(Value::Mapping(block)) => block,
            Some(_) => {
                return Err(ExtractionError::InvalidField {
                    field: self.root_key.clone(),
                    message: "expected a mapping of course fields".to_string(),
                })
            }
        };

        let id = scalar_field(block, ID_KEY)?.ok_or(ExtractionError::MissingField(ID_KEY))?;
        let title = match scalar_field(block, TITLE_KEY)? {
            Some(title) => title,
            None => scalar_field(&root, TITLE_KEY)?
                .ok_or(ExtractionError::MissingField(TITLE_KEY))?,
        };
        let phase = scalar_field(block, PHASE_KEY)?.unwrap_or_else(|| UNKNOWN_PHASE.to_string());
        let prerequisites = string_list(block, PREREQUISITES_KEY)?;

        let mut record = CourseRecord::new(id, title)
            .with_phase(phase)
            .with_prerequisites(prerequisites);
        record.attributes = attributes(block);
        Ok(record)
    }
}

/// Parse a document with the default course block key
///
/// # Errors
/// See [`MetadataExtractor::extract`].
pub fn extract(document: &str) -> Result<CourseRecord, ExtractionError> {
    MetadataExtractor::default().extract(document)
}

/// Locate the `---` delimited block on the first line of the document
fn split_front_matter(document: &str) -> Result<FrontMatter<'_>, ExtractionError> {
    let text = document.strip_prefix('\u{feff}').unwrap_or(document);
    let mut lines = text.split_inclusive('\n');

    let opening = lines.next().unwrap_or_default();
    if opening.trim_end() != "---" {
        return Err(ExtractionError::MissingMetadata(
            "no front matter block at the top of the document".to_string(),
        ));
    }

    let start = opening.len();
    let mut end = start;
    for line in lines {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            return Ok(FrontMatter {
                yaml: &text[start..end],
                first_line: 2,
            });
        }
        end += line.len();
    }

    Err(ExtractionError::Malformed {
        position: None,
        message: "front matter block is not closed".to_string(),
    })
}

/// Parse the block; `None` for an empty block
fn parse_yaml(front: FrontMatter<'_>) -> Result<Option<Mapping>, ExtractionError> {
    if front.yaml.trim().is_empty() {
        return Ok(None);
    }
    let value: Value = serde_yaml::from_str(front.yaml).map_err(|err| {
        let position = err.location().map(|loc| SourcePosition {
            line: front.first_line + loc.line().saturating_sub(1),
            column: loc.column(),
        });
        ExtractionError::Malformed {
            position,
            message: err.to_string(),
        }
    })?;

    match value {
        Value::Null => Ok(None),
        Value::Mapping(mapping) => Ok(Some(mapping)),
        _ => Err(ExtractionError::Malformed {
            position: Some(SourcePosition {
                line: front.first_line,
                column: 1,
            }),
            message: "front matter is not a key-value mapping".to_string(),
        }),
    }
}

/// Render a YAML scalar as text
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a single non-empty scalar field; `Ok(None)` when absent or null
fn scalar_field(block: &Mapping, key: &str) -> Result<Option<String>, ExtractionError> {
    match block.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let text = scalar_to_string(value).ok_or_else(|| ExtractionError::InvalidField {
                field: key.to_string(),
                message: "expected a single value".to_string(),
            })?;
            let text = text.trim();
            if text.is_empty() {
                return Err(ExtractionError::InvalidField {
                    field: key.to_string(),
                    message: "value is empty".to_string(),
                });
            }
            Ok(Some(text.to_string()))
        }
    }
}

/// Read a list of identifiers; a single scalar counts as a one-element list
fn string_list(block: &Mapping, key: &str) -> Result<Vec<String>, ExtractionError> {
    let invalid = |message: String| ExtractionError::InvalidField {
        field: key.to_string(),
        message,
    };

    let items: Vec<&Value> = match block.get(key) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Sequence(items)) => items.iter().collect(),
        Some(value) => vec![value],
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let text = scalar_to_string(item)
                .ok_or_else(|| invalid(format!("entry {} is not an identifier", index + 1)))?;
            let text = text.trim();
            if text.is_empty() {
                return Err(invalid(format!("entry {} is empty", index + 1)));
            }
            Ok(text.to_string())
        })
        .collect()
}

/// Every other scalar field of the course block
fn attributes(block: &Mapping) -> BTreeMap<String, String> {
    block
        .iter()
        .filter_map(|(key, value)| Some((scalar_to_string(key)?, scalar_to_string(value)?)))
        .filter(|(key, _)| {
            !matches!(
                key.as_str(),
                ID_KEY | TITLE_KEY | PHASE_KEY | PREREQUISITES_KEY
            )
        })
        .collect()
}
