//! Directed graph of course prerequisites
//!
//! Edges point from a prerequisite to the course that requires it, so
//! `CS101 -> CS201` reads "CS101 comes before CS201". The graph keeps two
//! association lists, `prerequisites` (course -> what it requires) and
//! `dependents` (course -> what requires it), so traversal is cheap in both
//! directions.
//!
//! Unlike a strict DAG the graph tolerates cycles and undefined references:
//! both are kept as warnings so an inconsistent catalog can still be drawn.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use super::CourseRecord;

/// A resolved prerequisite relationship
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Prerequisite course
    pub from: String,
    /// Course that requires `from`
    pub to: String,
}

/// A declared prerequisite that names no known course
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Course that declared the prerequisite
    pub course: String,
    /// Identifier that could not be resolved
    pub missing: String,
}

/// A prerequisite cycle, listed in edge direction and starting at its smallest identifier
///
/// `["A", "B", "C"]` means `A -> B -> C -> A`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cycle {
    path: Vec<String>,
}

impl Cycle {
    /// Build a cycle from a path, rotating it so the smallest identifier comes first
    #[must_use]
    pub fn new(mut path: Vec<String>) -> Self {
        if let Some(start) = path
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.cmp(b.1))
            .map(|(index, _)| index)
        {
            path.rotate_left(start);
        }
        Self { path }
    }

    /// Courses on the cycle, in edge direction
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Whether `from -> to` is one of the cycle's edges
    #[must_use]
    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        let len = self.path.len();
        (0..len).any(|i| self.path[i] == from && self.path[(i + 1) % len] == to)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut path = self.path.join(" → ");
        if let Some(first) = self.path.first() {
            path.push_str(" → ");
            path.push_str(first);
        }
        f.write_str(&path)
    }
}

/// Structural problem attached to a graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphWarning {
    /// A prerequisite names no known course
    DanglingReference(DanglingReference),
    /// Prerequisites form a cycle
    Cycle(Cycle),
}

impl fmt::Display for GraphWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingReference(r) => write!(
                f,
                "course '{}' requires unknown course '{}'",
                r.course, r.missing
            ),
            Self::Cycle(c) => write!(f, "prerequisite cycle: {c}"),
        }
    }
}

/// Course dependency graph
///
/// Built by [`build_graph`](crate::core::graph::build_graph); read-only once built.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Maps course key -> record, iterated in identifier order
    nodes: BTreeMap<String, CourseRecord>,

    /// Maps course key -> resolved prerequisite keys, in declaration order
    prerequisites: HashMap<String, Vec<String>>,

    /// Maps course key -> keys of the courses that require it
    dependents: HashMap<String, Vec<String>>,

    /// Resolved edges in insertion order
    edges: Vec<Edge>,

    /// Unresolved prerequisites in discovery order
    dangling: Vec<DanglingReference>,

    /// Detected cycles
    cycles: Vec<Cycle>,
}

impl DependencyGraph {
    /// Create a new empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a course node; an existing node with the same key is kept
    pub(crate) fn add_course(&mut self, record: CourseRecord) {
        let key = record.id.clone();
        if !self.nodes.contains_key(&key) {
            self.prerequisites.entry(key.clone()).or_default();
            self.dependents.entry(key.clone()).or_default();
            self.nodes.insert(key, record);
        }
    }

    /// Add a prerequisite edge between two existing nodes
    ///
    /// Returns `false` (and adds nothing) when either endpoint is unknown.
    pub(crate) fn add_edge(&mut self, prerequisite: &str, course: &str) -> bool {
        if !self.contains_course(prerequisite) || !self.contains_course(course) {
            return false;
        }

        if let Some(prereqs) = self.prerequisites.get_mut(course) {
            if prereqs.iter().any(|p| p == prerequisite) {
                return true;
            }
            prereqs.push(prerequisite.to_string());
        }
        if let Some(deps) = self.dependents.get_mut(prerequisite) {
            deps.push(course.to_string());
        }
        self.edges.push(Edge {
            from: prerequisite.to_string(),
            to: course.to_string(),
        });
        true
    }

    /// Track a prerequisite that names no node
    pub(crate) fn add_dangling(&mut self, course: &str, missing: &str) {
        self.dangling.push(DanglingReference {
            course: course.to_string(),
            missing: missing.to_string(),
        });
    }

    pub(crate) fn set_cycles(&mut self, cycles: Vec<Cycle>) {
        self.cycles = cycles;
    }

    /// Course records in identifier order
    pub fn courses(&self) -> impl Iterator<Item = &CourseRecord> {
        self.nodes.values()
    }

    /// Course identifiers in identifier order
    pub fn course_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Look up a course
    #[must_use]
    pub fn course(&self, key: &str) -> Option<&CourseRecord> {
        self.nodes.get(key)
    }

    /// Check if a course exists in the graph
    #[must_use]
    pub fn contains_course(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Resolved prerequisites of a course (empty for unknown courses)
    #[must_use]
    pub fn prerequisites(&self, key: &str) -> &[String] {
        self.prerequisites.get(key).map_or(&[], Vec::as_slice)
    }

    /// Courses that require `key` (empty for unknown courses)
    #[must_use]
    pub fn dependents(&self, key: &str) -> &[String] {
        self.dependents.get(key).map_or(&[], Vec::as_slice)
    }

    /// Resolved edges, prerequisite first
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// All dangling references
    #[must_use]
    pub fn dangling_references(&self) -> &[DanglingReference] {
        &self.dangling
    }

    /// Unresolved prerequisite identifiers declared by `key`
    pub fn dangling_for<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.dangling
            .iter()
            .filter(move |r| r.course == key)
            .map(|r| r.missing.as_str())
    }

    /// Detected cycles
    #[must_use]
    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    /// Whether an edge lies on any detected cycle
    #[must_use]
    pub fn is_cycle_edge(&self, edge: &Edge) -> bool {
        self.cycles
            .iter()
            .any(|c| c.contains_edge(&edge.from, &edge.to))
    }

    /// Courses that lie on at least one cycle
    #[must_use]
    pub fn courses_on_cycles(&self) -> HashSet<&str> {
        self.cycles
            .iter()
            .flat_map(|c| c.path().iter().map(String::as_str))
            .collect()
    }

    /// Dangling references followed by cycles
    #[must_use]
    pub fn warnings(&self) -> Vec<GraphWarning> {
        self.dangling
            .iter()
            .cloned()
            .map(GraphWarning::DanglingReference)
            .chain(self.cycles.iter().cloned().map(GraphWarning::Cycle))
            .collect()
    }

    /// Get the number of courses in the graph
    #[must_use]
    pub fn course_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of resolved edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

impl fmt::Display for DependencyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Course map ({} courses):", self.nodes.len())?;
        writeln!(f)?;

        for key in self.nodes.keys() {
            let prereqs = self.prerequisites(key);
            if prereqs.is_empty() {
                writeln!(f, "  {key} ← (no prerequisites)")?;
            } else {
                writeln!(f, "  {key} ← {}", prereqs.join(", "))?;
            }
        }

        let warnings = self.warnings();
        if !warnings.is_empty() {
            writeln!(f)?;
            writeln!(f, "Warnings:")?;
            for warning in warnings {
                writeln!(f, "  {warning}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(ids: &[&str]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for id in ids {
            graph.add_course(CourseRecord::new(*id, format!("Course {id}")));
        }
        graph
    }

    #[test]
    fn test_graph_creation() {
        let graph = DependencyGraph::new();
        assert_eq!(graph.course_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_add_edge() {
        let mut graph = graph_with(&["CS101", "CS201"]);
        assert!(graph.add_edge("CS101", "CS201"));

        assert_eq!(graph.prerequisites("CS201"), ["CS101".to_string()]);
        assert_eq!(graph.dependents("CS101"), ["CS201".to_string()]);
        assert_eq!(
            graph.edges(),
            [Edge {
                from: "CS101".to_string(),
                to: "CS201".to_string()
            }]
        );
    }

    #[test]
    fn test_edge_to_unknown_course_is_refused() {
        let mut graph = graph_with(&["CS201"]);
        assert!(!graph.add_edge("CS999", "CS201"));
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.contains_course("CS999"));
    }

    #[test]
    fn test_duplicate_edge() {
        let mut graph = graph_with(&["CS101", "CS201"]);
        graph.add_edge("CS101", "CS201");
        graph.add_edge("CS101", "CS201");

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.prerequisites("CS201").len(), 1);
    }

    #[test]
    fn test_dangling_for() {
        let mut graph = graph_with(&["CS201"]);
        graph.add_dangling("CS201", "CS999");
        graph.add_dangling("CS201", "MATH999");

        let missing: Vec<_> = graph.dangling_for("CS201").collect();
        assert_eq!(missing, vec!["CS999", "MATH999"]);
        assert_eq!(graph.dangling_for("CS101").count(), 0);
    }

    #[test]
    fn test_cycle_is_rotated_to_smallest_identifier() {
        let cycle = Cycle::new(vec!["C".into(), "A".into(), "B".into()]);
        assert_eq!(cycle.path(), ["A", "B", "C"]);
        assert!(cycle.contains_edge("C", "A"));
        assert!(cycle.contains_edge("A", "B"));
        assert!(!cycle.contains_edge("B", "A"));
        assert_eq!(cycle.to_string(), "A → B → C → A");
    }

    #[test]
    fn test_graph_display() {
        let mut graph = graph_with(&["CS101", "CS201"]);
        graph.add_edge("CS101", "CS201");
        graph.add_dangling("CS201", "CS999");

        let display = format!("{graph}");
        assert!(display.contains("Course map (2 courses)"));
        assert!(display.contains("CS101 ← (no prerequisites)"));
        assert!(display.contains("CS201 ← CS101"));
        assert!(display.contains("requires unknown course 'CS999'"));
    }
}
