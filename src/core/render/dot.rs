//! Graphviz DOT generator for course maps
//!
//! Produces a `digraph` with one node statement per course and one edge
//! statement per resolved prerequisite. Output depends only on the graph and
//! the configuration, so identical inputs give byte-identical text.

use std::fmt::Write;

use crate::core::config::Config;
use crate::core::error::RenderError;
use crate::core::models::{CourseRecord, DependencyGraph};

/// Generator for DOT graph descriptions
pub struct DotGenerator;

impl DotGenerator {
    /// Generate the DOT description of a course map
    ///
    /// # Errors
    /// Returns [`RenderError::SerializationFailed`] when an identifier, title or
    /// phase contains a control character other than a newline.
    pub fn generate(graph: &DependencyGraph, config: &Config) -> Result<String, RenderError> {
        let mut output = String::from("digraph CourseMap {\n");
        let _ = writeln!(output, "    rankdir={};", quote(&config.render.rankdir)?);
        output.push_str("    node [shape=box, style=\"rounded,filled\"];\n");

        if graph.course_count() > 0 {
            output.push('\n');
        }
        for course in graph.courses() {
            Self::write_node(&mut output, graph, course, config)?;
        }

        if graph.edge_count() > 0 {
            output.push('\n');
        }
        for edge in graph.edges() {
            let _ = write!(output, "    {} -> {}", quote(&edge.from)?, quote(&edge.to)?);
            if graph.is_cycle_edge(edge) {
                output.push_str(" [color=\"red\"]");
            }
            output.push_str(";\n");
        }

        output.push_str("}\n");
        Ok(output)
    }

    fn write_node(
        output: &mut String,
        graph: &DependencyGraph,
        course: &CourseRecord,
        config: &Config,
    ) -> Result<(), RenderError> {
        let missing: Vec<&str> = graph.dangling_for(&course.id).collect();
        let tooltip = if missing.is_empty() {
            course.id.clone()
        } else {
            format!("{}\nunresolved prerequisites: {}", course.id, missing.join(", "))
        };

        let _ = write!(
            output,
            "    {} [label={}, fillcolor={}, tooltip={}",
            quote(&course.id)?,
            quote(&course.title)?,
            quote(config.phase_color(&course.phase))?,
            quote(&tooltip)?
        );
        if !missing.is_empty() {
            output.push_str(", color=\"red\", penwidth=2");
        }
        output.push_str("];\n");
        Ok(())
    }
}

/// Double-quote a DOT string, escaping quotes, backslashes and newlines
fn quote(value: &str) -> Result<String, RenderError> {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            c if c.is_control() => {
                return Err(RenderError::SerializationFailed(format!(
                    "control character U+{:04X} in {value:?}",
                    u32::from(c)
                )));
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    Ok(quoted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::build_graph;
    use crate::core::models::{CollisionPolicy, ScanResult};

    fn graph_of(records: Vec<CourseRecord>) -> DependencyGraph {
        let mut scan = ScanResult::new();
        for record in records {
            let _ = scan.insert(record, CollisionPolicy::FirstWins);
        }
        build_graph(scan)
    }

    #[test]
    fn test_two_course_map() {
        let graph = graph_of(vec![
            CourseRecord::new("CS101", "Intro").with_phase("Pre"),
            CourseRecord::new("CS201", "Algorithms").with_prerequisites(["CS101"]),
        ]);

        let dot = DotGenerator::generate(&graph, &Config::default()).unwrap();

        assert_eq!(
            dot,
            "digraph CourseMap {\n\
             \x20   rankdir=\"TB\";\n\
             \x20   node [shape=box, style=\"rounded,filled\"];\n\
             \n\
             \x20   \"CS101\" [label=\"Intro\", fillcolor=\"lightblue\", tooltip=\"CS101\"];\n\
             \x20   \"CS201\" [label=\"Algorithms\", fillcolor=\"lightgray\", tooltip=\"CS201\"];\n\
             \n\
             \x20   \"CS101\" -> \"CS201\";\n\
             }\n"
        );
    }

    #[test]
    fn test_edge_count_matches_graph() {
        let graph = graph_of(vec![
            CourseRecord::new("A", "A"),
            CourseRecord::new("B", "B").with_prerequisites(["A"]),
            CourseRecord::new("C", "C").with_prerequisites(["A", "B"]),
        ]);

        let dot = DotGenerator::generate(&graph, &Config::default()).unwrap();
        assert_eq!(dot.matches(" -> ").count(), 3);
    }

    #[test]
    fn test_dangling_node_is_marked() {
        let graph = graph_of(vec![
            CourseRecord::new("CS201", "Algorithms").with_prerequisites(["CS999"]),
        ]);

        let dot = DotGenerator::generate(&graph, &Config::default()).unwrap();

        assert!(dot.contains(
            "\"CS201\" [label=\"Algorithms\", fillcolor=\"lightgray\", \
             tooltip=\"CS201\\nunresolved prerequisites: CS999\", color=\"red\", penwidth=2];"
        ));
        assert!(!dot.contains("\"CS999\""));
        assert!(!dot.contains(" -> "));
    }

    #[test]
    fn test_cycle_edges_are_red() {
        let graph = graph_of(vec![
            CourseRecord::new("A", "A").with_prerequisites(["B"]),
            CourseRecord::new("B", "B").with_prerequisites(["A"]),
            CourseRecord::new("C", "C").with_prerequisites(["A"]),
        ]);

        let dot = DotGenerator::generate(&graph, &Config::default()).unwrap();

        assert!(dot.contains("\"B\" -> \"A\" [color=\"red\"];"));
        assert!(dot.contains("\"A\" -> \"B\" [color=\"red\"];"));
        assert!(dot.contains("\"A\" -> \"C\";"));
    }

    #[test]
    fn test_special_characters_are_escaped() {
        let graph = graph_of(vec![CourseRecord::new(
            "CS \"101\"",
            "Paths: C:\\tmp\nand more",
        )]);

        let dot = DotGenerator::generate(&graph, &Config::default()).unwrap();

        assert!(dot.contains("\"CS \\\"101\\\"\" [label=\"Paths: C:\\\\tmp\\nand more\""));
    }

    #[test]
    fn test_control_character_fails() {
        let graph = graph_of(vec![CourseRecord::new("CS101", "Bad\u{7}title")]);

        let err = DotGenerator::generate(&graph, &Config::default()).unwrap_err();
        assert!(matches!(err, RenderError::SerializationFailed(_)));
    }

    #[test]
    fn test_rankdir_and_phase_colours_follow_config() {
        let mut config = Config::default();
        config.set("rankdir", "lr").unwrap();
        config.set("phase.Lab", "gold").unwrap();
        let graph = graph_of(vec![CourseRecord::new("CS101", "Intro").with_phase("Lab")]);

        let dot = DotGenerator::generate(&graph, &config).unwrap();

        assert!(dot.contains("rankdir=\"LR\";"));
        assert!(dot.contains("fillcolor=\"gold\""));
    }

    #[test]
    fn test_output_is_deterministic() {
        let records = || {
            vec![
                CourseRecord::new("Z1", "Z").with_prerequisites(["A1", "M1"]),
                CourseRecord::new("A1", "A"),
                CourseRecord::new("M1", "M").with_prerequisites(["A1"]),
            ]
        };
        let first = DotGenerator::generate(&graph_of(records()), &Config::default()).unwrap();
        let second = DotGenerator::generate(&graph_of(records()), &Config::default()).unwrap();
        assert_eq!(first, second);
    }
}
