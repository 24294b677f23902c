//! End-to-end tests for scan → build → render

use coursemap::config::Config;
use coursemap::graph::build_graph;
use coursemap::models::{CollisionPolicy, GraphWarning};
use coursemap::parser::scan_directory;
use coursemap::render::{AvailabilityInfo, Engine};
use coursemap::{
    check_engine_available_with_config, generate_course_map, generate_inline_svg,
    get_engine_info_with_config, inline_svg_or_diagnostic, CourseMap, ErrorKind, FailureKind,
    OutputFormat, RenderError,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MISSING_ENGINE: &str = "/nonexistent/coursemap-tests/dot";

fn write_doc(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn course_doc(id: &str, title: &str, prereqs: &[&str]) -> String {
    format!(
        "---\ntitle: \"{title}\"\ncourse-map:\n  id: {id}\n  prerequisites: [{}]\n---\n\nBody.\n",
        prereqs.join(", ")
    )
}

fn samples_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("samples/courses")
}

/// Config file pointing the engine at an executable that does not exist
fn missing_engine_config(dir: &Path) -> PathBuf {
    let path = dir.join("coursemap.toml");
    fs::write(&path, format!("[render]\nengine = \"{MISSING_ENGINE}\"\n")).unwrap();
    path
}

/// Engine returning a canned SVG document
struct CannedSvg;

impl Engine for CannedSvg {
    fn name(&self) -> &str {
        "canned"
    }

    fn probe(&self) -> AvailabilityInfo {
        AvailabilityInfo {
            engine: "canned".to_string(),
            available: true,
            details: "canned version 1".to_string(),
        }
    }

    fn render(&self, description: &str, _format: OutputFormat) -> Result<Vec<u8>, RenderError> {
        let nodes = description.matches("tooltip=").count();
        Ok(format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n\
             <!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\"\n \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n\
             <svg data-nodes=\"{nodes}\"></svg>\n"
        )
        .into_bytes())
    }
}

#[test]
fn two_courses_give_one_prerequisite_edge() {
    let dir = TempDir::new().unwrap();
    write_doc(dir.path(), "intro.qmd", &course_doc("CS101", "Intro", &[]));
    write_doc(dir.path(), "algorithms.qmd", &course_doc("CS201", "Algorithms", &["CS101"]));

    let dot = CourseMap::new(Config::default())
        .generate_dot(dir.path())
        .unwrap();

    assert_eq!(dot.matches("[label=").count(), 2);
    assert_eq!(dot.matches(" -> ").count(), 1);
    assert!(dot.contains("\"CS101\" -> \"CS201\";"));
    assert!(dot.contains("label=\"Intro\""));
    assert!(dot.contains("label=\"Algorithms\""));
}

#[test]
fn undefined_prerequisite_is_dangling() {
    let dir = TempDir::new().unwrap();
    write_doc(dir.path(), "algorithms.qmd", &course_doc("CS201", "Algorithms", &["CS999"]));

    let scan = scan_directory(dir.path(), &Config::default()).unwrap();
    let graph = build_graph(scan);

    assert_eq!(graph.course_count(), 1);
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(graph.dangling_references().len(), 1);
    assert_eq!(graph.dangling_references()[0].course, "CS201");
    assert_eq!(graph.dangling_references()[0].missing, "CS999");
}

#[test]
fn inline_mode_without_engine_is_engine_not_found() {
    let dir = TempDir::new().unwrap();
    write_doc(dir.path(), "courses/intro.qmd", &course_doc("CS101", "Intro", &[]));
    let config_path = missing_engine_config(dir.path());
    let input = dir.path().join("courses");

    let err = generate_inline_svg(&input, Some(config_path.as_path())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EngineNotFound);

    let placeholder = inline_svg_or_diagnostic(&input, Some(config_path.as_path()));
    assert!(placeholder.starts_with("<!-- Course Map Error:"));
    assert!(placeholder.contains(MISSING_ENGINE));
    assert!(placeholder.ends_with("-->"));
}

#[test]
fn missing_input_directory_is_reported() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");

    let err = generate_course_map(&missing, &dir.path().join("map.dot"), OutputFormat::Dot, None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputNotFound);

    let placeholder = inline_svg_or_diagnostic(&missing, None);
    assert!(placeholder.starts_with("<!-- Course Map Error: input directory"));
}

#[test]
fn dot_file_output_needs_no_engine() {
    let dir = TempDir::new().unwrap();
    write_doc(dir.path(), "courses/intro.qmd", &course_doc("CS101", "Intro", &[]));
    let config_path = missing_engine_config(dir.path());
    let output = dir.path().join("out/map.dot");

    let written = generate_course_map(
        &dir.path().join("courses"),
        &output,
        OutputFormat::Dot,
        Some(config_path.as_path()),
    )
    .unwrap();

    assert_eq!(written, output);
    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("digraph CourseMap {"));
}

#[test]
fn serialized_output_is_deterministic() {
    let dir = TempDir::new().unwrap();
    write_doc(dir.path(), "b.qmd", &course_doc("B", "Second", &["A", "Z"]));
    write_doc(dir.path(), "a.qmd", &course_doc("A", "First", &[]));
    write_doc(dir.path(), "c/c.qmd", &course_doc("C", "Third", &["A", "B"]));

    let map = CourseMap::new(Config::default());
    let first = map.generate_dot(dir.path()).unwrap();
    let second = map.generate_dot(dir.path()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn duplicate_identifier_keeps_one_record() {
    let dir = TempDir::new().unwrap();
    write_doc(dir.path(), "a/intro.qmd", &course_doc("CS101", "Intro A", &[]));
    write_doc(dir.path(), "b/intro.qmd", &course_doc("CS101", "Intro B", &[]));

    let scan = scan_directory(dir.path(), &Config::default()).unwrap();
    assert_eq!(scan.len(), 1);
    assert_eq!(scan.collisions().len(), 1);
    assert_eq!(scan.get("CS101").unwrap().title, "Intro A");

    let mut config = Config::default();
    config.scan.collision = CollisionPolicy::LastWins;
    let scan = scan_directory(dir.path(), &config).unwrap();
    assert_eq!(scan.len(), 1);
    assert_eq!(scan.collisions().len(), 1);
    assert_eq!(scan.get("CS101").unwrap().title, "Intro B");
}

#[test]
fn cycles_are_reported_but_still_rendered() {
    let dir = TempDir::new().unwrap();
    write_doc(dir.path(), "a.qmd", &course_doc("A", "A", &["C"]));
    write_doc(dir.path(), "b.qmd", &course_doc("B", "B", &["A"]));
    write_doc(dir.path(), "c.qmd", &course_doc("C", "C", &["B"]));

    let map = CourseMap::new(Config::default());
    let graph = map.build(dir.path()).unwrap();

    assert!(matches!(graph.warnings().as_slice(), [GraphWarning::Cycle(_)]));
    assert_eq!(graph.edge_count(), 3);

    let dot = map.generate_dot(dir.path()).unwrap();
    assert_eq!(dot.matches("[color=\"red\"]").count(), 3);
}

#[test]
fn inline_svg_from_substitute_engine() {
    let map = CourseMap::with_engine(Config::default(), Box::new(CannedSvg));

    let svg = map.generate_inline_svg(samples_dir()).unwrap();

    assert_eq!(svg, "<svg data-nodes=\"3\"></svg>");
}

#[test]
fn sample_catalog_scans_as_expected() {
    let map = CourseMap::new(Config::default());
    let scan = map.scan(samples_dir()).unwrap();

    let ids: Vec<_> = scan.records().keys().cloned().collect();
    assert_eq!(ids, vec!["CS101", "CS102", "CS201"]);
    assert_eq!(scan.get("CS101").unwrap().phase, "Pre");
    assert_eq!(scan.get("CS101").unwrap().attributes["credits"], "4");
    assert_eq!(scan.get("CS102").unwrap().prerequisites, vec!["CS101"]);

    let kinds: Vec<_> = scan.failures().iter().map(|f| f.kind).collect();
    assert_eq!(kinds, vec![FailureKind::MissingMetadata]);

    let graph = build_graph(scan);
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.dangling_for("CS201").collect::<Vec<_>>(), vec!["MATH101"]);
    assert!(graph.cycles().is_empty());

    let dot = map.render(&graph, OutputFormat::Dot).unwrap();
    let dot = String::from_utf8(dot).unwrap();
    assert!(dot.contains("\"CS101\" [label=\"Introduction to Programming\", fillcolor=\"lightblue\""));
    assert!(dot.contains("\"CS102\" -> \"CS201\";"));
    assert!(dot.contains("penwidth=2"));
}

#[test]
fn missing_engine_probe_is_unavailable() {
    let mut config = Config::default();
    config.render.engine = MISSING_ENGINE.to_string();

    let probe = CourseMap::new(config).probe_engine();

    assert!(!probe.available);
    assert_eq!(probe.engine, MISSING_ENGINE);
}

#[test]
fn engine_checks_follow_configured_engine() {
    let dir = TempDir::new().unwrap();
    let config_path = missing_engine_config(dir.path());

    assert!(!check_engine_available_with_config(Some(config_path.as_path())).unwrap());

    let err = get_engine_info_with_config(Some(config_path.as_path())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EngineUnavailable);
    assert!(err.to_string().contains(MISSING_ENGINE));

    let err = check_engine_available_with_config(Some(dir.path().join("absent.toml").as_path()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}
