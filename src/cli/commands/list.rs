//! List command handler

use std::path::Path;

use coursemap::config::Config;
use coursemap::graph::build_graph;
use coursemap::{verbose, CourseMap};

use super::report_error;

/// Print the courses found under `input`, then any scan or graph problems
pub fn run(input: &Path, config: Config) -> bool {
    let map = CourseMap::new(config);
    let scan = match map.scan(input) {
        Ok(scan) => scan,
        Err(e) => {
            report_error(&e);
            return false;
        }
    };

    println!("\n=== Courses ({}) ===\n", scan.len());
    for course in scan.records().values() {
        println!("  {:<12} {} [{}]", course.id, course.title, course.phase);
        if !course.prerequisites.is_empty() {
            println!("  {:<12} requires: {}", "", course.prerequisites.join(", "));
        }
        verbose!("  {:<12} {}", "", course.source().display());
    }

    if !scan.failures().is_empty() {
        println!("\n=== Skipped documents ({}) ===\n", scan.failures().len());
        for failure in scan.failures() {
            println!("  {failure}");
        }
    }

    if !scan.collisions().is_empty() {
        println!("\n=== Duplicate identifiers ({}) ===\n", scan.collisions().len());
        for collision in scan.collisions() {
            println!("  {collision}");
        }
    }

    let warnings = build_graph(scan).warnings();
    if !warnings.is_empty() {
        println!("\n=== Graph warnings ({}) ===\n", warnings.len());
        for warning in &warnings {
            println!("  {warning}");
        }
    }

    true
}
