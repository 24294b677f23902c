//! Dependency graph construction and cycle detection

use std::collections::{HashMap, HashSet};

use crate::core::models::{Cycle, DependencyGraph, ScanResult};
use crate::debug;

/// Build the dependency graph for a scan
///
/// Never fails: prerequisites naming unknown courses become dangling
/// references and prerequisite cycles are recorded on the graph. Both are
/// available through [`DependencyGraph::warnings`].
#[must_use]
pub fn build_graph(scan: ScanResult) -> DependencyGraph {
    let records = scan.into_records();
    let mut graph = DependencyGraph::new();

    let declared: Vec<(String, Vec<String>)> = records
        .values()
        .map(|r| (r.id.clone(), r.prerequisites.clone()))
        .collect();

    for record in records.into_values() {
        graph.add_course(record);
    }

    for (course, prerequisites) in &declared {
        for prereq in prerequisites {
            if !graph.add_edge(prereq, course) {
                debug!("Course {course} requires unknown course {prereq}");
                graph.add_dangling(course, prereq);
            }
        }
    }

    let cycles = find_cycles(&graph);
    graph.set_cycles(cycles);

    debug!(
        "Built course map: {} courses, {} edges, {} dangling, {} cycles",
        graph.course_count(),
        graph.edge_count(),
        graph.dangling_references().len(),
        graph.cycles().len()
    );

    graph
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    OnStack,
    Done,
}

/// Find prerequisite cycles with a depth-first search
///
/// Roots are tried in identifier order and neighbours in edge order. Every
/// back-edge to a course still on the recursion stack yields the cycle formed
/// by the stack from that course onwards. Cycles found more than once are
/// reported once.
#[must_use]
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    let mut search = CycleSearch {
        graph,
        state: HashMap::new(),
        stack: Vec::new(),
        seen: HashSet::new(),
        cycles: Vec::new(),
    };

    for course in graph.course_ids() {
        if !search.state.contains_key(course) {
            search.visit(course);
        }
    }

    search.cycles
}

struct CycleSearch<'a> {
    graph: &'a DependencyGraph,
    state: HashMap<&'a str, VisitState>,
    stack: Vec<&'a str>,
    seen: HashSet<Cycle>,
    cycles: Vec<Cycle>,
}

impl<'a> CycleSearch<'a> {
    /// Depth-first walk from `root` with an explicit frame stack
    ///
    /// Each frame holds a course and the index of its next neighbour, so the
    /// walk depth is bounded by memory rather than the call stack.
    fn visit(&mut self, root: &'a str) {
        let graph = self.graph;
        let mut frames: Vec<(&'a str, usize)> = vec![(root, 0)];
        self.state.insert(root, VisitState::OnStack);
        self.stack.push(root);

        while let Some(frame) = frames.last_mut() {
            let (course, index) = *frame;
            let Some(next) = graph.dependents(course).get(index) else {
                frames.pop();
                self.stack.pop();
                self.state.insert(course, VisitState::Done);
                continue;
            };
            frame.1 += 1;

            match self.state.get(next.as_str()) {
                None => {
                    self.state.insert(next, VisitState::OnStack);
                    self.stack.push(next);
                    frames.push((next, 0));
                }
                Some(VisitState::OnStack) => self.record_cycle(next),
                Some(VisitState::Done) => {}
            }
        }
    }

    fn record_cycle(&mut self, start: &str) {
        let Some(position) = self.stack.iter().position(|c| *c == start) else {
            return;
        };
        let cycle = Cycle::new(
            self.stack[position..]
                .iter()
                .map(|c| (*c).to_string())
                .collect(),
        );
        if self.seen.insert(cycle.clone()) {
            self.cycles.push(cycle);
        }
    }
}
