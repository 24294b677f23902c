//! Data models for `coursemap`

pub mod course;
pub mod graph;
pub mod scan;

pub use course::{CourseRecord, UNKNOWN_PHASE};
pub use graph::{Cycle, DanglingReference, DependencyGraph, Edge, GraphWarning};
pub use scan::{CollisionPolicy, IdentifierCollision, ParseFailure, ScanResult};
