//! Rendering of dependency graphs
//!
//! The graph is serialized to Graphviz DOT by [`DotGenerator`] and handed to an
//! [`Engine`] which lays it out and returns the image bytes. The default engine
//! is [`GraphvizEngine`]; any other implementation can be substituted.

pub mod dot;
pub mod graphviz;

pub use dot::DotGenerator;
pub use graphviz::GraphvizEngine;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::config::Config;
use crate::core::error::RenderError;
use crate::core::models::DependencyGraph;
use crate::debug;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Scalable vector graphics
    #[default]
    Svg,
    /// Raster image
    Png,
    /// Graphviz source text; no engine involved
    Dot,
}

impl OutputFormat {
    /// Get the file extension for this format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Dot => "dot",
        }
    }

    /// Whether producing this format requires running the layout engine
    #[must_use]
    pub const fn needs_engine(&self) -> bool {
        !matches!(self, Self::Dot)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "dot" | "gv" | "graphviz" => Ok(Self::Dot),
            _ => Err(format!(
                "Unknown output format: '{s}' (expected svg, png or dot)"
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Result of probing a layout engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityInfo {
    /// Executable or engine name that was probed
    pub engine: String,
    /// Whether the engine answered as expected
    pub available: bool,
    /// Version text when available, otherwise a diagnostic
    pub details: String,
}

impl fmt::Display for AvailabilityInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.available {
            write!(f, "{}: {}", self.engine, self.details)
        } else {
            write!(f, "{} unavailable: {}", self.engine, self.details)
        }
    }
}

/// A layout engine turning a graph description into image bytes
pub trait Engine {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Check whether the engine can be used; never fails
    fn probe(&self) -> AvailabilityInfo;

    /// Lay out `description` (DOT text) and return the rendered bytes
    ///
    /// # Errors
    /// Returns [`RenderError::EngineNotFound`] when the engine cannot be
    /// started and [`RenderError::EngineExecutionFailed`] when it fails or
    /// produces no output.
    fn render(&self, description: &str, format: OutputFormat) -> Result<Vec<u8>, RenderError>;
}

/// Serializes graphs and drives an [`Engine`]
pub struct Renderer {
    engine: Box<dyn Engine>,
}

impl Renderer {
    /// Renderer using the Graphviz executable named in the configuration
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::with_engine(Box::new(GraphvizEngine::new(&config.render.engine)))
    }

    /// Renderer using a caller-supplied engine
    #[must_use]
    pub fn with_engine(engine: Box<dyn Engine>) -> Self {
        Self { engine }
    }

    /// The engine in use
    #[must_use]
    pub fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    /// Probe the engine
    #[must_use]
    pub fn probe_availability(&self) -> AvailabilityInfo {
        self.engine.probe()
    }

    /// Render `graph` in `format`
    ///
    /// The DOT format is returned as serialized text without invoking the engine.
    ///
    /// # Errors
    /// Returns [`RenderError::SerializationFailed`] when the graph cannot be
    /// expressed as DOT, or the engine's error otherwise.
    pub fn render(
        &self,
        graph: &DependencyGraph,
        format: OutputFormat,
        config: &Config,
    ) -> Result<Vec<u8>, RenderError> {
        let description = DotGenerator::generate(graph, config)?;
        if !format.needs_engine() {
            return Ok(description.into_bytes());
        }

        debug!(
            "Rendering {} courses as {format} with {}",
            graph.course_count(),
            self.engine.name()
        );
        self.engine.render(&description, format)
    }
}
