//! Course map pipeline
//!
//! [`CourseMap`] runs scan → build → render for one configuration. The free
//! functions at the bottom are the stable entry points for embedding callers;
//! only [`inline_svg_or_diagnostic`] turns failures into output.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::Config;
use crate::core::error::{CourseMapError, FailureKind, RenderError};
use crate::core::graph::build_graph;
use crate::core::models::{DependencyGraph, ScanResult};
use crate::core::parser::scan_directory;
use crate::core::render::{AvailabilityInfo, Engine, OutputFormat, Renderer};
use crate::{debug, info, warn};

/// Scan, build and render course maps
pub struct CourseMap {
    config: Config,
    renderer: Renderer,
}

impl CourseMap {
    /// Pipeline using the Graphviz engine named in `config`
    #[must_use]
    pub fn new(config: Config) -> Self {
        let renderer = Renderer::from_config(&config);
        Self { config, renderer }
    }

    /// Pipeline using a caller-supplied engine
    #[must_use]
    pub fn with_engine(config: Config, engine: Box<dyn Engine>) -> Self {
        Self {
            config,
            renderer: Renderer::with_engine(engine),
        }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Scan `input` for course documents, logging every per-file problem
    ///
    /// # Errors
    /// Returns [`CourseMapError::InputNotFound`] when `input` cannot be scanned.
    pub fn scan<P: AsRef<Path>>(&self, input: P) -> Result<ScanResult, CourseMapError> {
        let scan = scan_directory(input, &self.config)?;

        for failure in scan.failures() {
            if failure.kind == FailureKind::MissingMetadata {
                debug!("Skipping {}", failure);
            } else {
                warn!("Skipping {}", failure);
            }
        }
        for collision in scan.collisions() {
            warn!("{}", collision);
        }

        info!(
            "Found {} course(s), {} document(s) skipped",
            scan.len(),
            scan.failures().len()
        );
        Ok(scan)
    }

    /// Scan `input` and build its dependency graph, logging graph warnings
    ///
    /// # Errors
    /// Returns [`CourseMapError::InputNotFound`] when `input` cannot be scanned.
    pub fn build<P: AsRef<Path>>(&self, input: P) -> Result<DependencyGraph, CourseMapError> {
        let graph = build_graph(self.scan(input)?);
        for warning in graph.warnings() {
            warn!("{}", warning);
        }
        Ok(graph)
    }

    /// Render an already built graph
    ///
    /// # Errors
    /// Returns the renderer's error wrapped in [`CourseMapError::Render`].
    pub fn render(
        &self,
        graph: &DependencyGraph,
        format: OutputFormat,
    ) -> Result<Vec<u8>, CourseMapError> {
        Ok(self.renderer.render(graph, format, &self.config)?)
    }

    /// Render the course map of `input` into the file `output`
    ///
    /// Missing parent directories of `output` are created.
    ///
    /// # Returns
    /// The path that was written
    ///
    /// # Errors
    /// Returns an error when scanning or rendering fails, or
    /// [`CourseMapError::OutputWriteFailed`] when the file cannot be written.
    pub fn generate<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
        format: OutputFormat,
    ) -> Result<PathBuf, CourseMapError> {
        let output = output.as_ref();
        let graph = self.build(input)?;
        let bytes = self.render(&graph, format)?;

        let write_failed = |source| CourseMapError::OutputWriteFailed {
            path: output.to_path_buf(),
            source,
        };
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }
        fs::write(output, &bytes).map_err(write_failed)?;

        info!("Wrote {} ({} bytes)", output.display(), bytes.len());
        Ok(output.to_path_buf())
    }

    /// Render the course map of `input` as SVG markup ready to embed in HTML
    ///
    /// The XML prolog and doctype are removed so the text starts at `<svg`.
    ///
    /// # Errors
    /// Returns an error when scanning or rendering fails, including
    /// [`RenderError::EngineExecutionFailed`] when the engine output is not UTF-8.
    pub fn generate_inline_svg<P: AsRef<Path>>(&self, input: P) -> Result<String, CourseMapError> {
        let graph = self.build(input)?;
        let bytes = self.render(&graph, OutputFormat::Svg)?;
        let svg = String::from_utf8(bytes).map_err(|e| RenderError::EngineExecutionFailed {
            engine: self.renderer.engine().name().to_string(),
            message: format!("SVG output is not valid UTF-8: {e}"),
        })?;
        Ok(strip_svg_prolog(&svg).to_string())
    }

    /// DOT description of the course map of `input`; no engine is run
    ///
    /// # Errors
    /// Returns an error when scanning fails or the graph cannot be serialized.
    pub fn generate_dot<P: AsRef<Path>>(&self, input: P) -> Result<String, CourseMapError> {
        let graph = self.build(input)?;
        let bytes = self.render(&graph, OutputFormat::Dot)?;
        // DOT output is built from Rust strings
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Probe the configured engine
    #[must_use]
    pub fn probe_engine(&self) -> AvailabilityInfo {
        self.renderer.probe_availability()
    }
}

/// Drop everything before the `<svg` element
fn strip_svg_prolog(svg: &str) -> &str {
    svg.find("<svg").map_or_else(|| svg.trim(), |start| svg[start..].trim_end())
}

/// Load the configuration for a boundary call
///
/// An explicit path must exist and parse. Without one the compiled-in
/// defaults are used; the user configuration file is left alone.
///
/// # Errors
/// Returns [`CourseMapError::Config`] when `config_path` cannot be loaded.
pub fn load_config(config_path: Option<&Path>) -> Result<Config, CourseMapError> {
    match config_path {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            Ok(Config::from_file(path)?)
        }
        None => Ok(Config::from_defaults()),
    }
}

/// Render the course map of `input_dir` into `output_path`
///
/// # Errors
/// See [`CourseMap::generate`] and [`load_config`].
pub fn generate_course_map(
    input_dir: &Path,
    output_path: &Path,
    format: OutputFormat,
    config_path: Option<&Path>,
) -> Result<PathBuf, CourseMapError> {
    CourseMap::new(load_config(config_path)?).generate(input_dir, output_path, format)
}

/// Render the course map of `input_dir` as inline SVG markup
///
/// # Errors
/// See [`CourseMap::generate_inline_svg`] and [`load_config`].
pub fn generate_inline_svg(
    input_dir: &Path,
    config_path: Option<&Path>,
) -> Result<String, CourseMapError> {
    CourseMap::new(load_config(config_path)?).generate_inline_svg(input_dir)
}

/// Whether the default engine is installed and answering
///
/// Always probes the compiled-in engine (`dot` on `PATH`). A `render.engine`
/// set in a config file is only honoured by
/// [`check_engine_available_with_config`].
#[must_use]
pub fn check_engine_available() -> bool {
    CourseMap::new(Config::from_defaults()).probe_engine().available
}

/// Whether the engine configured by `config_path` is installed and answering
///
/// # Errors
/// Returns [`CourseMapError::Config`] when `config_path` cannot be loaded.
pub fn check_engine_available_with_config(
    config_path: Option<&Path>,
) -> Result<bool, CourseMapError> {
    Ok(CourseMap::new(load_config(config_path)?).probe_engine().available)
}

/// Version text of the default engine
///
/// Like [`check_engine_available`], this ignores any configured engine; see
/// [`get_engine_info_with_config`].
///
/// # Errors
/// Returns [`CourseMapError::EngineUnavailable`] with the probe diagnostics
/// when the engine cannot be used.
pub fn get_engine_info() -> Result<String, CourseMapError> {
    engine_info(&CourseMap::new(Config::from_defaults()))
}

/// Version text of the engine configured by `config_path`
///
/// # Errors
/// Returns [`CourseMapError::Config`] when `config_path` cannot be loaded and
/// [`CourseMapError::EngineUnavailable`] when the engine cannot be used.
pub fn get_engine_info_with_config(config_path: Option<&Path>) -> Result<String, CourseMapError> {
    engine_info(&CourseMap::new(load_config(config_path)?))
}

fn engine_info(map: &CourseMap) -> Result<String, CourseMapError> {
    let probe = map.probe_engine();
    if probe.available {
        Ok(probe.details)
    } else {
        Err(CourseMapError::EngineUnavailable {
            engine: probe.engine,
            details: probe.details,
        })
    }
}

/// Inline SVG for `input_dir`, or an HTML comment describing the failure
///
/// Meant for document filters that must always emit something.
#[must_use]
pub fn inline_svg_or_diagnostic(input_dir: &Path, config_path: Option<&Path>) -> String {
    generate_inline_svg(input_dir, config_path).unwrap_or_else(|err| diagnostic_comment(&err))
}

/// HTML comment carrying an error message
#[must_use]
pub fn diagnostic_comment(err: &CourseMapError) -> String {
    // "--" may not appear inside an HTML comment
    let mut message = err.to_string();
    while message.contains("--") {
        message = message.replace("--", "- -");
    }
    format!("<!-- Course Map Error: {message} -->")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    struct FixedEngine {
        output: Vec<u8>,
        available: bool,
    }

    impl Engine for FixedEngine {
        fn name(&self) -> &str {
            "fixed"
        }

        fn probe(&self) -> AvailabilityInfo {
            AvailabilityInfo {
                engine: "fixed".to_string(),
                available: self.available,
                details: if self.available {
                    "fixed version 2.0".to_string()
                } else {
                    "not installed".to_string()
                },
            }
        }

        fn render(&self, _description: &str, _format: OutputFormat) -> Result<Vec<u8>, RenderError> {
            Ok(self.output.clone())
        }
    }

    fn fixed(output: &[u8]) -> Box<dyn Engine> {
        Box::new(FixedEngine {
            output: output.to_vec(),
            available: true,
        })
    }

    fn course_dir() -> tempfile::TempDir {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(
            dir.path().join("intro.qmd"),
            "---\ncourse-map:\n  id: CS101\n  title: Intro\n---\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_strip_svg_prolog() {
        let svg = "<?xml version=\"1.0\"?>\n<!DOCTYPE svg PUBLIC \"x\">\n<!-- Generated -->\n<svg width=\"1\"></svg>\n";
        assert_eq!(strip_svg_prolog(svg), "<svg width=\"1\"></svg>");
        assert_eq!(strip_svg_prolog("  plain  "), "plain");
    }

    #[test]
    fn test_inline_svg_starts_at_svg_element() {
        let dir = course_dir();
        let map = CourseMap::with_engine(
            Config::default(),
            fixed(b"<?xml version=\"1.0\"?>\n<svg></svg>\n"),
        );
        assert_eq!(map.generate_inline_svg(dir.path()).unwrap(), "<svg></svg>");
    }

    #[test]
    fn test_inline_svg_rejects_non_utf8() {
        let dir = course_dir();
        let map = CourseMap::with_engine(Config::default(), fixed(&[0xff, 0xfe, 0x00]));
        let err = map.generate_inline_svg(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EngineExecutionFailed);
    }

    #[test]
    fn test_generate_creates_parent_directories() {
        let dir = course_dir();
        let out = dir.path().join("out/nested/map.png");
        let map = CourseMap::with_engine(Config::default(), fixed(b"PNGDATA"));

        let written = map.generate(dir.path(), &out, OutputFormat::Png).unwrap();

        assert_eq!(written, out);
        assert_eq!(fs::read(&out).unwrap(), b"PNGDATA");
    }

    #[test]
    fn test_generate_reports_unwritable_output() {
        let dir = course_dir();
        // A regular file cannot be used as a parent directory
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let map = CourseMap::with_engine(Config::default(), fixed(b"<svg/>"));

        let err = map
            .generate(dir.path(), blocker.join("map.svg"), OutputFormat::Svg)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutputWriteFailed);
    }

    #[test]
    fn test_engine_info_maps_unavailable_probe() {
        let map = CourseMap::with_engine(
            Config::default(),
            Box::new(FixedEngine {
                output: Vec::new(),
                available: false,
            }),
        );
        let err = engine_info(&map).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EngineUnavailable);

        let map = CourseMap::with_engine(Config::default(), fixed(b""));
        assert_eq!(engine_info(&map).unwrap(), "fixed version 2.0");
    }

    #[test]
    fn test_diagnostic_comment() {
        let err = CourseMapError::InputNotFound {
            path: PathBuf::from("/missing--dir"),
            message: "No such file or directory".to_string(),
        };
        let comment = diagnostic_comment(&err);
        assert!(comment.starts_with("<!-- Course Map Error: input directory"));
        assert!(comment.ends_with(" -->"));
        assert!(!comment["<!--".len()..comment.len() - "-->".len()].contains("--"));
    }

    #[test]
    fn test_diagnostic_comment_breaks_up_dash_runs() {
        let err = CourseMapError::from(RenderError::EngineExecutionFailed {
            engine: "dot".to_string(),
            message: "syntax error near '--->' in /courses---2024 -".to_string(),
        });
        let comment = diagnostic_comment(&err);
        let inner = &comment["<!--".len()..comment.len() - "-->".len()];

        assert!(!inner.contains("--"), "{comment}");
        assert_eq!(comment.matches("-->").count(), 1);
        assert!(comment.ends_with(" -->"));
        assert!(comment.contains("/courses- - -2024"));
    }

    #[test]
    fn test_missing_config_path_is_config_error() {
        let err = load_config(Some(Path::new("/nonexistent/coursemap.toml"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
