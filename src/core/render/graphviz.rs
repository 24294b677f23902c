//! Graphviz command-line engine
//!
//! Runs the configured executable (`dot` unless overridden) as a subprocess,
//! feeding the DOT description on stdin and collecting the image from stdout.

use std::io::{self, Write};
use std::process::{Command, Output, Stdio};
use std::thread;

use super::{AvailabilityInfo, Engine, OutputFormat};
use crate::core::error::RenderError;
use crate::debug;

/// Layout engine backed by a Graphviz executable
#[derive(Debug, Clone)]
pub struct GraphvizEngine {
    executable: String,
}

impl GraphvizEngine {
    /// Create an engine for `executable` (a name on `PATH` or a path)
    #[must_use]
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Executable this engine runs
    #[must_use]
    pub fn executable(&self) -> &str {
        &self.executable
    }

    fn not_found(&self, err: &io::Error) -> RenderError {
        RenderError::EngineNotFound {
            engine: self.executable.clone(),
            message: err.to_string(),
        }
    }

    fn execution_failed(&self, message: impl Into<String>) -> RenderError {
        RenderError::EngineExecutionFailed {
            engine: self.executable.clone(),
            message: message.into(),
        }
    }

    fn run(&self, description: &str, format: OutputFormat) -> Result<Output, RenderError> {
        debug!("Running {} -T{format}", self.executable);

        let mut child = Command::new(&self.executable)
            .arg(format!("-T{format}"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => self.not_found(&e),
                _ => self.execution_failed(format!("cannot start engine: {e}")),
            })?;

        // Feed stdin from its own thread while both output pipes drain
        let stdin = child.stdin.take();
        let (written, output) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                // Dropping stdin at the end closes it, signalling end of input
                Some(mut stdin) => stdin.write_all(description.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            (writer.join(), output)
        });

        let output =
            output.map_err(|e| self.execution_failed(format!("cannot read engine output: {e}")))?;

        // Exit status takes precedence over write errors
        if output.status.success() {
            match written {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    return Err(self.execution_failed(format!("cannot write graph to engine: {e}")));
                }
                Err(_) => return Err(self.execution_failed("graph writer thread panicked")),
            }
        }

        Ok(output)
    }
}

impl Default for GraphvizEngine {
    fn default() -> Self {
        Self::new("dot")
    }
}

impl Engine for GraphvizEngine {
    fn name(&self) -> &str {
        &self.executable
    }

    fn probe(&self) -> AvailabilityInfo {
        let unavailable = |details: String| AvailabilityInfo {
            engine: self.executable.clone(),
            available: false,
            details,
        };

        let output = match Command::new(&self.executable)
            .arg("-V")
            .stdin(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(e) => return unavailable(format!("cannot run `{} -V`: {e}", self.executable)),
        };

        // Graphviz reports its version on stderr
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = if stderr.trim().is_empty() {
            stdout.trim()
        } else {
            stderr.trim()
        };

        if !output.status.success() {
            return unavailable(format!("`{} -V` exited with {}: {text}", self.executable, output.status));
        }
        if !text.to_ascii_lowercase().contains("version") {
            return unavailable(format!("unrecognized response to `{} -V`: {text}", self.executable));
        }

        AvailabilityInfo {
            engine: self.executable.clone(),
            available: true,
            details: text.to_string(),
        }
    }

    fn render(&self, description: &str, format: OutputFormat) -> Result<Vec<u8>, RenderError> {
        let output = self.run(description, format)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.execution_failed(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(self.execution_failed("engine produced no output"));
        }

        debug!("{} produced {} bytes of {format}", self.executable, output.stdout.len());
        Ok(output.stdout)
    }
}
