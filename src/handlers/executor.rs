use std::io::Write;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::config::PlaygroundConfig;
use crate::models::{FileLanguage, PlaygroundFile};

/// Fixed output for files whose extension defeats the strict language
/// mapping. Nothing is executed in that case.
pub const UNSUPPORTED_FILE_TYPE: &str = "Unsupported file type.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Error,
}

/// Normalized outcome of one run, whatever the language executor did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub output: String,
    pub status: RunStatus,
}

impl ExecutionResult {
    fn success(output: String) -> Self {
        Self {
            output,
            status: RunStatus::Success,
        }
    }

    fn error(output: String) -> Self {
        Self {
            output,
            status: RunStatus::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == RunStatus::Error
    }
}

/// Routes a run request to the language's interpreter and normalizes the
/// result.
///
/// Both languages share one execution model: the code is written to a
/// private temp file and handed to an interpreter child process with piped
/// stdio, bounded by a wall-clock timeout. Output capture is per child,
/// never a process-wide sink. The dispatcher does not queue or dedupe:
/// callers run one execution at a time.
#[derive(Debug, Clone)]
pub struct ExecutionDispatcher {
    python_command: String,
    node_command: String,
    run_timeout: Duration,
}

impl ExecutionDispatcher {
    pub fn new(config: &PlaygroundConfig) -> Self {
        Self {
            python_command: config.python_command.clone(),
            node_command: config.node_command.clone(),
            run_timeout: config.run_timeout(),
        }
    }

    /// Runs the file's current content and returns the normalized result.
    /// Failures are data, not `Err`: a missing interpreter, a timeout and
    /// a crashing script all come back as an error-status result.
    pub async fn run(&self, file: &PlaygroundFile) -> ExecutionResult {
        let Some(language) = FileLanguage::from_extension_strict(&file.name) else {
            tracing::debug!(file = %file.name, "refusing to run unrecognized file type");
            return ExecutionResult::error(UNSUPPORTED_FILE_TYPE.to_string());
        };

        let (interpreter, suffix) = match language {
            FileLanguage::Python => (self.python_command.as_str(), ".py"),
            FileLanguage::JavaScript => (self.node_command.as_str(), ".js"),
        };

        tracing::info!(file = %file.name, language = language.as_str(), "running file");
        self.run_with_interpreter(interpreter, suffix, &file.content)
            .await
    }

    async fn run_with_interpreter(
        &self,
        interpreter: &str,
        suffix: &str,
        code: &str,
    ) -> ExecutionResult {
        // The temp file lives until this function returns, which outlasts
        // the child process.
        let mut source = match tempfile::Builder::new().suffix(suffix).tempfile() {
            Ok(file) => file,
            Err(e) => {
                tracing::error!(error = %e, "failed to create temp source file");
                return ExecutionResult::error(format!("Failed to stage code for execution: {e}"));
            }
        };
        if let Err(e) = source.write_all(code.as_bytes()) {
            tracing::error!(error = %e, "failed to write temp source file");
            return ExecutionResult::error(format!("Failed to stage code for execution: {e}"));
        }

        let child = Command::new(interpreter)
            .arg(source.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(interpreter, error = %e, "failed to launch interpreter");
                return ExecutionResult::error(format!("Failed to launch {interpreter}: {e}"));
            }
        };

        // Dropping the output future on timeout kills the child via
        // kill_on_drop.
        match timeout(self.run_timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                classify(output.status.success(), stdout, stderr)
            }
            Ok(Err(e)) => {
                tracing::error!(interpreter, error = %e, "failed to collect child output");
                ExecutionResult::error(format!("Failed to collect output: {e}"))
            }
            Err(_) => {
                tracing::warn!(interpreter, timeout_secs = self.run_timeout.as_secs(), "run timed out");
                ExecutionResult::error(format!(
                    "Execution timed out after {}s",
                    self.run_timeout.as_secs()
                ))
            }
        }
    }
}

/// Classification rule for the run boundary, which reports no status of
/// its own: error iff the child exited nonzero or wrote anything to its
/// error channel. The error text wins as output when present.
fn classify(exit_ok: bool, stdout: String, stderr: String) -> ExecutionResult {
    if !stderr.is_empty() {
        ExecutionResult::error(stderr)
    } else if !exit_ok {
        ExecutionResult::error("Process exited with a non-zero status".to_string())
    } else {
        ExecutionResult::success(stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlaygroundFile;

    fn dispatcher() -> ExecutionDispatcher {
        ExecutionDispatcher::new(&PlaygroundConfig::default())
    }

    fn interpreter_available(command: &str) -> bool {
        std::process::Command::new(command)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    #[test]
    fn classify_clean_exit_with_empty_stderr_is_success() {
        let result = classify(true, "hello\n".into(), String::new());
        assert_eq!(result.status, RunStatus::Success);
        assert_eq!(result.output, "hello\n");
    }

    #[test]
    fn classify_stderr_text_forces_error_even_on_clean_exit() {
        let result = classify(true, "partial\n".into(), "warning: deprecated\n".into());
        assert_eq!(result.status, RunStatus::Error);
        assert_eq!(result.output, "warning: deprecated\n");
    }

    #[test]
    fn classify_nonzero_exit_without_stderr_is_error() {
        let result = classify(false, String::new(), String::new());
        assert_eq!(result.status, RunStatus::Error);
        assert!(result.output.contains("non-zero"));
    }

    #[tokio::test]
    async fn unrecognized_file_type_is_rejected_without_executing() {
        let file = PlaygroundFile::new("notes.txt".into(), "whatever".into());
        let result = dispatcher().run(&file).await;
        assert_eq!(result.status, RunStatus::Error);
        assert_eq!(result.output, UNSUPPORTED_FILE_TYPE);
    }

    #[tokio::test]
    async fn missing_interpreter_surfaces_as_error_result() {
        let config = PlaygroundConfig {
            python_command: "definitely-not-an-interpreter".to_string(),
            ..PlaygroundConfig::default()
        };
        let file = PlaygroundFile::new("main.py".into(), "print(1)".into());
        let result = ExecutionDispatcher::new(&config).run(&file).await;
        assert_eq!(result.status, RunStatus::Error);
        assert!(result.output.contains("Failed to launch"));
    }

    #[tokio::test]
    async fn python_hello_runs_to_success() {
        if !interpreter_available("python3") {
            eprintln!("python3 not installed, skipping");
            return;
        }
        let file = PlaygroundFile::new(
            "main.py".into(),
            "print(\"Hello from main.py\")".into(),
        );
        let result = dispatcher().run(&file).await;
        assert_eq!(result.status, RunStatus::Success);
        assert!(result.output.contains("Hello from main.py"));
    }

    #[tokio::test]
    async fn python_stderr_output_classifies_as_error() {
        if !interpreter_available("python3") {
            eprintln!("python3 not installed, skipping");
            return;
        }
        let file = PlaygroundFile::new(
            "main.py".into(),
            "import sys\nsys.stderr.write(\"boom\\n\")".into(),
        );
        let result = dispatcher().run(&file).await;
        assert_eq!(result.status, RunStatus::Error);
        assert!(result.output.contains("boom"));
    }

    #[tokio::test]
    async fn long_running_code_is_cut_off_at_the_timeout() {
        if !interpreter_available("python3") {
            eprintln!("python3 not installed, skipping");
            return;
        }
        let config = PlaygroundConfig {
            run_timeout_secs: 1,
            ..PlaygroundConfig::default()
        };
        let file = PlaygroundFile::new(
            "main.py".into(),
            "import time\ntime.sleep(30)".into(),
        );
        let result = ExecutionDispatcher::new(&config).run(&file).await;
        assert_eq!(result.status, RunStatus::Error);
        assert!(result.output.contains("timed out"));
    }
}
