//! Code synthesis stage: validate, persist, execute, classify.
//!
//! Generated code is parsed against the Python grammar before anything
//! touches the filesystem - a static well-formedness gate, not a type or
//! execution check. Code that fails the gate is never written and the
//! sandbox is never invoked for it.

use std::path::{Path, PathBuf};

use promptforge_sandbox::{RunReport, RunStatus, ScriptRunner};
use serde::Serialize;
use tree_sitter::{Node, Parser};

use crate::error::{ProcessError, Result};

/// Classified outcome of one synthesize-and-run pass. Always returned as
/// data; only infrastructure problems (IO, parser setup) surface as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// The script ran with an empty error stream.
    Succeeded { stdout: String },
    /// The script ran but wrote to stderr - the repair path triggers on
    /// this, independent of the process exit code.
    SucceededWithStderr { stdout: String, stderr: String },
    /// The sandbox deadline fired.
    TimedOut,
    /// The sandbox could not launch the script.
    LaunchFailed { error: String },
    /// The code failed the grammar check; nothing was written or executed.
    ValidationFailed { error: String },
}

impl ExecutionOutcome {
    /// Error-stream content that should be fed back for a repair
    /// suggestion, if any.
    pub fn stderr_content(&self) -> Option<&str> {
        match self {
            Self::SucceededWithStderr { stderr, .. } => Some(stderr),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Writes validated artifacts into the workspace and runs them.
#[derive(Debug)]
pub struct CodeSynthesizer {
    workspace_dir: PathBuf,
}

impl CodeSynthesizer {
    /// Creates the workspace directory if it does not exist yet.
    pub fn new(workspace_dir: impl Into<PathBuf>) -> Result<Self> {
        let workspace_dir = workspace_dir.into();
        std::fs::create_dir_all(&workspace_dir)?;
        Ok(Self { workspace_dir })
    }

    pub fn workspace_dir(&self) -> &Path {
        &self.workspace_dir
    }

    /// Validates `code`, writes it to `filename` inside the workspace
    /// (overwriting any previous artifact of that name), and runs it through
    /// the sandbox.
    ///
    /// Success is decided purely by error-stream content: a process may exit
    /// zero and still land in [`ExecutionOutcome::SucceededWithStderr`], and
    /// vice versa.
    pub async fn synthesize_and_run(
        &self,
        code: &str,
        filename: &str,
        runner: &ScriptRunner,
    ) -> Result<ExecutionOutcome> {
        if let Some(error) = validate_python(code)? {
            tracing::error!("syntax validation failed: {error}");
            return Ok(ExecutionOutcome::ValidationFailed { error });
        }
        tracing::debug!("syntax validation passed");

        let path = self.workspace_dir.join(filename);
        tokio::fs::write(&path, code).await?;
        tracing::debug!("written code to: {}", path.display());

        let report = runner.run(&path).await;
        Ok(classify(report))
    }
}

fn classify(report: RunReport) -> ExecutionOutcome {
    match report.status {
        RunStatus::Completed { .. } => {
            if report.stderr.trim().is_empty() {
                ExecutionOutcome::Succeeded {
                    stdout: report.stdout,
                }
            } else {
                ExecutionOutcome::SucceededWithStderr {
                    stdout: report.stdout,
                    stderr: report.stderr,
                }
            }
        }
        RunStatus::TimedOut => ExecutionOutcome::TimedOut,
        RunStatus::LaunchFailed { error } => ExecutionOutcome::LaunchFailed { error },
    }
}

/// Parses `code` against the Python grammar. Returns `Ok(Some(message))`
/// with the first error's position when the code is malformed, `Ok(None)`
/// when it is well-formed.
fn validate_python(code: &str) -> Result<Option<String>> {
    let mut parser = Parser::new();
    parser
        .set_language(tree_sitter_python::language())
        .map_err(|e| ProcessError::Parser(e.to_string()))?;

    let tree = match parser.parse(code, None) {
        Some(tree) => tree,
        None => return Ok(Some("parser aborted before producing a tree".to_string())),
    };

    let root = tree.root_node();
    if !root.has_error() {
        return Ok(None);
    }

    let message = match find_error_node(root) {
        Some(node) => format!(
            "syntax error at line {}, column {}",
            node.start_position().row + 1,
            node.start_position().column + 1
        ),
        None => "syntax error".to_string(),
    };
    Ok(Some(message))
}

/// Depth-first search for the first error or missing node in the tree.
fn find_error_node(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    for child in children {
        if let Some(found) = find_error_node(child) {
            return Some(found);
        }
    }
    // has_error() was set but no child carries it - report this node.
    Some(node)
}
