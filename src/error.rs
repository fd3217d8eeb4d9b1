use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeployError>;

/// Everything that can abort a deploy run. Every failure is fatal; there are
/// no retries and no partial-success reporting.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Missing or unusable input, reported before any remote action.
    #[error("configuration error: {0}")]
    Config(String),

    /// A configured source path does not exist or has the wrong type.
    #[error("source path {}: {problem}", .path.display())]
    SourcePath {
        path: PathBuf,
        problem: SourceProblem,
    },

    /// Neither the source directory nor the file list produced any content.
    #[error("nothing to deploy: no source directory or file list produced any content")]
    EmptySourceSet,

    /// An external tool (tar, ssh, scp, sshpass) exited non-zero.
    #[error("{program} exited with {}: {}", code_display(.code), .stderr.trim())]
    Command {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// An external tool did not finish within the per-step timeout.
    #[error("{program} did not finish within {limit:?}")]
    Timeout { program: String, limit: Duration },

    /// The remote sha256sum output could not be parsed.
    #[error("could not read remote archive digest from: {0:?}")]
    RemoteDigest(String),

    /// The uploaded archive does not match the local one.
    #[error("archive digest mismatch: local {local}, remote {remote}")]
    IntegrityMismatch { local: String, remote: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceProblem {
    Missing,
    NotADirectory,
}

impl std::fmt::Display for SourceProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceProblem::Missing => write!(f, "no such file or directory"),
            SourceProblem::NotADirectory => write!(f, "not a directory"),
        }
    }
}

impl DeployError {
    /// `map_err` adapter attaching a human-readable context to an I/O error.
    pub fn io(context: impl Into<String>) -> impl FnOnce(io::Error) -> DeployError {
        let context = context.into();
        move |source| DeployError::Io { context, source }
    }
}

fn code_display(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "no exit code (killed by signal?)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_includes_code_and_stderr() {
        let err = DeployError::Command {
            program: "scp".into(),
            code: Some(1),
            stderr: "Permission denied (publickey,password).\n".into(),
        };
        let message = err.to_string();
        assert!(message.contains("scp"), "{message}");
        assert!(message.contains("code 1"), "{message}");
        assert!(message.contains("Permission denied"), "{message}");
    }

    #[test]
    fn source_path_error_names_the_path() {
        let err = DeployError::SourcePath {
            path: PathBuf::from("dist/missing"),
            problem: SourceProblem::Missing,
        };
        assert!(err.to_string().contains("dist/missing"));
    }
}
