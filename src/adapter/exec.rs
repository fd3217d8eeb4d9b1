use std::ffi::{OsStr, OsString};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{DeployError, Result};

/// A fully parameterized external invocation: program, argument array and
/// extra environment. Values are never spliced into a shell string, so no
/// local quoting is involved.
#[derive(Debug)]
pub struct CommandSpec {
    program: String,
    args: Vec<OsString>,
    envs: Vec<(String, String)>,
}

#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl AsRef<OsStr>>) -> Self {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    /// Passed only to this child, not exported to our own environment.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arg_list(&self) -> &[OsString] {
        &self.args
    }

    pub fn env_list(&self) -> &[(String, String)] {
        &self.envs
    }
}

/// Runs the command to completion, capturing output, with a hard deadline.
/// Network-facing tools can hang forever; the deadline turns that into a
/// distinct [`DeployError::Timeout`]. The child is killed when the future is
/// dropped past the deadline.
pub async fn run(spec: &CommandSpec, limit: Duration) -> Result<CommandOutput> {
    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .envs(spec.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = command
        .spawn()
        .map_err(DeployError::io(format!("spawning {}", spec.program)))?;

    let output = match tokio::time::timeout(limit, child.wait_with_output()).await {
        Err(_) => {
            return Err(DeployError::Timeout {
                program: spec.program.clone(),
                limit,
            })
        }
        Ok(result) => {
            result.map_err(DeployError::io(format!("waiting for {}", spec.program)))?
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if output.status.success() {
        Ok(CommandOutput { stdout, stderr })
    } else {
        Err(DeployError::Command {
            program: spec.program.clone(),
            code: output.status.code(),
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_of_a_successful_command() {
        let spec = CommandSpec::new("echo").arg("hello");
        let output = run(&spec, Duration::from_secs(10)).await.unwrap();
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn nonzero_exit_surfaces_program_and_stderr() {
        let spec = CommandSpec::new("sh").args(["-c", "echo broken >&2; exit 3"]);
        let err = run(&spec, Duration::from_secs(10)).await.unwrap_err();
        match err {
            DeployError::Command {
                program,
                code,
                stderr,
            } => {
                assert_eq!(program, "sh");
                assert_eq!(code, Some(3));
                assert!(stderr.contains("broken"));
            }
            other => panic!("expected Command error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn deadline_produces_a_timeout_error() {
        let spec = CommandSpec::new("sleep").arg("5");
        let err = run(&spec, Duration::from_millis(50)).await.unwrap_err();
        assert!(matches!(err, DeployError::Timeout { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn missing_program_is_an_io_error_with_context() {
        let spec = CommandSpec::new("definitely-not-a-real-binary-0x1");
        let err = run(&spec, Duration::from_secs(1)).await.unwrap_err();
        assert!(err.to_string().contains("spawning"), "{err}");
    }

    #[tokio::test]
    async fn extra_env_reaches_the_child_only() {
        let spec = CommandSpec::new("sh")
            .args(["-c", "printf %s \"$DEPLOY_TEST_MARKER\""])
            .env("DEPLOY_TEST_MARKER", "present");
        let output = run(&spec, Duration::from_secs(10)).await.unwrap();
        assert_eq!(output.stdout, "present");
        assert!(std::env::var("DEPLOY_TEST_MARKER").is_err());
    }
}
