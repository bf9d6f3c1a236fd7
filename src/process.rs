//! External command execution.
//!
//! Thin builder over [`std::process::Command`] used for every external
//! tool the lab drives (`docker`, `ssh-keygen`). Commands are synchronous
//! and fail fast: a non-zero exit becomes an error unless explicitly
//! allowed with [`Cmd::allow_fail`].
//!
//! Two run modes:
//! - [`Cmd::run`] captures stdout/stderr (for queries like `docker ps`)
//! - [`Cmd::run_interactive`] inherits the terminal (for `docker build`,
//!   whose progress output the user should see)

use anyhow::{bail, Context, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

/// Builder for an external command invocation.
pub struct Cmd {
    program: String,
    args: Vec<OsString>,
    error_msg: Option<String>,
    allow_fail: bool,
}

/// Captured result of a finished command.
#[derive(Debug)]
pub struct CmdResult {
    success: bool,
    /// Captured stdout (empty for interactive runs)
    pub stdout: String,
    /// Captured stderr (empty for interactive runs)
    pub stderr: String,
}

impl CmdResult {
    /// Whether the command exited with status zero.
    pub fn success(&self) -> bool {
        self.success
    }
}

impl Cmd {
    /// Start building an invocation of `program`.
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            error_msg: None,
            allow_fail: false,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append a path argument.
    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args.push(path.as_os_str().to_os_string());
        self
    }

    /// Message to use when the command fails, typically including an
    /// install or remediation hint.
    pub fn error_msg(mut self, msg: &str) -> Self {
        self.error_msg = Some(msg.to_string());
        self
    }

    /// Treat a non-zero exit as a normal result instead of an error.
    pub fn allow_fail(mut self) -> Self {
        self.allow_fail = true;
        self
    }

    /// Run the command, capturing stdout and stderr.
    pub fn run(self) -> Result<CmdResult> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to spawn '{}'", self.program))?;

        let result = CmdResult {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success && !self.allow_fail {
            let detail = result.stderr.trim();
            match self.error_msg {
                Some(msg) if detail.is_empty() => bail!("{}", msg),
                Some(msg) => bail!("{}\n{}", msg, detail),
                None if detail.is_empty() => {
                    bail!("'{}' exited with failure", self.program)
                }
                None => bail!("'{}' exited with failure:\n{}", self.program, detail),
            }
        }

        Ok(result)
    }

    /// Run the command with inherited stdio (output streams to the user).
    pub fn run_interactive(self) -> Result<CmdResult> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .with_context(|| format!("failed to spawn '{}'", self.program))?;

        if !status.success() && !self.allow_fail {
            match self.error_msg {
                Some(msg) => bail!("{}", msg),
                None => bail!("'{}' exited with status {}", self.program, status),
            }
        }

        Ok(CmdResult {
            success: status.success(),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

/// Locate a tool on PATH, returning its full path.
pub fn which(tool: &str) -> Option<String> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(tool);
        if is_executable(&candidate) {
            return Some(candidate.to_string_lossy().into_owned());
        }
    }
    None
}

/// Check if a tool is available on PATH.
pub fn exists(tool: &str) -> bool {
    which(tool).is_some()
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_captures_stdout() -> Result<()> {
        let result = Cmd::new("echo").arg("hello").run()?;
        assert!(result.success());
        assert_eq!(result.stdout.trim(), "hello");
        Ok(())
    }

    #[test]
    fn test_run_fails_on_nonzero_exit() {
        let result = Cmd::new("false").run();
        assert!(result.is_err());
    }

    #[test]
    fn test_run_error_msg_used() {
        let err = Cmd::new("false").error_msg("custom failure").run().unwrap_err();
        assert!(err.to_string().contains("custom failure"));
    }

    #[test]
    fn test_allow_fail_suppresses_error() -> Result<()> {
        let result = Cmd::new("false").allow_fail().run()?;
        assert!(!result.success());
        Ok(())
    }

    #[test]
    fn test_missing_program_is_error() {
        let result = Cmd::new("definitely_not_a_real_command_12345").run();
        assert!(result.is_err());
    }

    #[test]
    fn test_which_existing() {
        // ls should exist on any Unix system
        assert!(which("ls").is_some());
    }

    #[test]
    fn test_exists_nonexistent() {
        assert!(!exists("definitely_not_a_real_command_12345"));
    }
}
