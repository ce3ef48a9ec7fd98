//! External command execution seam.
//!
//! The engines never spawn processes themselves; they build an
//! [`Invocation`] and hand it to a [`CommandRunner`]. [`SystemRunner`] runs
//! it for real, [`DryRunRunner`] only records it.

use std::fmt;
use std::process::{Command, Stdio};

use crate::error::TransferError;

/// One external command: program plus arguments, passed without a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    /// Shell-quoted, suitable for copy-pasting into a terminal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(&self.program).chain(self.args.iter());
        f.write_str(&shell_words::join(words))
    }
}

/// Runs invocations to completion, one at a time.
pub trait CommandRunner {
    /// Block until the command exits. Non-zero exit is an error.
    fn run(&mut self, invocation: &Invocation) -> Result<(), TransferError>;

    /// `true` when commands are only recorded, not executed.
    fn is_dry_run(&self) -> bool {
        false
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &mut R {
    fn run(&mut self, invocation: &Invocation) -> Result<(), TransferError> {
        (**self).run(invocation)
    }

    fn is_dry_run(&self) -> bool {
        (**self).is_dry_run()
    }
}

/// Spawns real processes with stdin closed and output captured.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<(), TransferError> {
        tracing::debug!(command = %invocation, "spawning");

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| TransferError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let err = classify_failure(&invocation.program, output.status.code(), &stderr);
        tracing::debug!(command = %invocation, error = %err, "command failed");
        Err(err)
    }
}

/// Records every invocation and reports success without running anything.
#[derive(Debug, Default, Clone)]
pub struct DryRunRunner {
    planned: Vec<Invocation>,
}

impl DryRunRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn planned(&self) -> &[Invocation] {
        &self.planned
    }
}

impl CommandRunner for DryRunRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<(), TransferError> {
        self.planned.push(invocation.clone());
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

/// Map a non-zero exit to a [`TransferError`] using the child's stderr.
pub fn classify_failure(program: &str, code: Option<i32>, stderr: &str) -> TransferError {
    let stderr = one_line(stderr);
    if stderr.contains("Connection refused")
        || stderr.contains("Connection timed out")
        || stderr.contains("Could not resolve hostname")
        || stderr.contains("connection unexpectedly closed")
    {
        TransferError::Connection { stderr }
    } else if stderr.contains("Permission denied") {
        TransferError::PermissionDenied { stderr }
    } else {
        TransferError::Exit {
            program: program.to_string(),
            code,
            stderr,
        }
    }
}

/// Collapse multi-line stderr so it fits on one log line.
fn one_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let inv = Invocation::new("ssh").arg("h1").arg("rm -rf -- '/d/a b'");
        assert_eq!(inv.to_string(), r#"ssh h1 'rm -rf -- '\''/d/a b'\'''"#);
    }

    #[test]
    fn connection_errors_are_recognised() {
        let err = classify_failure(
            "rsync",
            Some(255),
            "ssh: connect to host h2 port 22: Connection refused\nrsync: connection unexpectedly closed\n",
        );
        assert!(matches!(err, TransferError::Connection { .. }), "got: {err}");
        assert!(err.to_string().contains("Connection refused | rsync"));
    }

    #[test]
    fn unknown_failure_keeps_exit_code() {
        let err = classify_failure("rsync", Some(23), "some files vanished\n");
        assert_eq!(
            err.to_string(),
            "rsync exited with status 23: some files vanished"
        );
    }

    #[test]
    fn dry_run_records_without_running() {
        let mut runner = DryRunRunner::new();
        runner
            .run(&Invocation::new("definitely-not-a-real-binary"))
            .unwrap();
        assert!(runner.is_dry_run());
        assert_eq!(runner.planned().len(), 1);
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let err = SystemRunner
            .run(&Invocation::new("besync-test-no-such-program"))
            .unwrap_err();
        assert!(matches!(err, TransferError::Spawn { .. }), "got: {err}");
    }
}
