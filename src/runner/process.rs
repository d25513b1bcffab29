use std::ffi::OsString;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::consts::EXIT_NOT_FOUND;
use crate::error::RunError;

use super::update_log::UpdateLog;

/// A fully prepared child invocation: program, arguments and extra environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PreparedCommand {
    pub(crate) program: OsString,
    pub(crate) args: Vec<OsString>,
    pub(crate) envs: Vec<(OsString, OsString)>,
}

impl PreparedCommand {
    pub(crate) fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub(crate) fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub(crate) fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub(crate) fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    fn to_command(&self, cwd: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(cwd).stdin(Stdio::null());
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd
    }
}

impl fmt::Display for PreparedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// How the child ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ChildExit {
    Exited(i32),
    /// Killed without an exit code (Unix signal)
    Signaled,
    /// Never ran, or could not be waited on
    Failed { code: i32, message: String },
}

impl ChildExit {
    pub(crate) fn code(&self) -> i32 {
        match self {
            ChildExit::Exited(code) => *code,
            ChildExit::Signaled => 1,
            ChildExit::Failed { code, .. } => *code,
        }
    }

    pub(crate) fn success(&self) -> bool {
        matches!(self, ChildExit::Exited(0))
    }

    /// Short status for the Finished marker
    pub(crate) fn describe(&self) -> String {
        match self {
            ChildExit::Exited(code) => format!("(exit code {code})"),
            ChildExit::Signaled => "(terminated by signal)".to_string(),
            ChildExit::Failed { .. } => "(failed to start)".to_string(),
        }
    }
}

/// Run the command in `cwd` with stdout and stderr appended to `log`, blocking until it exits.
///
/// Only log I/O errors are returned; a child that cannot be started is
/// reported as [`ChildExit::Failed`].
pub(crate) fn run_to_completion(
    command: &PreparedCommand,
    cwd: &Path,
    log: &UpdateLog,
) -> Result<ChildExit, RunError> {
    let mut cmd = command.to_command(cwd);
    cmd.stdout(log.stdio()?).stderr(log.stdio()?);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            let code = if e.kind() == ErrorKind::NotFound {
                EXIT_NOT_FOUND
            } else {
                1
            };
            return Ok(ChildExit::Failed {
                code,
                message: format!(
                    "Failed to run {}: {e}",
                    command.program.to_string_lossy()
                ),
            });
        }
    };

    // Drop our copies of the log handle so only the child holds them
    drop(cmd);

    match child.wait() {
        Ok(status) => Ok(match status.code() {
            Some(code) => ChildExit::Exited(code),
            None => ChildExit::Signaled,
        }),
        Err(e) => Ok(ChildExit::Failed {
            code: 1,
            message: format!(
                "Failed to wait for {}: {e}",
                command.program.to_string_lossy()
            ),
        }),
    }
}
