//! One update run.
//!
//! Order matters: the workspace is resolved first, then the Starting marker is
//! written, then the script runs, and the Finished marker is written whatever
//! the script did.

pub(crate) mod activation;
pub(crate) mod process;
pub(crate) mod update_log;
pub(crate) mod workspace;

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::RunError;
use crate::utils::{Timezone, debug_log};

pub(crate) use activation::Activation;
pub(crate) use process::{ChildExit, PreparedCommand};
pub(crate) use update_log::{Marker, UpdateLog, validate_timestamp_format};
pub(crate) use workspace::Workspace;

/// Everything needed for one run, after CLI and config are merged
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RunPlan {
    pub(crate) workdir: PathBuf,
    pub(crate) log_file: PathBuf,
    pub(crate) interpreter: String,
    pub(crate) script: PathBuf,
    pub(crate) args: Vec<String>,
    pub(crate) activation: Activation,
    pub(crate) timestamp_format: String,
    pub(crate) timezone: Timezone,
    pub(crate) finished_status: bool,
}

/// Plan with every path resolved against the workspace
#[derive(Debug)]
pub(crate) struct ResolvedRun {
    pub(crate) workspace: Workspace,
    pub(crate) log_path: PathBuf,
    pub(crate) script_path: PathBuf,
}

#[derive(Debug)]
pub(crate) struct RunOutcome {
    pub(crate) exit: ChildExit,
    pub(crate) elapsed: Duration,
    /// Set when the log could not be written after the script started
    pub(crate) log_error: Option<RunError>,
}

impl RunPlan {
    pub(crate) fn resolve(&self) -> Result<ResolvedRun, RunError> {
        let workspace = Workspace::new(&self.workdir)?;
        let log_path = workspace.resolve(&self.log_file);
        let script_path = workspace.resolve(&self.script);
        Ok(ResolvedRun {
            workspace,
            log_path,
            script_path,
        })
    }

    /// The child invocation, including activation
    pub(crate) fn command(&self, resolved: &ResolvedRun) -> Result<PreparedCommand, RunError> {
        let mut args: Vec<OsString> = Vec::with_capacity(self.args.len() + 1);
        args.push(resolved.script_path.clone().into_os_string());
        args.extend(self.args.iter().map(OsString::from));
        self.activation.prepare(&self.interpreter, args)
    }
}

/// Run the update script once, appending markers and output to the log.
///
/// Returns an error only when the workspace is unusable or the Starting
/// marker cannot be written. Once the script has been attempted, log write
/// failures are carried in [`RunOutcome::log_error`] so the script's exit
/// code is never lost. Activation and spawn failures are written to the log
/// and reflected in the outcome's exit code.
pub(crate) fn run_update(plan: &RunPlan) -> Result<RunOutcome, RunError> {
    let resolved = plan.resolve()?;
    let mut log = UpdateLog::open(&resolved.log_path, &plan.timestamp_format, plan.timezone)?;
    debug_log(format!("Appending to {}", log.path().display()));

    log.marker(Marker::Starting, None)?;
    Ok(run_logged(plan, &resolved, &mut log))
}

fn run_logged(plan: &RunPlan, resolved: &ResolvedRun, log: &mut UpdateLog) -> RunOutcome {
    let started = Instant::now();

    let exit = match plan.command(resolved) {
        Ok(command) => {
            debug_log(format!(
                "Running: {command} (in {})",
                resolved.workspace.root().display()
            ));
            process::run_to_completion(&command, resolved.workspace.root(), log)
                .unwrap_or_else(|e| ChildExit::Failed {
                    code: 1,
                    message: e.to_string(),
                })
        }
        Err(e) => ChildExit::Failed {
            code: 1,
            message: e.to_string(),
        },
    };

    let log_error = write_finished(log, &exit, plan.finished_status).err();

    RunOutcome {
        exit,
        elapsed: started.elapsed(),
        log_error,
    }
}

/// Append the failure text (if any) and the Finished marker.
///
/// The marker is attempted even when the failure text could not be written.
fn write_finished(log: &mut UpdateLog, exit: &ChildExit, with_status: bool) -> Result<(), RunError> {
    let noted = match exit {
        ChildExit::Failed { message, .. } => log.note(message),
        _ => Ok(()),
    };
    let status = with_status.then(|| exit.describe());
    let finished = log.marker(Marker::Finished, status.as_deref());
    noted.and(finished)
}
