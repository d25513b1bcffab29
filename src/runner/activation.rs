//! Environment activation.
//!
//! Activation decides which interpreter actually runs: either by letting
//! `conda run` set up the named environment, or by putting an environment
//! directory's executables first on PATH the way `conda activate` does.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::RunError;

use super::process::PreparedCommand;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub(crate) enum Activation {
    /// Use whatever interpreter is on the inherited PATH
    None,
    /// `<conda> run -n <env> --no-capture-output <interpreter> ...`
    CondaRun { conda: String, env: String },
    /// Prepend the environment's executable directories to PATH
    Prefix { env: String, prefix: PathBuf },
}

impl Activation {
    /// Wrap `interpreter args...` so that it runs inside the environment
    pub(crate) fn prepare(
        &self,
        interpreter: &str,
        args: Vec<OsString>,
    ) -> Result<PreparedCommand, RunError> {
        match self {
            Activation::None => Ok(PreparedCommand::new(interpreter).args(args)),
            Activation::CondaRun { conda, env } => Ok(PreparedCommand::new(conda.as_str())
                .args(["run", "-n", env.as_str(), "--no-capture-output"])
                .arg(interpreter)
                .args(args)),
            Activation::Prefix { env, prefix } => {
                if !prefix.is_dir() {
                    return Err(RunError::Activation {
                        path: prefix.clone(),
                    });
                }
                let path = prepend_to_path(&executable_dirs(prefix), env::var_os("PATH"))?;
                Ok(PreparedCommand::new(interpreter)
                    .args(args)
                    .env("PATH", path)
                    .env("CONDA_PREFIX", prefix.as_os_str())
                    .env("CONDA_DEFAULT_ENV", env.as_str()))
            }
        }
    }
}

/// Directories `conda activate` puts on PATH for an environment
fn executable_dirs(prefix: &Path) -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![
            prefix.to_path_buf(),
            prefix.join("Library").join("mingw-w64").join("bin"),
            prefix.join("Library").join("usr").join("bin"),
            prefix.join("Library").join("bin"),
            prefix.join("Scripts"),
            prefix.join("bin"),
        ]
    } else {
        vec![prefix.join("bin")]
    }
}

fn prepend_to_path(dirs: &[PathBuf], current: Option<OsString>) -> Result<OsString, RunError> {
    let mut entries: Vec<PathBuf> = dirs.to_vec();
    if let Some(current) = current {
        entries.extend(env::split_paths(&current));
    }
    env::join_paths(entries).map_err(|source| RunError::ActivationPath { source })
}
