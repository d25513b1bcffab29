//! CLI argument definitions
//!
//! Global CLI options and the merge of CLI, config file and defaults into a
//! [`RunPlan`].

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{Config, ConfigActivation};
use crate::consts::{
    DEFAULT_CONDA, DEFAULT_ENV_NAME, DEFAULT_INTERPRETER, DEFAULT_LOG_FILE, DEFAULT_SCRIPT,
    DEFAULT_TIMESTAMP_FORMAT,
};
use crate::error::{AppError, RunError};
use crate::runner::{Activation, RunPlan, validate_timestamp_format};
use crate::utils::Timezone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ActivationMode {
    /// Use the interpreter found on PATH
    None,
    /// Run through `conda run -n <env>` (default)
    CondaRun,
    /// Put an environment directory first on PATH (--env-prefix)
    Prefix,
}

impl From<ConfigActivation> for ActivationMode {
    fn from(value: ConfigActivation) -> Self {
        match value {
            ConfigActivation::None => ActivationMode::None,
            ConfigActivation::CondaRun => ActivationMode::CondaRun,
            ConfigActivation::Prefix => ActivationMode::Prefix,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "update-runner")]
#[command(
    about = "Run the electricity price update script and append its output to a log",
    version
)]
pub(crate) struct Cli {
    /// Working directory; relative paths are resolved against it (default: current directory)
    #[arg(short = 'C', long, value_name = "DIR")]
    pub(crate) workdir: Option<PathBuf>,

    /// Log file to append to (default: logs/update_log.txt)
    #[arg(short, long, value_name = "PATH")]
    pub(crate) log_file: Option<PathBuf>,

    /// Script to run (default: TradingIS_price_current_imp.py)
    #[arg(short, long, value_name = "PATH")]
    pub(crate) script: Option<PathBuf>,

    /// Interpreter that runs the script (default: python)
    #[arg(short, long, value_name = "PROGRAM")]
    pub(crate) interpreter: Option<String>,

    /// How to activate the environment
    #[arg(long, value_enum)]
    pub(crate) activation: Option<ActivationMode>,

    /// Environment name (default: mc_vic)
    #[arg(short, long, value_name = "NAME")]
    pub(crate) env: Option<String>,

    /// Environment directory for prefix activation
    #[arg(long, value_name = "DIR")]
    pub(crate) env_prefix: Option<PathBuf>,

    /// conda executable for conda-run activation (default: $CONDA_EXE, then conda)
    #[arg(long, value_name = "PROGRAM")]
    pub(crate) conda: Option<String>,

    /// Marker timestamp format, chrono strftime syntax (default: "%Y-%m-%d %H:%M:%S")
    #[arg(long, value_name = "FORMAT")]
    pub(crate) timestamp_format: Option<String>,

    /// Timezone for marker timestamps (e.g., "local", "UTC", "Australia/Melbourne")
    #[arg(long, value_name = "TZ")]
    pub(crate) timezone: Option<String>,

    /// Record the script's exit code on the Finished line
    #[arg(long)]
    pub(crate) finished_status: bool,

    /// Config file (default: searched in the usual config locations)
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,

    /// Print the resolved run plan as JSON and exit without running anything
    #[arg(long)]
    pub(crate) dry_run: bool,

    /// Enable debug output on stderr
    #[arg(long)]
    pub(crate) debug: bool,

    /// Extra arguments passed to the script
    #[arg(last = true, value_name = "ARGS")]
    pub(crate) script_args: Vec<String>,
}

impl Cli {
    /// Merge config file values into CLI (CLI args take precedence)
    pub(crate) fn with_config(mut self, config: Config) -> Self {
        if !self.finished_status && config.finished_status {
            self.finished_status = true;
        }
        if !self.debug && config.debug {
            self.debug = true;
        }

        // A prefix given on the command line outranks the config's activation mode
        if self.activation.is_none() && self.env_prefix.is_some() {
            self.activation = Some(ActivationMode::Prefix);
        }
        if self.activation.is_none() {
            self.activation = config.activation.map(ActivationMode::from);
        }

        if self.workdir.is_none() {
            self.workdir = config.workdir;
        }
        if self.log_file.is_none() {
            self.log_file = config.log_file;
        }
        if self.script.is_none() {
            self.script = config.script;
        }
        if self.interpreter.is_none() {
            self.interpreter = config.interpreter;
        }
        if self.env.is_none() {
            self.env = config.env;
        }
        if self.env_prefix.is_none() {
            self.env_prefix = config.env_prefix;
        }
        if self.conda.is_none() {
            self.conda = config.conda;
        }
        if self.timestamp_format.is_none() {
            self.timestamp_format = config.timestamp_format;
        }
        if self.timezone.is_none() {
            self.timezone = config.timezone;
        }
        if self.script_args.is_empty() {
            self.script_args = config.args;
        }

        self
    }

    /// An explicit prefix implies prefix activation; otherwise conda-run
    fn activation_mode(&self) -> ActivationMode {
        match (self.activation, &self.env_prefix) {
            (Some(mode), _) => mode,
            (None, Some(_)) => ActivationMode::Prefix,
            (None, None) => ActivationMode::CondaRun,
        }
    }

    fn activation(&self) -> Result<Activation, AppError> {
        let env = self
            .env
            .clone()
            .unwrap_or_else(|| DEFAULT_ENV_NAME.to_string());

        Ok(match self.activation_mode() {
            ActivationMode::None => Activation::None,
            ActivationMode::CondaRun => Activation::CondaRun {
                conda: self
                    .conda
                    .clone()
                    .or_else(|| std::env::var("CONDA_EXE").ok().filter(|s| !s.is_empty()))
                    .unwrap_or_else(|| DEFAULT_CONDA.to_string()),
                env,
            },
            ActivationMode::Prefix => Activation::Prefix {
                prefix: self.env_prefix.clone().ok_or(AppError::MissingEnvPrefix)?,
                env,
            },
        })
    }

    /// Fill in defaults and validate everything that can be checked without running
    pub(crate) fn into_plan(self) -> Result<RunPlan, AppError> {
        let activation = self.activation()?;

        let timestamp_format = self
            .timestamp_format
            .unwrap_or_else(|| DEFAULT_TIMESTAMP_FORMAT.to_string());
        validate_timestamp_format(&timestamp_format)?;

        let timezone = Timezone::parse(self.timezone.as_deref())?;

        let workdir = match self.workdir {
            Some(dir) => dir,
            None => std::env::current_dir().map_err(|source| RunError::Workspace {
                path: PathBuf::from("."),
                source,
            })?,
        };

        Ok(RunPlan {
            workdir,
            log_file: self
                .log_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            interpreter: self
                .interpreter
                .unwrap_or_else(|| DEFAULT_INTERPRETER.to_string()),
            script: self.script.unwrap_or_else(|| PathBuf::from(DEFAULT_SCRIPT)),
            args: self.script_args,
            activation,
            timestamp_format,
            timezone,
            finished_status: self.finished_status,
        })
    }
}
