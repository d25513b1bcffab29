/// Log file written by every run, relative to the working directory
pub(crate) const DEFAULT_LOG_FILE: &str = "logs/update_log.txt";

/// Price import script launched by the wrapper
pub(crate) const DEFAULT_SCRIPT: &str = "TradingIS_price_current_imp.py";

pub(crate) const DEFAULT_INTERPRETER: &str = "python";

/// Environment the script expects to run in
pub(crate) const DEFAULT_ENV_NAME: &str = "mc_vic";

pub(crate) const DEFAULT_CONDA: &str = "conda";

/// Marker timestamp format: "2025-01-15 06:30:00"
pub(crate) const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) const STARTING_TEXT: &str = "Starting update script...";
pub(crate) const FINISHED_TEXT: &str = "Finished update script.";

/// Exit code used when the interpreter cannot be found, as a shell would report it
pub(crate) const EXIT_NOT_FOUND: i32 = 127;
/// Exit code for configuration errors detected before anything runs
pub(crate) const EXIT_CONFIG: i32 = 2;
