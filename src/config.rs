use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum ConfigActivation {
    None,
    CondaRun,
    Prefix,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) workdir: Option<PathBuf>,
    #[serde(default)]
    pub(crate) log_file: Option<PathBuf>,
    #[serde(default)]
    pub(crate) script: Option<PathBuf>,
    #[serde(default)]
    pub(crate) interpreter: Option<String>,
    #[serde(default)]
    pub(crate) args: Vec<String>,
    #[serde(default)]
    pub(crate) activation: Option<ConfigActivation>,
    #[serde(default)]
    pub(crate) env: Option<String>,
    #[serde(default)]
    pub(crate) env_prefix: Option<PathBuf>,
    #[serde(default)]
    pub(crate) conda: Option<String>,
    #[serde(default)]
    pub(crate) timestamp_format: Option<String>,
    #[serde(default)]
    pub(crate) timezone: Option<String>,
    #[serde(default)]
    pub(crate) finished_status: bool,
    #[serde(default)]
    pub(crate) debug: bool,
}

impl Config {
    /// Load the config file.
    ///
    /// An explicit path must exist and parse. Otherwise the standard locations
    /// are tried in order; a broken file there is only a warning.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self, AppError> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }

        for path in Self::get_config_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load_file(&path) {
                Ok(config) => {
                    // The debug flag is not set yet at this point
                    if config.debug {
                        eprintln!("Loaded config from {}", path.display());
                    }
                    return Ok(config);
                }
                Err(e) => eprintln!("Warning: {e}"),
            }
        }

        Ok(Self::default())
    }

    fn load_file(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&content).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(dir) = path.parent() {
            config.anchor_to(dir);
        }
        Ok(config)
    }

    /// Relative directories in a config file are relative to the file itself
    fn anchor_to(&mut self, dir: &Path) {
        for field in [&mut self.workdir, &mut self.env_prefix] {
            if let Some(p) = field.as_mut()
                && p.is_relative()
            {
                *p = dir.join(&*p);
            }
        }
    }

    pub(crate) fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config: ~/.config/update-runner/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("update-runner").join("config.toml"));
        }

        // 2. Platform config dir (AppData on Windows, Application Support on macOS)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("update-runner").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 3. Home directory: ~/.update-runner.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".update-runner.toml"));
        }

        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_paths() {
        let paths = Config::get_config_paths();
        assert!(!paths.is_empty());
        assert!(paths.iter().all(|p| p.to_string_lossy().contains("update-runner")));
    }

    #[test]
    fn parse_full_config() {
        let config = Config::parse(
            r#"
workdir = 'C:\Users\user\Google Drive\Projects\Electricity Prices\scripts'
log_file = "logs/update_log.txt"
script = "TradingIS_price_current_imp.py"
interpreter = "python"
args = ["--region", "VIC1"]
activation = "conda-run"
env = "mc_vic"
timestamp_format = "%d/%m/%Y %H:%M:%S"
timezone = "Australia/Melbourne"
finished_status = true
"#,
        )
        .unwrap();

        assert_eq!(config.activation, Some(ConfigActivation::CondaRun));
        assert_eq!(config.env.as_deref(), Some("mc_vic"));
        assert_eq!(config.args, vec!["--region", "VIC1"]);
        assert!(config.finished_status);
        assert!(!config.debug);
        assert!(config.workdir.is_some());
    }

    #[test]
    fn parse_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.workdir.is_none());
        assert!(config.activation.is_none());
        assert!(config.args.is_empty());
    }

    #[test]
    fn parse_rejects_unknown_activation() {
        assert!(Config::parse(r#"activation = "venv""#).is_err());
    }

    #[test]
    fn parse_rejects_unknown_key() {
        assert!(Config::parse(r#"retries = 3"#).is_err());
    }

    #[test]
    fn load_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, AppError::ConfigRead { .. }));
    }

    #[test]
    fn load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "activation = \"none\"\ninterpreter = \"python3\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.activation, Some(ConfigActivation::None));
        assert_eq!(config.interpreter.as_deref(), Some("python3"));
    }

    #[test]
    fn relative_directories_follow_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "workdir = \"jobs\"\nenv_prefix = \"envs/mc_vic\"\nlog_file = \"logs/run.txt\"\n")
            .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.workdir, Some(dir.path().join("jobs")));
        assert_eq!(config.env_prefix, Some(dir.path().join("envs/mc_vic")));
        // log_file stays relative to the working directory
        assert_eq!(config.log_file, Some(PathBuf::from("logs/run.txt")));
    }

    #[test]
    fn absolute_workdir_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            format!("workdir = {:?}\n", other.path().to_string_lossy()),
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.workdir.as_deref(), Some(other.path()));
    }

    #[test]
    fn load_explicit_broken_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "activation = [").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, AppError::ConfigParse { .. }));
    }
}
