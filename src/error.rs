use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("Invalid timezone: {input}")]
    InvalidTimezone { input: String },

    #[error("Invalid timestamp format \"{input}\"")]
    InvalidTimestampFormat { input: String },

    #[error("Failed to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Prefix activation requires an environment directory (--env-prefix)")]
    MissingEnvPrefix,

    #[error("{0}")]
    Run(#[from] RunError),
}

#[derive(Debug, Error)]
pub(crate) enum RunError {
    #[error("Working directory {} is not usable: {source}", .path.display())]
    Workspace {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Working directory {} is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("Failed to write log {}: {source}", .path.display())]
    Log {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Environment directory {} does not exist", .path.display())]
    Activation { path: PathBuf },

    #[error("Failed to build PATH for environment: {source}")]
    ActivationPath { source: std::env::JoinPathsError },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_error_display_timezone() {
        let e = AppError::InvalidTimezone {
            input: "Mars/Olympus".to_string(),
        };
        assert_eq!(e.to_string(), "Invalid timezone: Mars/Olympus");
    }

    #[test]
    fn app_error_display_timestamp_format() {
        let e = AppError::InvalidTimestampFormat {
            input: "%Q".to_string(),
        };
        assert_eq!(e.to_string(), r#"Invalid timestamp format "%Q""#);
    }

    #[test]
    fn run_error_display_activation() {
        let e = RunError::Activation {
            path: PathBuf::from("/opt/envs/mc_vic"),
        };
        assert_eq!(
            e.to_string(),
            "Environment directory /opt/envs/mc_vic does not exist"
        );
    }

    #[test]
    fn app_error_from_run_error() {
        let run = RunError::NotADirectory {
            path: PathBuf::from("/tmp/file.txt"),
        };
        let app: AppError = run.into();
        assert_eq!(
            app.to_string(),
            "Working directory /tmp/file.txt is not a directory"
        );
    }
}
