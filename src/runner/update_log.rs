//! Append-only update log.
//!
//! The file is only ever opened in append mode. The child process writes to a
//! duplicate of the same handle, so marker lines and captured output land in
//! the order they were produced.

use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset};

use crate::consts::{FINISHED_TEXT, STARTING_TEXT};
use crate::error::{AppError, RunError};
use crate::utils::Timezone;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker {
    Starting,
    Finished,
}

impl Marker {
    fn text(self) -> &'static str {
        match self {
            Marker::Starting => STARTING_TEXT,
            Marker::Finished => FINISHED_TEXT,
        }
    }
}

/// Reject strftime formats chrono cannot render
pub(crate) fn validate_timestamp_format(format: &str) -> Result<(), AppError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(AppError::InvalidTimestampFormat {
            input: format.to_string(),
        });
    }
    Ok(())
}

/// Build one marker line (without the line ending).
///
/// `suffix` is appended after the marker text, separated by a space.
pub(crate) fn format_marker(
    marker: Marker,
    now: &DateTime<FixedOffset>,
    format: &str,
    suffix: Option<&str>,
) -> String {
    let mut line = String::new();
    if write!(line, "[{}]", now.format(format)).is_err() {
        line.clear();
        line.push_str(&format!("[{}]", now.to_rfc3339()));
    }
    line.push(' ');
    line.push_str(marker.text());
    if let Some(suffix) = suffix {
        line.push(' ');
        line.push_str(suffix);
    }
    line
}

#[derive(Debug)]
pub(crate) struct UpdateLog {
    path: PathBuf,
    file: File,
    timestamp_format: String,
    timezone: Timezone,
}

impl UpdateLog {
    pub(crate) fn open(
        path: &Path,
        timestamp_format: &str,
        timezone: Timezone,
    ) -> Result<Self, RunError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| RunError::Log {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| RunError::Log {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            timestamp_format: timestamp_format.to_string(),
            timezone,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn marker(&mut self, marker: Marker, suffix: Option<&str>) -> Result<(), RunError> {
        let line = format_marker(marker, &self.timezone.now(), &self.timestamp_format, suffix);
        self.write_line(&line)
    }

    /// Append free text, the way a shell appends an error message to redirected output
    pub(crate) fn note(&mut self, text: &str) -> Result<(), RunError> {
        self.write_line(text.trim_end())
    }

    /// A handle onto the same append-mode file for a child's stdout or stderr
    pub(crate) fn stdio(&self) -> Result<Stdio, RunError> {
        self.file
            .try_clone()
            .map(Stdio::from)
            .map_err(|source| self.log_error(source))
    }

    fn write_line(&mut self, line: &str) -> Result<(), RunError> {
        writeln!(self.file, "{line}")
            .and_then(|()| self.file.flush())
            .map_err(|source| self.log_error(source))
    }

    fn log_error(&self, source: std::io::Error) -> RunError {
        RunError::Log {
            path: self.path.clone(),
            source,
        }
    }
}
