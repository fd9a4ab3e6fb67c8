//! PID file bookkeeping and the `stop` command.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// File name of the PID file in the temporary directory
pub const PID_FILE_NAME: &str = "zen-timer.pid";

#[derive(Debug, Error)]
pub enum PidFileError {
    #[error("PID file I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("PID file does not hold a process id: {0:?}")]
    Malformed(String),

    #[error("failed to signal process {pid}: {source}")]
    Signal { pid: i32, source: io::Error },

    #[error("process signals are not supported on this platform")]
    Unsupported,
}

/// Well-known PID file location shared by the overlay and `stop`
pub fn default_pid_path() -> PathBuf {
    if cfg!(unix) {
        PathBuf::from("/tmp").join(PID_FILE_NAME)
    } else {
        std::env::temp_dir().join(PID_FILE_NAME)
    }
}

/// Decimal process id stored at a fixed path
#[derive(Debug, Clone)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file atomically so readers never see a partial PID
    pub fn write(&self, pid: u32) -> Result<(), PidFileError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        staged.write_all(pid.to_string().as_bytes())?;
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|e| e.error)?;
        debug!("Wrote PID {} to {}", pid, self.path.display());
        Ok(())
    }

    pub fn write_current(&self) -> Result<(), PidFileError> {
        self.write(std::process::id())
    }

    pub fn read(&self) -> Result<i32, PidFileError> {
        let contents = fs::read_to_string(&self.path)?;
        let trimmed = contents.trim();
        match trimmed.parse::<i32>() {
            Ok(pid) if pid > 0 => Ok(pid),
            _ => Err(PidFileError::Malformed(trimmed.to_string())),
        }
    }

    /// Remove the file; a missing file is not an error
    pub fn remove(&self) -> Result<(), PidFileError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Result of the `stop` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotRunning,
}

impl StopOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            StopOutcome::Stopped => "zen-timer: stopped",
            StopOutcome::NotRunning => "zen-timer: not running",
        }
    }
}

/// Signal the recorded process and delete the PID file
///
/// Every failure (no file, bad contents, undeliverable signal) reads as
/// "not running". A file whose process cannot be signalled is stale and is
/// removed as well.
pub fn stop_running<F>(pid_file: &PidFile, signal: F) -> StopOutcome
where
    F: FnOnce(i32) -> Result<(), PidFileError>,
{
    let pid = match pid_file.read() {
        Ok(pid) => pid,
        Err(e) => {
            debug!("No running timer: {}", e);
            return StopOutcome::NotRunning;
        }
    };

    let outcome = match signal(pid) {
        Ok(()) => StopOutcome::Stopped,
        Err(e) => {
            debug!("Stale PID file: {}", e);
            StopOutcome::NotRunning
        }
    };

    if let Err(e) = pid_file.remove() {
        debug!("Could not remove {}: {}", pid_file.path().display(), e);
    }
    outcome
}

/// Ask process `pid` to terminate (SIGTERM)
#[cfg(unix)]
pub fn send_terminate(pid: i32) -> Result<(), PidFileError> {
    // kill(2) with pid <= 0 targets process groups
    if pid <= 0 {
        return Err(PidFileError::Malformed(pid.to_string()));
    }

    // SAFETY: kill has no memory-safety preconditions
    let result = unsafe { libc::kill(pid, libc::SIGTERM) };
    if result == 0 {
        Ok(())
    } else {
        Err(PidFileError::Signal {
            pid,
            source: io::Error::last_os_error(),
        })
    }
}

#[cfg(not(unix))]
pub fn send_terminate(_pid: i32) -> Result<(), PidFileError> {
    Err(PidFileError::Unsupported)
}
