//! Numbered session folders
//!
//! Sessions are plain directories named `session_<N>` under a common root.
//! There is no counter file: the next number is re-derived from the directory
//! listing on every allocation, and the directory entry itself is the claim.
//! Exclusive creation (`fs::create_dir`) resolves races with other processes
//! by retrying on `AlreadyExists`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jiff::Zoned;
use thiserror::Error;

/// Directory-name prefix shared by all session folders.
pub const SESSION_PREFIX: &str = "session_";

/// Session folder error types
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Directory not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to create session directory {path}: {source}")]
    Allocation { path: PathBuf, source: io::Error },
    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// Parse a directory name of the form `session_<N>`.
///
/// The whole name must match: a `session_` prefix followed by nothing but
/// ASCII digits. Leading zeros are accepted (`session_02` is session 2).
/// Digit runs that do not fit in a `u64` are treated as malformed.
fn parse_session_name(name: &str) -> Option<u64> {
    let digits = name.strip_prefix(SESSION_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn session_path(directory: &Path, number: u64) -> PathBuf {
    directory.join(format!("{SESSION_PREFIX}{number}"))
}

/// Collect the numbers of all session folders directly under `directory`.
///
/// Entries that are not directories, or whose names do not match the session
/// pattern, are skipped. Arbitrary user files may live next to sessions.
pub fn session_numbers(directory: &Path) -> Result<Vec<u64>, SessionError> {
    if !directory.is_dir() {
        return Err(SessionError::NotFound(directory.to_path_buf()));
    }

    let entries = fs::read_dir(directory).map_err(|source| SessionError::Io {
        path: directory.to_path_buf(),
        source,
    })?;

    let mut numbers = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SessionError::Io {
            path: directory.to_path_buf(),
            source,
        })?;

        if !entry.path().is_dir() {
            continue;
        }

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };

        if let Some(number) = parse_session_name(name) {
            numbers.push(number);
        }
    }

    Ok(numbers)
}

/// Create the next session folder under `directory` and return its path.
///
/// The root is created first if it does not exist. The new session number is
/// one past the highest existing number (gaps are never refilled). Creation
/// uses exclusive semantics: if another writer claims the same number between
/// the scan and the create, the number is bumped and creation retried. Any
/// other failure is fatal.
pub fn create_session_folder(directory: &Path) -> Result<PathBuf, SessionError> {
    fs::create_dir_all(directory).map_err(|source| SessionError::Allocation {
        path: directory.to_path_buf(),
        source,
    })?;

    let mut next = session_numbers(directory)?.into_iter().max().unwrap_or(0) + 1;
    loop {
        let session_dir = session_path(directory, next);
        match fs::create_dir(&session_dir) {
            Ok(()) => return Ok(session_dir),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => next += 1,
            Err(source) => {
                return Err(SessionError::Allocation {
                    path: session_dir,
                    source,
                });
            }
        }
    }
}

/// Return the highest-numbered session folder, or `None` if there are no
/// sessions yet. A missing root is a valid empty state, not an error.
pub fn latest_session_folder(directory: &Path) -> Result<Option<PathBuf>, SessionError> {
    if !directory.is_dir() {
        return Ok(None);
    }

    let latest = session_numbers(directory)?.into_iter().max();
    Ok(latest.map(|number| session_path(directory, number)))
}

/// Delete the highest-numbered session folder and everything in it.
///
/// Returns the path that was removed, or `None` if there was nothing to
/// delete.
pub fn delete_latest_session(directory: &Path) -> Result<Option<PathBuf>, SessionError> {
    let Some(latest) = latest_session_folder(directory)? else {
        return Ok(None);
    };

    fs::remove_dir_all(&latest).map_err(|source| SessionError::Io {
        path: latest.clone(),
        source,
    })?;
    Ok(Some(latest))
}

/// Build an artifact filename like `recording_2026-08-07_14-03-22.wav`.
///
/// Timestamp suffixes keep multiple artifacts from colliding within one
/// session folder.
pub fn timestamped_filename(prefix: &str, extension: &str) -> String {
    let timestamp = Zoned::now().strftime("%Y-%m-%d_%H-%M-%S");
    format!("{prefix}_{timestamp}.{extension}")
}
