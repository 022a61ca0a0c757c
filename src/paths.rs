//! Default on-disk location for session roots.

use std::path::PathBuf;

use directories::UserDirs;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not resolve a home directory on this platform")]
    UnsupportedPlatform,
}

/// Default session root: `<home>/SOUNDS/spectrograms`.
///
/// Fails fast when the platform has no resolvable home directory rather than
/// guessing a location. Callers that want a different root pass it explicitly;
/// nothing below this function touches ambient state.
pub fn default_root_dir() -> Result<PathBuf, PathError> {
    let user_dirs = UserDirs::new().ok_or(PathError::UnsupportedPlatform)?;
    Ok(user_dirs.home_dir().join("SOUNDS").join("spectrograms"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_root_layout() {
        let root = default_root_dir().unwrap();
        assert!(root.ends_with("SOUNDS/spectrograms"));
        assert!(root.is_absolute());
    }
}
