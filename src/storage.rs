//! Disk usage reporting for session folders.

use std::path::Path;

use walkdir::WalkDir;

const BYTES_PER_MEGABYTE: u64 = 1024 * 1024;

/// Total size in bytes of every regular file under `directory`, at any depth.
///
/// Symlinks are not followed and contribute nothing; entries that cannot be
/// read are skipped. A missing directory reports zero.
pub fn folder_size(directory: &Path) -> u64 {
    WalkDir::new(directory)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}

/// Byte count as a megabyte figure for display.
pub fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MEGABYTE as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_folder_size_recurses() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("root.bin"), b"0123456789").unwrap();

        let sub = tmp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("sub.bin"), b"abcde").unwrap();

        assert_eq!(folder_size(tmp.path()), 15);
    }

    #[test]
    fn test_folder_size_empty_and_missing() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(folder_size(tmp.path()), 0);
        assert_eq!(folder_size(&tmp.path().join("missing")), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_folder_size_skips_symlinks() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("real.bin"), b"0123456789").unwrap();

        // Neither a dangling link nor a link back to a real file adds size.
        std::os::unix::fs::symlink("nowhere", tmp.path().join("dangling")).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("real.bin"), tmp.path().join("alias")).unwrap();

        assert_eq!(folder_size(tmp.path()), 10);
    }

    #[test]
    fn test_megabytes() {
        assert_eq!(megabytes(0), 0.0);
        assert_eq!(megabytes(1_048_576), 1.0);
        assert_eq!(megabytes(524_288), 0.5);
    }
}
