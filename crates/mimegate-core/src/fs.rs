//! Filesystem abstraction for dependency injection in the gatekeeper.
//!
//! The gatekeeper only needs three capabilities from the host: read the
//! leading bytes of an upload, tell files from directories, and remove a
//! rejected upload. The `FileSystem` trait captures exactly that so scans can
//! be tested without touching disk.
//!
//! ## Usage
//!
//! Production code uses `RealFileSystem`:
//!
//! ```ignore
//! let fs = RealFileSystem;
//! let head = fs.read_head(Path::new("upload.tmp"), 8192)?;
//! ```
//!
//! Test code can use `MockFileSystem` to simulate uploads:
//!
//! ```ignore
//! let mock = MockFileSystem::new();
//! mock.add_file("upload.tmp", b"\x89PNG\r\n\x1a\n".to_vec());
//! let head = mock.read_head(Path::new("upload.tmp"), 8192)?;
//! ```

use crate::error::{ScanError, ScanResult};
use std::io::Read;
use std::path::Path;

/// Trait abstracting the filesystem operations a scan performs.
pub trait FileSystem: Send + Sync + std::fmt::Debug {
    /// Read at most `limit` bytes from the start of a regular file.
    ///
    /// Fails with [`ScanError::Unreadable`] when the file cannot be opened or
    /// read, and with [`ScanError::NotRegularFile`] for directories and other
    /// special files.
    fn read_head(&self, path: &Path, limit: usize) -> ScanResult<Vec<u8>>;

    /// Check if a path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Check if a path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Remove a file. Used to discard rejected uploads.
    fn remove_file(&self, path: &Path) -> ScanResult<()>;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_head(&self, path: &Path, limit: usize) -> ScanResult<Vec<u8>> {
        let unreadable = |source| ScanError::Unreadable {
            path: path.to_path_buf(),
            source,
        };

        // Opening a FIFO blocks until a writer shows up, so the file type is
        // checked before the open.
        let metadata = std::fs::metadata(path).map_err(unreadable)?;
        if !metadata.is_file() {
            return Err(ScanError::NotRegularFile {
                path: path.to_path_buf(),
            });
        }
        let file = std::fs::File::open(path).map_err(unreadable)?;

        let capacity = usize::try_from(metadata.len()).map_or(limit, |len| len.min(limit));
        let mut buf = Vec::with_capacity(capacity);
        file.take(limit as u64)
            .read_to_end(&mut buf)
            .map_err(unreadable)?;
        Ok(buf)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn remove_file(&self, path: &Path) -> ScanResult<()> {
        std::fs::remove_file(path).map_err(|source| ScanError::RemoveFailed {
            path: path.to_path_buf(),
            source,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_real_fs_read_head_truncates() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("upload.txt");
        fs::write(&file_path, "Hello, world!").unwrap();

        let fs = RealFileSystem;
        assert_eq!(fs.read_head(&file_path, 5).unwrap(), b"Hello");
        assert_eq!(fs.read_head(&file_path, 1024).unwrap(), b"Hello, world!");
    }

    #[test]
    fn test_real_fs_read_head_missing_file() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem;
        let result = fs.read_head(&temp.path().join("missing"), 16);
        assert!(matches!(result, Err(ScanError::Unreadable { .. })));
    }

    #[test]
    fn test_real_fs_read_head_directory() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem;
        let result = fs.read_head(temp.path(), 16);
        assert!(matches!(result, Err(ScanError::NotRegularFile { .. })));
        assert!(result.unwrap_err().is_unreadable());
    }

    #[cfg(unix)]
    #[test]
    fn test_real_fs_read_head_fifo_does_not_block() {
        let temp = TempDir::new().unwrap();
        let fifo = temp.path().join("pipe");
        let status = std::process::Command::new("mkfifo")
            .arg(&fifo)
            .status()
            .unwrap();
        assert!(status.success());

        let result = RealFileSystem.read_head(&fifo, 16);
        assert!(matches!(result, Err(ScanError::NotRegularFile { .. })));
    }

    #[test]
    fn test_real_fs_is_file_and_dir() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("file.bin");
        let dir_path = temp.path().join("dir");
        fs::write(&file_path, "content").unwrap();
        fs::create_dir(&dir_path).unwrap();

        let fs = RealFileSystem;
        assert!(fs.is_file(&file_path));
        assert!(!fs.is_dir(&file_path));
        assert!(fs.is_dir(&dir_path));
        assert!(!fs.is_file(&dir_path));
    }

    #[test]
    fn test_real_fs_remove_file() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("rejected.exe");
        fs::write(&file_path, "MZ").unwrap();

        let fs = RealFileSystem;
        fs.remove_file(&file_path).unwrap();
        assert!(!file_path.exists());
        assert!(matches!(
            fs.remove_file(&file_path),
            Err(ScanError::RemoveFailed { .. })
        ));
    }
}
