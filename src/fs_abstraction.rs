//! Filesystem abstraction layer for testability
//!
//! Every data file the pipeline touches goes through the [`FileSystem`]
//! trait, so tests can swap in a `MockFileSystem` (generated by mockall)
//! and assert that nothing is written when preflight checks fail.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

#[cfg(test)]
use mockall::automock;

/// Filesystem operations used by banip.
///
/// # Example (testing)
/// ```ignore
/// use banip::fs_abstraction::MockFileSystem;
/// use std::path::Path;
///
/// let mut mock_fs = MockFileSystem::new();
/// mock_fs.expect_exists().returning(|_| false);
/// ```
#[cfg_attr(test, automock)]
pub trait FileSystem {
    /// Read file contents as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Read file contents as bytes.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Replace a file's contents in one step (temp file + rename).
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// Production implementation backed by std::fs.
#[derive(Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        // Temp file must live in the target directory for rename to be atomic
        let parent_dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut temp_file = NamedTempFile::new_in(parent_dir)?;
        temp_file.write_all(contents)?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

static REAL_FS: RealFileSystem = RealFileSystem;

/// Shared production filesystem instance.
pub fn real_fs() -> &'static RealFileSystem {
    &REAL_FS
}
