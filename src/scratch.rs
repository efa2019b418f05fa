use crate::config::ScratchLocation;
use crate::constants::{SCRATCH_PREFIX, SCRATCH_SUFFIX};
use crate::error::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::Builder;

/// On-disk copy of the image currently being worked on.
///
/// The file is removed when this value drops, on success and error paths
/// alike, unless it was created with `keep` set.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    keep: bool,
}

impl ScratchFile {
    /// Creates the scratch file and fills it with `initial`.
    pub fn create(location: &ScratchLocation, keep: bool, initial: &[u8]) -> Result<Self> {
        let path = match location {
            ScratchLocation::Unique { dir } => {
                let mut builder = Builder::new();
                builder.prefix(SCRATCH_PREFIX).suffix(SCRATCH_SUFFIX);
                let file = match dir {
                    Some(dir) => builder.tempfile_in(dir)?,
                    None => builder.tempfile()?,
                };
                // Lifetime is managed by `Drop` below, not by tempfile.
                file.into_temp_path().keep().map_err(|e| e.error)?
            }
            ScratchLocation::Shared(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                path.clone()
            }
        };

        let scratch = Self { path, keep };
        scratch.write(initial)?;
        Ok(scratch)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the whole file content.
    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    /// Ends the scratch file's life. Returns its path when it is being kept.
    pub fn finish(self) -> Option<PathBuf> {
        if self.keep {
            Some(self.path.clone())
        } else {
            None
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                crate::verbose!("Could not remove scratch file {:?}: {}", self.path, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unique_scratch_is_removed_on_drop() {
        let temp_dir = TempDir::new().unwrap();
        let location = ScratchLocation::Unique {
            dir: Some(temp_dir.path().to_path_buf()),
        };

        let scratch = ScratchFile::create(&location, false, b"png bytes").unwrap();
        let path = scratch.path().to_path_buf();
        assert!(path.starts_with(temp_dir.path()));
        assert_eq!(fs::read(&path).unwrap(), b"png bytes");

        assert_eq!(scratch.finish(), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_unique_scratch_names_differ() {
        let temp_dir = TempDir::new().unwrap();
        let location = ScratchLocation::Unique {
            dir: Some(temp_dir.path().to_path_buf()),
        };

        let first = ScratchFile::create(&location, false, b"a").unwrap();
        let second = ScratchFile::create(&location, false, b"b").unwrap();
        assert_ne!(first.path(), second.path());

        let name = first.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("quant-"));
        assert!(name.ends_with(".tmp.png"));
    }

    #[test]
    fn test_kept_scratch_survives() {
        let temp_dir = TempDir::new().unwrap();
        let location = ScratchLocation::Unique {
            dir: Some(temp_dir.path().to_path_buf()),
        };

        let scratch = ScratchFile::create(&location, true, b"first").unwrap();
        scratch.write(b"second").unwrap();
        let kept = scratch.finish().unwrap();

        assert_eq!(fs::read(&kept).unwrap(), b"second");
    }

    #[test]
    fn test_shared_scratch_creates_parent_and_cleans_up() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("quant.tmp.png");
        let location = ScratchLocation::Shared(path.clone());

        let scratch = ScratchFile::create(&location, false, b"data").unwrap();
        assert_eq!(scratch.path(), path.as_path());
        assert!(path.exists());

        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_tolerates_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gone.png");
        let scratch =
            ScratchFile::create(&ScratchLocation::Shared(path.clone()), false, b"x").unwrap();

        fs::remove_file(&path).unwrap();
        drop(scratch);
        assert!(!path.exists());
    }
}
