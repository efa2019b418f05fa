use crate::constants::SNIFF_LEN;
use crate::error::{QuantError, Result};
use crate::shrink::{ShrinkOptions, ShrinkOutcome, Shrinker};
use image::ImageFormat;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Options for shrinking a whole directory tree.
#[derive(Debug, Clone, Default)]
pub struct DirOptions {
    /// Root of a mirrored output tree. Created up front if missing.
    pub destination: Option<PathBuf>,
    /// Without a destination, write improved images back over their sources.
    pub overwrite: bool,
    pub shrink: ShrinkOptions,
}

/// Result for one image found during a walk.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub source: PathBuf,
    /// Where the improved image was written, if anywhere.
    pub written: Option<PathBuf>,
    pub original_len: usize,
    pub outcome: ShrinkOutcome,
}

/// Everything a finished walk produced, failures included.
#[derive(Debug, Default)]
pub struct WalkReport {
    pub results: Vec<FileOutcome>,
    pub failures: Vec<QuantError>,
}

impl WalkReport {
    pub fn original_bytes(&self) -> u64 {
        self.results.iter().map(|r| r.original_len as u64).sum()
    }

    pub fn final_bytes(&self) -> u64 {
        self.results.iter().map(|r| r.outcome.bytes.len() as u64).sum()
    }
}

/// Lazily shrinks every image under a directory, one file per `next()`.
///
/// Files are visited depth-first, sorted by name within each directory.
/// Symlinks to files are shrunk; symlinked directories are not descended into.
/// A failing file yields `Err(QuantError::InFile { .. })` and the walk goes on.
pub struct DirShrink<'a> {
    shrinker: &'a Shrinker,
    options: &'a DirOptions,
    root: PathBuf,
    destination: Option<PathBuf>,
    /// Destination subtree to leave alone, set only when it lies strictly inside `root`.
    nested_output: Option<PathBuf>,
    entries: walkdir::IntoIter,
}

impl Shrinker {
    /// Starts a walk over `dir`.
    ///
    /// # Returns
    /// * `Err(QuantError::ToolNotFound)` - Quantizer missing; nothing has been traversed
    /// * `Err(QuantError::NotADirectory)` - `dir` is not a directory
    pub fn shrink_dir<'a>(&'a self, dir: &Path, options: &'a DirOptions) -> Result<DirShrink<'a>> {
        self.ensure_available()?;
        if !dir.is_dir() {
            return Err(QuantError::NotADirectory(dir.to_path_buf()));
        }
        let root = dir.canonicalize()?;

        let destination = match &options.destination {
            Some(destination) => {
                fs::create_dir_all(destination)
                    .map_err(|_| QuantError::DirectoryCreationFailed(destination.clone()))?;
                Some(destination.canonicalize()?)
            }
            None => None,
        };

        let nested_output = destination
            .as_ref()
            .filter(|destination| **destination != root && destination.starts_with(&root))
            .cloned();

        Ok(DirShrink {
            shrinker: self,
            options,
            entries: WalkDir::new(&root).sort_by_file_name().into_iter(),
            root,
            destination,
            nested_output,
        })
    }

    /// Walks `dir` to the end and collects every result and failure.
    pub fn shrink_all(&self, dir: &Path, options: &DirOptions) -> Result<WalkReport> {
        Ok(self.shrink_dir(dir, options)?.report())
    }
}

impl DirShrink<'_> {
    pub fn report(self) -> WalkReport {
        let mut report = WalkReport::default();
        for item in self {
            match item {
                Ok(result) => report.results.push(result),
                Err(e) => report.failures.push(e),
            }
        }
        report
    }

    fn process(&self, path: &Path) -> Result<Option<FileOutcome>> {
        if sniff_image(path)?.is_none() {
            crate::verbose!("Skipping non-image {:?}", path);
            return Ok(None);
        }

        let destination = self
            .destination
            .as_deref()
            .map(|dir| mirror_path(&self.root, path, dir));
        let original_len = fs::metadata(path)?.len() as usize;
        let outcome = self.shrinker.shrink_file(
            path,
            destination.as_deref(),
            self.options.overwrite,
            &self.options.shrink,
        )?;

        let written = if outcome.improved() {
            destination.or_else(|| self.options.overwrite.then(|| path.to_path_buf()))
        } else {
            None
        };

        Ok(Some(FileOutcome {
            source: path.to_path_buf(),
            written,
            original_len,
            outcome,
        }))
    }
}

impl Iterator for DirShrink<'_> {
    type Item = Result<FileOutcome>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    return Some(Err(QuantError::in_file(path, e.into())));
                }
            };

            // Never feed our own output back in when it lives under the source tree.
            if let Some(nested) = &self.nested_output {
                if entry.path().starts_with(nested) {
                    if entry.file_type().is_dir() {
                        self.entries.skip_current_dir();
                    }
                    continue;
                }
            }

            // `Path::is_file` follows symlinks, unlike the entry's own file type.
            if !entry.path().is_file() {
                continue;
            }

            match self.process(entry.path()) {
                Ok(Some(result)) => return Some(Ok(result)),
                Ok(None) => continue,
                Err(e) => return Some(Err(QuantError::in_file(entry.path(), e))),
            }
        }
    }
}

/// Detects an image by its leading bytes, ignoring the file name.
pub fn sniff_image(path: &Path) -> Result<Option<ImageFormat>> {
    let mut header = Vec::with_capacity(SNIFF_LEN as usize);
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut header)?;
    Ok(image::guess_format(&header).ok())
}

/// Maps `path` under `root` to the same relative spot under `destination`.
pub fn mirror_path(root: &Path, path: &Path, destination: &Path) -> PathBuf {
    match path.strip_prefix(root) {
        Ok(relative) => destination.join(relative),
        Err(_) => destination.join(path.file_name().unwrap_or(path.as_os_str())),
    }
}
