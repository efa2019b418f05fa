#![allow(dead_code)]

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use quant_squeeze::{Compressor, QuantConfig, Result, ScratchLocation};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// A solid-colour PNG written with no filtering and fast deflate, so any
/// optimizer has plenty to remove.
pub fn loose_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([20, 120, 220]));
    let mut out = Vec::new();
    PngEncoder::new_with_quality(&mut out, CompressionType::Fast, FilterType::NoFilter)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

pub fn write_png(path: &Path, width: u32, height: u32) -> Vec<u8> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let data = loose_png(width, height);
    fs::write(path, &data).unwrap();
    data
}

/// Config whose scratch files land in `scratch_dir`.
pub fn config_in(tool: &Path, scratch_dir: &Path) -> QuantConfig {
    QuantConfig::new(tool).with_scratch(ScratchLocation::Unique {
        dir: Some(scratch_dir.to_path_buf()),
    })
}

pub fn dir_is_empty(dir: &Path) -> bool {
    fs::read_dir(dir).unwrap().next().is_none()
}

/// Drops `step` bytes per call, never going below `floor`.
pub struct Trimming {
    pub step: usize,
    pub floor: usize,
    pub calls: Arc<AtomicU32>,
}

impl Trimming {
    pub fn new(step: usize, floor: usize) -> Self {
        Self {
            step,
            floor,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicU32> {
        self.calls.clone()
    }
}

impl Compressor for Trimming {
    fn name(&self) -> &str {
        "trimming"
    }

    fn compress(&self, input: &[u8], _scratch: &Path) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let len = input.len().saturating_sub(self.step).max(self.floor).min(input.len());
        Ok(input[..len].to_vec())
    }
}

/// Hands its input back untouched.
pub struct Identity;

impl Compressor for Identity {
    fn name(&self) -> &str {
        "identity"
    }

    fn compress(&self, input: &[u8], _scratch: &Path) -> Result<Vec<u8>> {
        Ok(input.to_vec())
    }
}

#[cfg(unix)]
pub mod tools {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    pub fn write_tool(dir: &Path, name: &str, script: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Echoes stdin back: never shrinks anything.
    pub fn passthrough(dir: &Path) -> PathBuf {
        write_tool(dir, "passthrough", "#!/bin/sh\nexec cat\n")
    }

    /// Exits the way pngquant does when it cannot meet the quality floor.
    pub fn failing(dir: &Path) -> PathBuf {
        write_tool(dir, "failing", "#!/bin/sh\nexit 99\n")
    }

    /// Drops the first byte of stdin on every call.
    pub fn nibbling(dir: &Path) -> PathBuf {
        write_tool(dir, "nibbling", "#!/bin/sh\nexec tail -c +2\n")
    }

    /// Always prints the same payload, whatever it is given.
    pub fn fixed(dir: &Path, payload: &[u8]) -> PathBuf {
        let payload_path = dir.join("payload.bin");
        fs::write(&payload_path, payload).unwrap();
        let script = format!("#!/bin/sh\nexec cat '{}'\n", payload_path.display());
        write_tool(dir, "fixed", &script)
    }

    /// Records its arguments to `log`, then echoes stdin back.
    pub fn recording(dir: &Path, log: &Path) -> PathBuf {
        let script = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\nexec cat\n",
            log.display()
        );
        write_tool(dir, "recording", &script)
    }
}

pub fn missing_tool() -> PathBuf {
    PathBuf::from("/nonexistent/bin/pngquant")
}
