use crate::constants::{
    DEFAULT_DEPTH, DEFAULT_FALLBACK_QUALITY, DEFAULT_MAX_QUALITY, DEFAULT_MIN_QUALITY,
    DEFAULT_PRECISION, MAX_PRECISION, MAX_QUALITY, MAX_SPEED, MIN_FALLBACK_QUALITY,
    MIN_PRECISION, MIN_SPEED,
};
use crate::error::{QuantError, Result};
use std::path::{Path, PathBuf};

/// Where the per-invocation scratch file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScratchLocation {
    /// A fresh, uniquely named file per invocation, in `dir` or the system temp dir.
    Unique { dir: Option<PathBuf> },
    /// One fixed path reused by every invocation. Concurrent callers will clobber each other.
    Shared(PathBuf),
}

impl Default for ScratchLocation {
    fn default() -> Self {
        ScratchLocation::Unique { dir: None }
    }
}

/// Settings for one shrinker. Built once, then adjusted with the `with_*` methods.
#[derive(Debug, Clone)]
pub struct QuantConfig {
    pub tool: PathBuf,
    pub min_quality: u8,
    pub max_quality: u8,
    pub speed: Option<u8>,
    pub depth: u32,
    pub precision: u32,
    pub fallback_quality: u8,
    pub scratch: ScratchLocation,
}

impl QuantConfig {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            min_quality: DEFAULT_MIN_QUALITY,
            max_quality: DEFAULT_MAX_QUALITY,
            speed: None,
            depth: DEFAULT_DEPTH,
            precision: DEFAULT_PRECISION,
            fallback_quality: DEFAULT_FALLBACK_QUALITY,
            scratch: ScratchLocation::default(),
        }
    }

    pub fn with_quality(mut self, min: u8, max: u8) -> Self {
        self.min_quality = min;
        self.max_quality = max;
        self
    }

    pub fn with_speed(mut self, speed: u8) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_fallback_quality(mut self, quality: u8) -> Self {
        self.fallback_quality = quality;
        self
    }

    pub fn with_scratch(mut self, scratch: ScratchLocation) -> Self {
        self.scratch = scratch;
        self
    }

    /// Checks every numeric setting. The tool path is checked per call, not here.
    pub fn validate(&self) -> Result<()> {
        for quality in [self.min_quality, self.max_quality] {
            if quality > MAX_QUALITY {
                return Err(QuantError::InvalidQuality(quality));
            }
        }
        if self.min_quality > self.max_quality {
            return Err(QuantError::InvalidQualityRange(
                self.min_quality,
                self.max_quality,
            ));
        }
        if let Some(speed) = self.speed {
            if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
                return Err(QuantError::InvalidSpeed(speed));
            }
        }
        if self.depth == 0 {
            return Err(QuantError::InvalidDepth);
        }
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&self.precision) {
            return Err(QuantError::InvalidPrecision(self.precision));
        }
        if !(MIN_FALLBACK_QUALITY..=MAX_QUALITY).contains(&self.fallback_quality) {
            return Err(QuantError::InvalidQuality(self.fallback_quality));
        }
        Ok(())
    }

    /// Arguments handed to the external tool, in order. Input always comes from stdin.
    pub fn tool_args(&self) -> Vec<String> {
        let mut args = vec![format!(
            "--quality={}-{}",
            self.min_quality, self.max_quality
        )];
        if let Some(speed) = self.speed {
            args.push(format!("--speed={}", speed));
        }
        args.push("--force".to_string());
        args.push("-".to_string());
        args
    }

    /// Shell rendering of one invocation against `scratch`, for diagnostics only.
    pub fn command_line(&self, scratch: &Path) -> String {
        format!(
            "{} {} < {}",
            self.tool.display(),
            self.tool_args().join(" "),
            scratch.display()
        )
    }
}
