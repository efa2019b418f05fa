use crate::compressor::{CodecOptimizer, Compressor, Pngquant};
use crate::config::QuantConfig;
use crate::constants::MAX_PRECISION;
use crate::error::{QuantError, Result};
use crate::observer::{LogObserver, ShrinkObserver, Stage};
use crate::scratch::ScratchFile;
use std::fs;
use std::path::{Path, PathBuf};

/// Per-call overrides. `None` (or zero) means "use the config value".
#[derive(Debug, Clone, Default)]
pub struct ShrinkOptions {
    pub depth: Option<u32>,
    pub precision: Option<u32>,
    pub keep_scratch: bool,
}

/// What one shrink produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ShrinkOutcome {
    /// Fraction of the input size saved, rounded. Zero means `bytes` is the input.
    pub ratio: f64,
    pub bytes: Vec<u8>,
    /// The stage that produced `bytes`, or `None` when nothing was gained.
    pub stage: Option<Stage>,
    /// Compressor invocations across both stages.
    pub passes: u32,
    /// Scratch file left on disk at the caller's request.
    pub kept_scratch: Option<PathBuf>,
}

impl ShrinkOutcome {
    pub fn improved(&self) -> bool {
        self.stage.is_some()
    }
}

struct StageRun {
    best: Option<Vec<u8>>,
    passes: u32,
}

/// Drives the quantizer, then the fallback codec, over one image at a time.
pub struct Shrinker {
    config: QuantConfig,
    primary: Box<dyn Compressor>,
    fallback: Box<dyn Compressor>,
    observer: Box<dyn ShrinkObserver>,
}

impl Shrinker {
    /// Builds a shrinker around the configured pngquant binary.
    ///
    /// The binary itself is only looked up when work starts, so a shrinker
    /// can be built before the tool is installed.
    pub fn new(config: QuantConfig) -> Result<Self> {
        config.validate()?;
        let primary = Pngquant::from_config(&config);
        let fallback = CodecOptimizer::new(config.fallback_quality);
        Ok(Self {
            config,
            primary: Box::new(primary),
            fallback: Box::new(fallback),
            observer: Box::new(LogObserver),
        })
    }

    pub fn with_primary(mut self, primary: impl Compressor + 'static) -> Self {
        self.primary = Box::new(primary);
        self
    }

    pub fn with_fallback(mut self, fallback: impl Compressor + 'static) -> Self {
        self.fallback = Box::new(fallback);
        self
    }

    pub fn with_observer(mut self, observer: impl ShrinkObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn config(&self) -> &QuantConfig {
        &self.config
    }

    /// Fails with `ToolNotFound` when the quantizer cannot be run.
    pub fn ensure_available(&self) -> Result<()> {
        self.primary.ensure_available()
    }

    /// Shrinks `data`, writing the result to `destination` only if it got smaller.
    ///
    /// # Arguments
    /// * `data` - Encoded image bytes
    /// * `destination` - Where to persist an improved result
    /// * `options` - Per-call depth, precision and scratch retention
    ///
    /// # Returns
    /// * `Ok(outcome)` - `outcome.bytes` is never longer than `data`, and equals it when `ratio == 0`
    /// * `Err(QuantError::ToolNotFound)` - Quantizer missing, checked before `data` is looked at
    /// * `Err(QuantError::EmptyInput)` - `data` is empty; no scratch file is created
    pub fn shrink(
        &self,
        data: &[u8],
        destination: Option<&Path>,
        options: &ShrinkOptions,
    ) -> Result<ShrinkOutcome> {
        self.primary.ensure_available()?;
        if data.is_empty() {
            return Err(QuantError::EmptyInput);
        }

        let depth = options
            .depth
            .filter(|&d| d > 0)
            .unwrap_or(self.config.depth);
        let precision = options
            .precision
            .filter(|&p| p > 0)
            .unwrap_or(self.config.precision)
            .min(MAX_PRECISION);

        let scratch = ScratchFile::create(&self.config.scratch, options.keep_scratch, data)?;
        crate::verbose!("Scratch file: {:?}", scratch.path());

        let quantized = self.run_stage(Stage::Quantizer, self.primary.as_ref(), data, &scratch, depth)?;
        let mut passes = quantized.passes;
        let (stage, best) = match quantized.best {
            Some(bytes) => (Some(Stage::Quantizer), Some(bytes)),
            None => {
                // Scratch still holds `data`: it is only rewritten on improvement.
                let reencoded =
                    self.run_stage(Stage::Fallback, self.fallback.as_ref(), data, &scratch, depth)?;
                passes += reencoded.passes;
                (reencoded.best.as_ref().map(|_| Stage::Fallback), reencoded.best)
            }
        };

        let outcome = match best {
            Some(bytes) => {
                if let Some(destination) = destination {
                    write_destination(destination, &bytes)?;
                }
                ShrinkOutcome {
                    ratio: compression_ratio(data.len(), bytes.len(), precision),
                    bytes,
                    stage,
                    passes,
                    kept_scratch: None,
                }
            }
            None => ShrinkOutcome {
                ratio: 0.0,
                bytes: data.to_vec(),
                stage: None,
                passes,
                kept_scratch: None,
            },
        };

        Ok(ShrinkOutcome {
            kept_scratch: scratch.finish(),
            ..outcome
        })
    }

    /// Reads an image from disk and shrinks it.
    ///
    /// When `destination` is `None` and `overwrite` is set, an improved result
    /// replaces the source file.
    pub fn shrink_file(
        &self,
        image: &Path,
        destination: Option<&Path>,
        overwrite: bool,
        options: &ShrinkOptions,
    ) -> Result<ShrinkOutcome> {
        self.primary.ensure_available()?;
        if !image.is_file() {
            return Err(QuantError::FileNotFound(image.to_path_buf()));
        }

        let data = fs::read(image)?;
        let destination = destination.or(if overwrite { Some(image) } else { None });
        self.shrink(&data, destination, options)
    }

    /// Runs one compressor until a pass stops shrinking or `depth` passes are spent.
    ///
    /// Each pass feeds on the previous pass's output. A failed pass counts as
    /// "no change", which ends the stage.
    fn run_stage(
        &self,
        stage: Stage,
        compressor: &dyn Compressor,
        original: &[u8],
        scratch: &ScratchFile,
        depth: u32,
    ) -> Result<StageRun> {
        let mut best: Option<Vec<u8>> = None;
        let mut passes = 0;
        let mut failures = 0;

        while passes < depth {
            passes += 1;
            let input = best.as_deref().unwrap_or(original);

            let candidate = match compressor.compress(input, scratch.path()) {
                Ok(bytes) if bytes.is_empty() => Err(QuantError::EmptyOutput),
                other => other,
            };
            let candidate = match candidate {
                Ok(bytes) => bytes,
                Err(e) => {
                    failures += 1;
                    self.observer.pass_failed(stage, passes, &e);
                    self.observer.pass_finished(stage, passes, input.len());
                    break;
                }
            };

            self.observer.pass_finished(stage, passes, candidate.len());
            if candidate.len() >= input.len() {
                break;
            }
            scratch.write(&candidate)?;
            best = Some(candidate);
        }

        self.observer.stage_finished(stage, passes, failures);
        Ok(StageRun { best, passes })
    }
}

/// Fraction of `original_len` saved, rounded to `precision` decimal digits.
///
/// Any real saving maps into `[10^-precision, 1 - 10^-precision]`, so the
/// ratio is zero exactly when nothing was saved and never reaches one.
pub fn compression_ratio(original_len: usize, final_len: usize, precision: u32) -> f64 {
    if original_len == 0 || final_len >= original_len {
        return 0.0;
    }
    let scale = 10f64.powi(precision.min(MAX_PRECISION) as i32);
    let raw = (original_len - final_len) as f64 / original_len as f64;
    let steps = (raw * scale).round().clamp(1.0, scale - 1.0);
    steps / scale
}

fn write_destination(destination: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|_| QuantError::DirectoryCreationFailed(parent.to_path_buf()))?;
    }
    fs::write(destination, bytes)?;
    Ok(())
}
