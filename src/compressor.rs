use crate::config::QuantConfig;
use crate::constants::OXIPNG_PRESET;
use crate::error::{QuantError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageFormat};
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// One way of turning image bytes into (hopefully) fewer image bytes.
///
/// The shrinker keeps `scratch` holding exactly `input` before every call,
/// so implementations may read from either.
pub trait Compressor: Send + Sync {
    fn name(&self) -> &str;

    /// Fails when the compressor cannot run at all, before any input is read.
    fn ensure_available(&self) -> Result<()> {
        Ok(())
    }

    fn compress(&self, input: &[u8], scratch: &Path) -> Result<Vec<u8>>;
}

/// The external quantizer, fed from the scratch file on stdin.
#[derive(Debug, Clone)]
pub struct Pngquant {
    tool: PathBuf,
    args: Vec<String>,
}

impl Pngquant {
    pub fn from_config(config: &QuantConfig) -> Self {
        Self {
            tool: config.tool.clone(),
            args: config.tool_args(),
        }
    }

    pub fn tool(&self) -> &Path {
        &self.tool
    }
}

impl Compressor for Pngquant {
    fn name(&self) -> &str {
        "pngquant"
    }

    fn ensure_available(&self) -> Result<()> {
        if !self.tool.exists() {
            return Err(QuantError::ToolNotFound(self.tool.clone()));
        }
        Ok(())
    }

    fn compress(&self, _input: &[u8], scratch: &Path) -> Result<Vec<u8>> {
        let stdin = File::open(scratch)?;
        let output = Command::new(&self.tool)
            .args(&self.args)
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()?;

        if !output.status.success() {
            return Err(QuantError::ToolFailed {
                tool: self.tool.clone(),
                code: output.status.code(),
            });
        }

        Ok(output.stdout)
    }
}

/// In-process re-encode with the codec's size optimizations turned on.
///
/// PNG goes through oxipng, JPEG is re-encoded at `quality`, and any other
/// format the image crate can both read and write is re-encoded as-is.
#[derive(Debug, Clone, Copy)]
pub struct CodecOptimizer {
    quality: u8,
}

impl CodecOptimizer {
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }
}

impl Compressor for CodecOptimizer {
    fn name(&self) -> &str {
        "re-encode"
    }

    fn compress(&self, input: &[u8], _scratch: &Path) -> Result<Vec<u8>> {
        match image::guess_format(input)? {
            ImageFormat::Png => optimize_png(input),
            ImageFormat::Jpeg => reencode_jpeg(input, self.quality),
            other => reencode(input, other),
        }
    }
}

fn optimize_png(data: &[u8]) -> Result<Vec<u8>> {
    let options = oxipng::Options::from_preset(OXIPNG_PRESET);
    oxipng::optimize_from_memory(data, &options)
        .map_err(|e| QuantError::PngOptimization(e.to_string()))
}

fn reencode_jpeg(data: &[u8], quality: u8) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(data, ImageFormat::Jpeg)?;
    // JPEG has no alpha; keep grayscale sources single-channel.
    let img = match img.color() {
        ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16 => {
            DynamicImage::ImageLuma8(img.to_luma8())
        }
        _ => DynamicImage::ImageRgb8(img.to_rgb8()),
    };

    let mut out = Vec::new();
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality))?;
    Ok(out)
}

fn reencode(data: &[u8], format: ImageFormat) -> Result<Vec<u8>> {
    if !format.writing_enabled() {
        return Err(QuantError::UnsupportedFormat(format!("{:?}", format)));
    }
    let img = image::load_from_memory_with_format(data, format)?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format)?;
    Ok(out.into_inner())
}
