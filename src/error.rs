use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuantError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("Compressor not found: {0}")]
    ToolNotFound(PathBuf),

    #[error("Image data is empty")]
    EmptyInput,

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("{tool} exited with {}", .code.map_or_else(|| "a signal".to_string(), |c| format!("status {}", c)))]
    ToolFailed { tool: PathBuf, code: Option<i32> },

    #[error("Compressor produced no output")]
    EmptyOutput,

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid quality value: {0}. Must be between 0 and 100")]
    InvalidQuality(u8),

    #[error("Invalid quality range: {0}-{1}. Minimum must not exceed maximum")]
    InvalidQualityRange(u8, u8),

    #[error("Invalid speed value: {0}. Must be between 1 and 11")]
    InvalidSpeed(u8),

    #[error("Invalid depth: must allow at least one pass")]
    InvalidDepth,

    #[error("Invalid precision: {0}. Must be between 1 and 10 digits")]
    InvalidPrecision(u32),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("Walkdir error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("{path}: {source}")]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<QuantError>,
    },
}

impl QuantError {
    /// Attach the file being processed to an error raised while walking a tree.
    pub fn in_file(path: impl Into<PathBuf>, source: QuantError) -> Self {
        QuantError::InFile {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, QuantError>;
