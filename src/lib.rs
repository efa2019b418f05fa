pub mod logger;

pub mod cli;
pub mod compressor;
pub mod config;
pub mod constants;
pub mod error;
pub mod observer;
pub mod scratch;
pub mod shrink;
pub mod utils;
pub mod walk;

pub use compressor::{CodecOptimizer, Compressor, Pngquant};
pub use config::{QuantConfig, ScratchLocation};
pub use error::{QuantError, Result};
pub use observer::{LogObserver, ShrinkObserver, SilentObserver, Stage};
pub use scratch::ScratchFile;
pub use shrink::{compression_ratio, ShrinkOptions, ShrinkOutcome, Shrinker};
pub use walk::{mirror_path, sniff_image, DirOptions, DirShrink, FileOutcome, WalkReport};
