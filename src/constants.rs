pub const DEFAULT_TOOL_NAME: &str = "pngquant";

pub const DEFAULT_MIN_QUALITY: u8 = 65;
pub const DEFAULT_MAX_QUALITY: u8 = 80;
pub const MAX_QUALITY: u8 = 100;

pub const MIN_SPEED: u8 = 1;
pub const MAX_SPEED: u8 = 11;

/// Upper bound on passes per stage when the caller gives none.
pub const DEFAULT_DEPTH: u32 = 100;

pub const DEFAULT_PRECISION: u32 = 4;
pub const MIN_PRECISION: u32 = 1;
pub const MAX_PRECISION: u32 = 10;

pub const DEFAULT_FALLBACK_QUALITY: u8 = 75;
pub const MIN_FALLBACK_QUALITY: u8 = 1;

pub const OXIPNG_PRESET: u8 = 2;

pub const SCRATCH_PREFIX: &str = "quant-";
pub const SCRATCH_SUFFIX: &str = ".tmp.png";

/// Enough header bytes for every signature `image::guess_format` knows.
pub const SNIFF_LEN: u64 = 64;

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";

// Common output message prefixes
pub const ORIGINAL_SIZE_PREFIX: &str = "📊 Original size:";
pub const COMPRESSED_SIZE_PREFIX: &str = "📈 Compressed size:";
pub const COMPRESSION_RATIO_PREFIX: &str = "🎯 Compression ratio:";
