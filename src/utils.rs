//! Console helpers shared by the binary.

use crate::constants::{
    COMPRESSED_SIZE_PREFIX, COMPRESSION_RATIO_PREFIX, ORIGINAL_SIZE_PREFIX,
    PROGRESS_SPINNER_TEMPLATE,
};
use crate::observer::Stage;
use crate::shrink::ShrinkOutcome;
use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress spinner with consistent styling. Hidden in quiet mode.
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    if crate::logger::is_quiet() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb
}

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Human-readable size string (e.g., "1.2 MB", "512 B")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Ratio as a percentage string, e.g. `0.2534` -> `"25.34%"`.
pub fn format_ratio(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// One line describing how a shrink went.
pub fn describe_outcome(original_len: usize, outcome: &ShrinkOutcome) -> String {
    match outcome.stage {
        Some(stage) => format!(
            "{} -> {} ({} saved via {}, {} pass{})",
            format_file_size(original_len as u64),
            format_file_size(outcome.bytes.len() as u64),
            format_ratio(outcome.ratio),
            match stage {
                Stage::Quantizer => "pngquant",
                Stage::Fallback => "re-encode",
            },
            outcome.passes,
            if outcome.passes == 1 { "" } else { "es" }
        ),
        None => format!(
            "{} unchanged after {} pass{}",
            format_file_size(original_len as u64),
            outcome.passes,
            if outcome.passes == 1 { "" } else { "es" }
        ),
    }
}

/// Print a size summary for a whole run.
pub fn print_summary(original: u64, compressed: u64) {
    let saved = if original > 0 {
        (original - compressed.min(original)) as f64 / original as f64
    } else {
        0.0
    };

    crate::info!(
        "{} {} ({})",
        ORIGINAL_SIZE_PREFIX,
        original,
        format_file_size(original)
    );
    crate::info!(
        "{} {} ({})",
        COMPRESSED_SIZE_PREFIX,
        compressed,
        format_file_size(compressed)
    );
    crate::info!("{} {}", COMPRESSION_RATIO_PREFIX, format_ratio(saved));
}
