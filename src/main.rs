use anyhow::{Context, Result};
use clap::Parser;
use quant_squeeze::cli::Args;
use quant_squeeze::constants::DEFAULT_TOOL_NAME;
use quant_squeeze::logger::{self, Verbosity};
use quant_squeeze::utils::{create_progress_spinner, describe_outcome, print_summary};
use quant_squeeze::{
    error, info, success, verbose, warn, DirOptions, QuantConfig, ShrinkOptions, Shrinker, WalkReport,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    let args = Args::parse();
    logger::set_verbosity(Verbosity::from_flags(args.quiet, args.verbose));

    let tool = resolve_tool(args.tool.as_deref())?;
    let shrinker = Shrinker::new(QuantConfig::new(tool)).context("Invalid configuration")?;
    shrinker.ensure_available()?;
    verbose!(
        "Quantizer: {}",
        shrinker.config().command_line(Path::new("<scratch>"))
    );

    let options = ShrinkOptions {
        depth: args.depth,
        ..Default::default()
    };

    if let Some(dir) = &args.dir {
        shrink_directory(&shrinker, dir, args.output, options)?;
    } else if let Some(image) = &args.image {
        shrink_image(&shrinker, image, args.output.as_deref(), &options)?;
    }

    Ok(())
}

fn resolve_tool(tool: Option<&Path>) -> Result<PathBuf> {
    match tool {
        Some(tool) => Ok(tool.to_path_buf()),
        None => which::which(DEFAULT_TOOL_NAME)
            .with_context(|| format!("{} not found on PATH; pass --tool", DEFAULT_TOOL_NAME)),
    }
}

fn shrink_directory(
    shrinker: &Shrinker,
    dir: &Path,
    output: Option<PathBuf>,
    options: ShrinkOptions,
) -> Result<()> {
    info!("🚀 Shrinking images under {:?}", dir);
    if let Some(output) = &output {
        info!("📁 Output: {:?}", output);
    }

    let start_time = Instant::now();
    let dir_options = DirOptions {
        overwrite: output.is_none(),
        destination: output,
        shrink: options,
    };

    let spinner = create_progress_spinner("Shrinking images...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let mut report = WalkReport::default();
    for item in shrinker.shrink_dir(dir, &dir_options)? {
        match item {
            Ok(result) => {
                spinner.suspend(|| {
                    info!(
                        "🗜️  {}: {}",
                        result.source.display(),
                        describe_outcome(result.original_len, &result.outcome)
                    )
                });
                report.results.push(result);
            }
            Err(e) => {
                spinner.suspend(|| error!("{}", e));
                report.failures.push(e);
            }
        }
    }
    spinner.finish_and_clear();

    info!("\n📊 Summary:");
    info!("  📁 Images processed: {}", report.results.len());
    print_summary(report.original_bytes(), report.final_bytes());
    info!("⏱️  Total time: {:.2?}", start_time.elapsed());
    if !report.failures.is_empty() {
        warn!("Failed files: {}", report.failures.len());
    }

    Ok(())
}

fn shrink_image(
    shrinker: &Shrinker,
    image: &Path,
    output: Option<&Path>,
    options: &ShrinkOptions,
) -> Result<()> {
    info!("🗜️  Shrinking image: {:?}", image);

    let destination = match output {
        Some(dir) => {
            let name = image
                .file_name()
                .with_context(|| format!("{:?} has no file name", image))?;
            Some(dir.join(name))
        }
        None => None,
    };

    let original_len = std::fs::metadata(image)
        .with_context(|| format!("Cannot read {:?}", image))?
        .len();
    let outcome = shrinker.shrink_file(image, destination.as_deref(), output.is_none(), options)?;

    if outcome.improved() {
        success!("{}", describe_outcome(original_len as usize, &outcome));
    } else {
        info!("{}", describe_outcome(original_len as usize, &outcome));
    }
    print_summary(original_len, outcome.bytes.len() as u64);
    Ok(())
}
