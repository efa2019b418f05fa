use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "quant-squeeze",
    about = "Shrink PNG images with pngquant, falling back to an optimizing re-encode",
    long_about = "quant-squeeze runs pngquant over an image repeatedly until a pass stops making it smaller. \
                  When pngquant cannot shrink an image at all, the image is re-encoded in-process with the \
                  codec's optimizations turned on. Files are recognised as images by content, not extension.",
    version,
    group(ArgGroup::new("input").required(true).args(["dir", "image"])),
    after_help = "EXAMPLES:\n  \
    quant-squeeze -f /usr/local/bin/pngquant -d ./assets\n  \
    quant-squeeze -d ./assets -o ./assets-min\n  \
    quant-squeeze -i logo.png -o ./out -v"
)]
pub struct Args {
    #[arg(
        short = 'f',
        long,
        value_name = "PATH",
        help = "Path to the pngquant executable",
        long_help = "Path to the pngquant executable. When omitted, pngquant is looked up on PATH."
    )]
    pub tool: Option<PathBuf>,

    #[arg(
        short = 'd',
        long,
        value_name = "DIR",
        help = "Shrink every image under this directory"
    )]
    pub dir: Option<PathBuf>,

    #[arg(short = 'i', long, value_name = "FILE", help = "Shrink a single image")]
    pub image: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "DIR",
        help = "Write results here instead of overwriting the originals",
        long_help = "Output directory. Directory runs mirror the source tree under it; a single image is \
                     written under its own file name. Without this flag, improved images replace the originals."
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        value_name = "N",
        help = "Maximum passes per stage (default: 100)"
    )]
    pub depth: Option<u32>,

    #[arg(short = 'q', long, help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, help = "Print every pass")]
    pub verbose: bool,
}
