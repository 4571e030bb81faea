//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "printcanvas")]
#[command(about = "Render and check PrintCanvas design documents")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rasterize a design document to PNG.
    Render(RenderArgs),
    /// Export a design document as SVG.
    Svg(SvgArgs),
    /// Load a design document and report what imports.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Design document (JSON).
    #[arg(value_name = "DOC")]
    pub document: PathBuf,

    /// Output PNG path.
    #[arg(short, long, value_name = "PNG")]
    pub output: PathBuf,

    /// Resolution multiplier, in (0, 8].
    #[arg(long, env = "PRINTCANVAS_SCALE", default_value_t = 1.0)]
    pub scale: f64,

    /// Brand label to draw bottom-right.
    #[arg(long, value_name = "LABEL")]
    pub overlay: Option<String>,
}

#[derive(Debug, Args)]
pub struct SvgArgs {
    #[arg(value_name = "DOC")]
    pub document: PathBuf,

    /// Output SVG path.
    #[arg(short, long, value_name = "SVG")]
    pub output: PathBuf,

    #[arg(long, value_name = "LABEL")]
    pub overlay: Option<String>,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[arg(value_name = "DOC")]
    pub document: PathBuf,
}
