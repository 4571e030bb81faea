//! `printcanvas` command-line entry point.

use clap::Parser;
use printcanvas_cli::cli::{Cli, Command};
use printcanvas_cli::commands::{run_check, run_render, run_svg};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render(args) => {
            let raster = run_render(&args)?;
            println!(
                "Wrote {} ({}x{})",
                args.output.display(),
                raster.width,
                raster.height
            );
        }
        Command::Svg(args) => {
            run_svg(&args)?;
            println!("Wrote {}", args.output.display());
        }
        Command::Check(args) => {
            let report = run_check(&args)?;
            println!("{} objects loaded, {} skipped", report.loaded, report.skipped);
        }
    }
    Ok(())
}
