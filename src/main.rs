mod app;
mod input;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use randomtree::{ColorModel, Shape};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "randomtree")]
#[command(about = "Random formula-tree art, previewed in the terminal")]
pub(crate) struct Cli {
    /// canvas width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// canvas height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// write the finished image to this PNG file
    #[arg(long)]
    save: Option<PathBuf>,

    /// render once without the terminal UI
    #[arg(long)]
    headless: bool,

    #[command(subcommand)]
    generator: Option<GeneratorCmd>,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum GeneratorCmd {
    /// random formula tree (default)
    Tree {
        /// maximum tree depth
        #[arg(long)]
        generations: Option<u32>,

        /// 0..=2147483647; omit for a fresh seed every run
        #[arg(long)]
        seed: Option<u64>,

        /// RGB, Monochrome, "Monochrome Noise", "RGB White Noise" or "Preview All"
        #[arg(long)]
        color_model: Option<ColorModel>,
    },
    /// a single flat test shape
    Shapes {
        /// Circle, Ellipse, Rectangle or RoundRectangle
        #[arg(long)]
        shape: Option<Shape>,
    },
}

fn main() -> Result<()> {
    // stderr shares the terminal with the preview, so stay quiet by default
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    app::run(Cli::parse())
}
