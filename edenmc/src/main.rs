use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use edenmc_anvil::ZlibCompressor;
use edenmc_eden::EdenWorld;

mod convert;

use convert::{ConvertOptions, convert};

#[derive(Parser)]
#[command(name = "edenmc", about = "Convert an Eden world into Minecraft (1.12 Anvil) region files")]
pub struct Args {
    /// Eden world file
    pub input: PathBuf,

    /// Output world directory; region files go to <OUTPUT>/region
    #[arg(default_value = "ConvertedWorld")]
    pub output: PathBuf,

    /// Keep source chunk coordinates instead of centering on the player
    #[arg(long, env = "EDENMC_NO_RECENTER")]
    pub no_recenter: bool,

    /// zlib level, 0 (none) to 9 (best)
    #[arg(long, env = "EDENMC_COMPRESSION", default_value_t = 1,
          value_parser = clap::value_parser!(u32).range(0..=9))]
    pub compression_level: u32,

    /// Decode every chunk before writing it
    #[arg(long, env = "EDENMC_VERIFY")]
    pub verify: bool,

    /// Also write the final report to this file
    #[arg(long, env = "EDENMC_REPORT_FILE")]
    pub report_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    println!("Reading Eden world {:?}", args.input);
    let mut world = EdenWorld::open(&args.input)
        .with_context(|| format!("cannot load world {}", args.input.display()))?;

    let header = world.header();
    println!(
        "World '{}': {} columns, player at ({:.2}, {:.2}, {:.2})",
        header.name,
        world.directory().len(),
        header.pos.x,
        header.pos.y,
        header.pos.z
    );

    let options = ConvertOptions {
        recenter: !args.no_recenter,
        verify: args.verify,
    };
    let compressor = ZlibCompressor::new(args.compression_level);

    println!("Writing Minecraft world to {:?}", args.output);
    let stats = match convert(&mut world, &args.output, &compressor, options) {
        Ok(stats) => stats,
        Err(e) => {
            log::error!("Conversion aborted: {:#}", e);
            return Err(e);
        }
    };

    let report = stats.generate_report();
    println!("{}", report);

    if let Some(path) = &args.report_file {
        std::fs::write(path, &report)
            .with_context(|| format!("cannot write report to {}", path.display()))?;
        println!("Report saved to {:?}", path);
    }

    println!("Conversion complete: {} chunks exported", stats.chunks_exported);
    Ok(())
}
