use std::{io::Write, path::PathBuf};

use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use tracing::info;

use crate::commands::{create_output, read_input};

#[derive(clap::Subcommand)]
pub enum Yaz0Commands {
    /// Compress a file with Yaz0
    Compress(CompressArgs),
    /// Decompress a Yaz0 file
    Decompress(DecompressArgs),
}

impl Yaz0Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Yaz0Commands::Compress(compress) => compress.handle(),
            Yaz0Commands::Decompress(decompress) => decompress.handle(),
        }
    }
}

#[derive(Args)]
pub struct CompressArgs {
    /// An input file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// A target file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// Compression level, 0 stores everything as literals
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=9))]
    level: Option<u8>,
}

impl CompressArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_input(&self.input)?;
        let compressed = gear_yaz0::compress(&data, self.level)
            .context(format!("compressing {}", self.input.display()))?;
        info!(
            "compressed {} bytes to {} bytes",
            data.len(),
            compressed.len()
        );

        create_output(&self.output, self.overwrite)?
            .write_all(&compressed)
            .into_diagnostic()
            .context(format!("writing {}", self.output.display()))
    }
}

#[derive(Args)]
pub struct DecompressArgs {
    /// An input Yaz0 file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// A target file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl DecompressArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_input(&self.input)?;
        let decompressed = gear_yaz0::decompress(&data)
            .context(format!("decompressing {}", self.input.display()))?;
        info!("decompressed {} bytes", decompressed.len());

        create_output(&self.output, self.overwrite)?
            .write_all(&decompressed)
            .into_diagnostic()
            .context(format!("writing {}", self.output.display()))
    }
}
