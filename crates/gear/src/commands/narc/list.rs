use std::path::PathBuf;

use clap::Args;
use encoding_rs::Encoding;
use gear_narc::NarcOptions;
use miette::Result;
use tracing::info;

use crate::commands::{open_narc, parse_encoding};

#[derive(Args)]
pub struct ListArgs {
    /// An input NARC file, optionally Yaz0 compressed
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Text encoding of the names in the archive
    #[arg(short, long, default_value = "utf-8", value_parser = parse_encoding)]
    encoding: &'static Encoding,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let (narc, layers) = open_narc(&self.file, NarcOptions::builder().encoding(self.encoding).build())?;
        info!(
            layers,
            files = narc.file_count(),
            byte_order = ?narc.byte_order(),
            "version {:#06X}",
            narc.header.version
        );

        for id in narc.tree.descendants(narc.root()) {
            let Some(path) = narc.tree.path_of(id) else {
                continue;
            };

            match narc.tree[id].contents() {
                Some(contents) => println!("{path} ({} bytes)", contents.len()),
                None => println!("{path}/"),
            }
        }

        Ok(())
    }
}
