use std::path::PathBuf;

use clap::Args;
use itertools::Itertools;
use miette::Result;
use owo_colors::OwoColorize;

use crate::commands::{read_input, MAX_LAYERS};

#[derive(Args)]
pub struct IdentifyArgs {
    /// An input file
    file: PathBuf,
}

impl IdentifyArgs {
    pub fn handle(&self) -> Result<()> {
        let mut data = read_input(&self.file)?;
        let mut chain = Vec::new();

        while gear_yaz0::identify(&data) && chain.len() < MAX_LAYERS {
            data = gear_yaz0::decompress(&data)?;
            chain.push("Yaz0".to_string());
        }

        if gear_narc::identify(&data) {
            let narc = gear_narc::NarcArchive::read(&data)?;
            chain.push(format!("NARC ({} files, {:?})", narc.file_count(), narc.byte_order()));
        } else {
            chain.push(format!("{}", "unknown".yellow()));
        }

        println!("{}: {}", self.file.display(), chain.iter().join(" → "));
        Ok(())
    }
}
