use std::{io::Write, path::PathBuf};

use clap::Args;
use encoding_rs::Encoding;
use gear_narc::{ByteOrder, NarcArchive, NarcOptions};
use gear_tree::NodeKind;
use miette::{miette, Context, IntoDiagnostic, Result};
use tracing::info;
use walkdir::WalkDir;

use crate::commands::{create_output, parse_encoding};

#[derive(Args)]
pub struct PackArgs {
    /// An input directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// A target NARC file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// Write a big-endian archive
    #[arg(long, default_value_t = false)]
    big_endian: bool,

    /// Compress the archive with Yaz0
    #[arg(long, default_value_t = false)]
    yaz0: bool,

    /// Yaz0 compression level, implies --yaz0
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=9))]
    level: Option<u8>,

    /// Text encoding of the names in the archive
    #[arg(short, long, default_value = "utf-8", value_parser = parse_encoding)]
    encoding: &'static Encoding,
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        info!("creating {}", &self.file.display());

        let mut narc = NarcArchive::new();
        if self.big_endian {
            narc.header.byte_order = ByteOrder::BigEndian;
        }
        let root = narc.root();

        // Sorted so parents come before their contents and the layout is reproducible
        let entries = WalkDir::new(&self.directory)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok());

        for entry in entries {
            let name = entry
                .path()
                .strip_prefix(&self.directory)
                .into_diagnostic()?;
            let name = name
                .to_str()
                .ok_or(miette!("unable to convert {} to a string", name.display()))?
                .replace(std::path::MAIN_SEPARATOR, "/");

            let (parent, leaf_name) = match name.rsplit_once('/') {
                Some((parent, leaf_name)) => (
                    narc.tree
                        .find_child_by_path(root, parent, NodeKind::Branch)
                        .ok_or(miette!("missing directory {parent}"))?,
                    leaf_name,
                ),
                None => (root, name.as_str()),
            };

            if entry.file_type().is_dir() {
                narc.tree.add_branch(parent, leaf_name)?;
            } else {
                info!("packing {}", name);
                let contents = std::fs::read(entry.path())
                    .into_diagnostic()
                    .context(format!("opening {}", entry.path().display()))?;
                narc.tree.add_leaf(parent, leaf_name, contents)?;
            }
        }

        let mut data = narc
            .write_with(NarcOptions::builder().encoding(self.encoding).build())
            .context("writing narc archive")?;
        if self.yaz0 || self.level.is_some() {
            data = gear_yaz0::compress(&data, self.level).context("compressing narc archive")?;
        }

        create_output(&self.file, self.overwrite)?
            .write_all(&data)
            .into_diagnostic()
            .context(format!("writing {}", self.file.display()))?;

        Ok(())
    }
}
