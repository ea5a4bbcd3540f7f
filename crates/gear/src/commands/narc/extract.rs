use std::{io::Write, path::PathBuf};

use clap::Args;
use encoding_rs::Encoding;
use gear_narc::NarcOptions;
use miette::{Context, IntoDiagnostic, Result};
use tracing::info;

use crate::commands::{create_output, open_narc, parse_encoding, safe_join};

#[derive(Args)]
pub struct ExtractArgs {
    /// An input NARC file, optionally Yaz0 compressed
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// Text encoding of the names in the archive
    #[arg(short, long, default_value = "utf-8", value_parser = parse_encoding)]
    encoding: &'static Encoding,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let (narc, _) = open_narc(&self.file, NarcOptions::builder().encoding(self.encoding).build())?;

        std::fs::create_dir_all(&self.directory)
            .into_diagnostic()
            .context(format!("creating {}", self.directory.display()))?;

        for id in narc.tree.descendants(narc.root()) {
            let Some(name) = narc.tree.path_of(id) else {
                continue;
            };
            let p = safe_join(&self.directory, &name)?;

            match narc.tree[id].contents() {
                None => {
                    std::fs::create_dir_all(&p)
                        .into_diagnostic()
                        .context(format!("creating {}", p.display()))?;
                }
                Some(contents) => {
                    info!("writing {}", p.display());
                    create_output(&p, self.overwrite)?
                        .write_all(contents)
                        .into_diagnostic()
                        .context(format!("writing {}", p.display()))?;
                }
            }
        }

        Ok(())
    }
}
