use std::{
    fs::File,
    path::{Component, Path, PathBuf},
};

use encoding_rs::Encoding;
use gear_narc::{NarcArchive, NarcOptions};
use miette::{miette, Context, IntoDiagnostic, Result};
use tracing::debug;

pub mod identify;
pub mod narc;
pub mod yaz0;

/// Yaz0 layers peeled off an input before giving up on finding an archive
const MAX_LAYERS: usize = 4;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Detect the format of a file
    Identify(identify::IdentifyArgs),
    /// Handle NARC files
    Narc {
        #[command(subcommand)]
        command: narc::NarcCommands,
    },
    /// Handle Yaz0 compressed files
    Yaz0 {
        #[command(subcommand)]
        command: yaz0::Yaz0Commands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Identify(identify) => identify.handle(),
            Commands::Narc { command } => command.handle(),
            Commands::Yaz0 { command } => command.handle(),
        }
    }
}

pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .into_diagnostic()
        .context(format!("path: {}", path.display()))
}

pub fn create_output(path: &Path, overwrite: bool) -> Result<File> {
    if overwrite {
        File::create(path)
    } else {
        File::create_new(path)
    }
    .into_diagnostic()
    .context(format!("creating {}", path.display()))
}

pub fn parse_encoding(label: &str) -> std::result::Result<&'static Encoding, String> {
    let encoding = Encoding::for_label(label.as_bytes()).ok_or_else(|| format!("unknown encoding {label:?}"))?;
    NarcOptions::builder()
        .encoding(encoding)
        .build()
        .check()
        .map_err(|e| e.to_string())?;
    Ok(encoding)
}

/// Read an archive, decompressing Yaz0 layers around it first.
///
/// Returns the archive and the number of layers that were removed.
pub fn decode_narc(mut data: Vec<u8>, options: NarcOptions) -> Result<(NarcArchive, usize)> {
    for layers in 0..=MAX_LAYERS {
        match NarcArchive::read_with(&data, options) {
            Err(e) if e.is_format_mismatch() && gear_yaz0::identify(&data) && layers < MAX_LAYERS => {
                debug!(layer = layers + 1, "decompressing yaz0 layer");
                data = gear_yaz0::decompress(&data)?;
            }
            result => return Ok((result?, layers)),
        }
    }

    Err(miette!("more than {MAX_LAYERS} yaz0 layers"))
}

pub fn open_narc(path: &Path, options: NarcOptions) -> Result<(NarcArchive, usize)> {
    decode_narc(read_input(path)?, options).context(format!("path: {}", path.display()))
}

/// Join a slash separated archive path onto `base`, refusing any segment that
/// is not a plain name.
pub fn safe_join(base: &Path, path: &str) -> Result<PathBuf> {
    let mut target = base.to_path_buf();

    for segment in path.split('/') {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if name == segment => target.push(name),
            _ => return Err(miette!("refusing {path:?}: {segment:?} is not a plain name")),
        }
    }

    Ok(target)
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use gear_narc::{NarcArchive, NarcOptions};
    use pretty_assertions::assert_eq;

    use crate::commands::{decode_narc, parse_encoding, safe_join};

    #[test]
    fn joins_plain_names() -> miette::Result<()> {
        let joined = safe_join(Path::new("out"), "sub/b.bin")?;
        assert_eq!(joined, Path::new("out").join("sub").join("b.bin"));
        Ok(())
    }

    #[test]
    fn refuses_escaping_names() {
        for path in ["../x", "sub/../../x", "/etc/passwd", "a//b", "", "./x"] {
            assert!(safe_join(Path::new("out"), path).is_err(), "{path:?} should be refused");
        }
    }

    #[test]
    fn parses_name_encodings() {
        assert_eq!(parse_encoding("utf-8").map(|e| e.name()), Ok("UTF-8"));
        assert_eq!(parse_encoding("sjis").map(|e| e.name()), Ok("Shift_JIS"));

        assert!(parse_encoding("klingon").is_err());
        for label in ["utf-16le", "utf-16be", "iso-2022-kr"] {
            assert!(parse_encoding(label).is_err(), "{label} should be refused");
        }
    }

    #[test]
    fn peels_yaz0_layers() -> miette::Result<()> {
        let mut narc = NarcArchive::new();
        let root = narc.root();
        narc.tree.add_leaf(root, "a.bin", vec![0x01, 0x02, 0x03])?;

        let plain = narc.write()?;
        let once = gear_yaz0::compress(&plain, None)?;
        let twice = gear_yaz0::compress(&once, Some(9))?;

        let (read, layers) = decode_narc(plain, NarcOptions::default())?;
        assert_eq!((read.file_count(), layers), (1, 0));

        let (read, layers) = decode_narc(twice, NarcOptions::default())?;
        assert_eq!(layers, 2);
        assert_eq!(read.by_path("a.bin"), Some(&[0x01, 0x02, 0x03][..]));

        assert!(decode_narc(b"not an archive".to_vec(), NarcOptions::default()).is_err());

        Ok(())
    }
}
