use std::{fmt::Display, path::PathBuf};

use clap::Args;
use encoding_rs::Encoding;
use gear_narc::{NarcArchive, NarcOptions};
use itertools::{EitherOrBoth, Itertools};
use miette::Result;
use owo_colors::OwoColorize;

use crate::commands::{open_narc, parse_encoding};

#[derive(Debug, Eq, PartialEq)]
enum Change {
    Added(String),
    Removed(String),
    Comparison(String, String, String),
    Modified(String, usize, usize),
}

impl Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::Added(path) => writeln!(f, "✅ {}", path.green()),
            Change::Removed(path) => writeln!(f, "❌ {}", path.red()),
            Change::Comparison(key, old, new) => {
                writeln!(f, "* {}: {} vs {}", key, old.red(), new.green())
            }
            Change::Modified(path, old, new) => {
                writeln!(f, "🔃 {} ({} vs {} bytes)", path.blue(), old.red(), new.green())
            }
        }
    }
}

/// Changes needed to turn `left` into `right`, header fields first, then files by path
fn compare(left: &NarcArchive, right: &NarcArchive) -> Vec<Change> {
    let mut changes = Vec::new();

    if left.byte_order() != right.byte_order() {
        changes.push(Change::Comparison(
            "byte order".into(),
            format!("{:?}", left.byte_order()),
            format!("{:?}", right.byte_order()),
        ));
    }
    if left.header.version != right.header.version {
        changes.push(Change::Comparison(
            "version".into(),
            format!("{:#06X}", left.header.version),
            format!("{:#06X}", right.header.version),
        ));
    }

    let files = sorted_files(left)
        .into_iter()
        .merge_join_by(sorted_files(right), |a, b| a.0.cmp(&b.0))
        .filter_map(|pair| match pair {
            EitherOrBoth::Left((path, _)) => Some(Change::Removed(path)),
            EitherOrBoth::Right((path, _)) => Some(Change::Added(path)),
            EitherOrBoth::Both((path, old), (_, new)) if old != new => {
                Some(Change::Modified(path, old.len(), new.len()))
            }
            EitherOrBoth::Both(..) => None,
        });
    changes.extend(files);

    changes
}

fn sorted_files(narc: &NarcArchive) -> Vec<(String, &[u8])> {
    narc.files()
        .map(|(path, id)| (path, narc.tree[id].contents().map(Vec::as_slice).unwrap_or_default()))
        .sorted_by(|a, b| a.0.cmp(&b.0))
        .collect()
}

#[derive(Args)]
pub struct DiffArgs {
    /// An input NARC file
    #[arg(short, long, value_name = "FILE")]
    left: PathBuf,

    /// An input NARC file
    #[arg(short, long, value_name = "FILE")]
    right: PathBuf,

    /// Text encoding of the names in both archives
    #[arg(short, long, default_value = "utf-8", value_parser = parse_encoding)]
    encoding: &'static Encoding,
}

impl DiffArgs {
    pub fn handle(&self) -> Result<()> {
        let options = NarcOptions::builder().encoding(self.encoding).build();
        let (left, _) = open_narc(&self.left, options)?;
        let (right, _) = open_narc(&self.right, options)?;

        let changes = compare(&left, &right);
        if !changes.is_empty() {
            println!("🔃 {}", self.left.display().blue());
            print!("{}", changes.iter().join(""));
        }

        Ok(())
    }
}
