pub mod diff;
pub mod extract;
pub mod list;
pub mod pack;

#[derive(clap::Subcommand)]
pub enum NarcCommands {
    /// Compare two NARC files
    Diff(diff::DiffArgs),
    /// Extract a NARC file into a directory
    Extract(extract::ExtractArgs),
    /// List the contents of a NARC file
    List(list::ListArgs),
    /// Pack a directory into a NARC file
    Pack(pack::PackArgs),
}

impl NarcCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            NarcCommands::Diff(diff) => diff.handle(),
            NarcCommands::Extract(extract) => extract.handle(),
            NarcCommands::List(list) => list.handle(),
            NarcCommands::Pack(pack) => pack.handle(),
        }
    }
}
