//! Lists orphaned compressed files (`.gz` files whose static file is missing)
//! without removing them. For help run this command with `-h`.

#![warn(missing_docs)]

use anyhow::{Error, ensure};
use clap::Parser;
use gzip_static::{
    directory::{SearchOptions, search_orphans},
    extensions::ExtensionSet,
};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Arguments {
    /// The directory containing the static site.
    directory: PathBuf,

    /// A file with extensions to consider. Use one line per extension,
    /// including the leading dot. If not set, uses built-in list.
    #[arg(short, long)]
    extensions_file: Option<PathBuf>,

    /// Follow symbolic links while traversing the directory.
    #[arg(long)]
    follow_links: bool,

    /// Print debug information to stderr.
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<(), Error> {
    let arguments = Arguments::parse();

    SimpleLogger::new()
        .with_level(if arguments.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .init()?;

    ensure!(
        arguments.directory.is_dir(),
        "{} is not a directory",
        arguments.directory.display()
    );

    let extensions = match &arguments.extensions_file {
        Some(extensions_file) => ExtensionSet::read_from_path(extensions_file)?,
        None => ExtensionSet::default(),
    };

    let search_options = SearchOptions {
        follow_links: arguments.follow_links,
    };
    for orphan in search_orphans(&arguments.directory, &extensions, &search_options) {
        println!("{}", orphan?.display());
    }

    Ok(())
}
