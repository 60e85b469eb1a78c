//! Main executable, to be used as cli tool. For help run this command with
//! `-h`.

#![warn(missing_docs)]

use anyhow::Error;
use clap::{Parser, ValueEnum};
use gzip_static::{
    capabilities::Capabilities,
    compress::CompressionLevel,
    extensions::ExtensionSet,
    hash::HashAlgorithm,
    sync::{SyncOptions, sync},
};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Arguments {
    /// The directory containing the static site.
    directory: PathBuf,

    /// A file with extensions to consider when compressing. Use one line per
    /// extension, including the leading dot. If not set, uses built-in list.
    #[arg(short, long)]
    extensions_file: Option<PathBuf>,

    /// The compression level used for gzip compression. Use 11 for zopfli
    /// compression (if available).
    #[arg(short = 'l', long, value_enum, default_value = "9")]
    compression_level: CompressionLevelArgument,

    /// Use zopfli for the compression. Alias for `--compression-level 11`.
    #[arg(long, conflicts_with = "compression_level")]
    zopfli: bool,

    /// Force recompression of all earlier compressed files.
    #[arg(short, long)]
    force: bool,

    /// Remove gzip files for which the parent file is missing and for which
    /// the extension is in the extensions file. For example: page3.html.gz
    /// present but no page3.html is present. In that case page3.html.gz will
    /// be removed.
    #[arg(long)]
    remove_orphans: bool,

    /// Follow symbolic links while traversing the directory.
    #[arg(long)]
    follow_links: bool,

    /// Hash algorithm used to compare files with their compressed versions.
    /// If not set, uses the fastest available one.
    #[arg(long, value_enum)]
    hash_algorithm: Option<HashAlgorithmArgument>,

    /// Print debug information to stderr.
    #[arg(short, long)]
    debug: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CompressionLevelArgument {
    #[value(name = "6")]
    Six,
    #[value(name = "9")]
    Nine,
    #[value(name = "11")]
    Eleven,
}
impl CompressionLevelArgument {
    fn into_compression_level(self) -> CompressionLevel {
        match self {
            CompressionLevelArgument::Six => CompressionLevel::Gzip(6),
            CompressionLevelArgument::Nine => CompressionLevel::Gzip(9),
            CompressionLevelArgument::Eleven => CompressionLevel::Zopfli,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum HashAlgorithmArgument {
    #[value(name = "sha3-256")]
    Sha3_256,
    #[value(name = "xxh3-128")]
    Xxh3_128,
}
impl HashAlgorithmArgument {
    fn into_hash_algorithm(self) -> HashAlgorithm {
        match self {
            HashAlgorithmArgument::Sha3_256 => HashAlgorithm::Sha3_256,
            HashAlgorithmArgument::Xxh3_128 => HashAlgorithm::Xxh3_128,
        }
    }
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

    let extensions = match &arguments.extensions_file {
        Some(extensions_file) => ExtensionSet::read_from_path(extensions_file)?,
        None => ExtensionSet::default(),
    };

    let mut capabilities = Capabilities::detect();
    if let Some(hash_algorithm) = arguments.hash_algorithm {
        capabilities.hash_algorithm = hash_algorithm.into_hash_algorithm();
    }

    let mut sync_options = SyncOptions::default();
    sync_options.compress.level = if arguments.zopfli {
        CompressionLevel::Zopfli
    } else {
        arguments.compression_level.into_compression_level()
    };
    sync_options.search.follow_links = arguments.follow_links;
    sync_options.force = arguments.force;
    sync_options.remove_orphans = arguments.remove_orphans;

    let sync_result = sync(
        &arguments.directory,
        &extensions,
        &sync_options,
        &capabilities,
    )?;

    let directory = arguments.directory.display();
    if sync_result.has_changes() {
        println!("{directory} was updated");
    } else {
        println!("{directory} had no changes");
    }
    println!("Created gzip files: {}", sync_result.created);
    println!("Updated gzip files: {}", sync_result.recompressed);
    println!("Skipped gzip files: {}", sync_result.skipped);
    println!("Deleted gzip files: {}", sync_result.deleted);

    Ok(())
}
