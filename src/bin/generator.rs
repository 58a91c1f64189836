//! Generate a file of random fixed length lines to feed the sorter.
//!
//! ```text
//! generator <outfile> <line_count> <line_length>
//! ```
use std::path::PathBuf;

use anyhow::Error;
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use line_merge_sort::generator::Generator;

#[derive(Parser)]
#[command(name = "generator", about = "Generate random lines of ASCII letters")]
struct Cli {
    /// File to write
    outfile: PathBuf,

    /// Number of lines
    line_count: u64,

    /// Letters per line, the newline not included
    line_length: u64,
}

pub fn main() -> Result<(), Error> {
    SimpleLogger::new().with_level(LevelFilter::Info).env().init()?;
    let cli = Cli::parse();
    Generator::new(&cli.outfile, cli.line_count, cli.line_length)?.run()
}
