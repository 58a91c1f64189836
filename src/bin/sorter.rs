//! Sort a text file line by line using bounded memory.
//!
//! ```text
//! sorter <infile> <outfile> <tmp_dir> <tmp_file_size_bytes>
//! sorter --check <infile>
//! ```
use std::path::PathBuf;

use anyhow::{anyhow, Error};
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use line_merge_sort::sort::{check, Sort};
use line_merge_sort::config::DEFAULT_MAX_LINE_LENGTH;

#[derive(Parser)]
#[command(name = "sorter", about = "Sort a text file larger than memory by raw byte value")]
struct Cli {
    /// File to sort
    infile: PathBuf,

    /// File to write sorted lines to
    #[arg(required_unless_present = "check")]
    outfile: Option<PathBuf>,

    /// Directory for spill files
    #[arg(required_unless_present = "check")]
    tmp_dir: Option<PathBuf>,

    /// Bytes of input held in memory per chunk
    #[arg(required_unless_present = "check")]
    tmp_file_size: Option<u64>,

    /// Only check whether <infile> is sorted
    #[arg(long)]
    check: bool,
}

pub fn main() -> Result<(), Error> {
    SimpleLogger::new().with_level(LevelFilter::Info).env().init()?;
    let cli = Cli::parse();

    if cli.check {
        return if check(&cli.infile, DEFAULT_MAX_LINE_LENGTH)? {
            log::info!("{} is sorted", cli.infile.to_string_lossy());
            Ok(())
        } else {
            Err(anyhow!("{} is not sorted", cli.infile.to_string_lossy()))
        };
    }

    let (outfile, tmp_dir, tmp_file_size) = match (cli.outfile, cli.tmp_dir, cli.tmp_file_size) {
        (Some(outfile), Some(tmp_dir), Some(tmp_file_size)) => (outfile, tmp_dir, tmp_file_size),
        _ => return Err(anyhow!("Usage: sorter <infile> <outfile> <tmp_dir> <tmp_file_size>")),
    };

    let mut line_sort = Sort::new(cli.infile, outfile);
    line_sort.with_tmp_dir(tmp_dir);
    line_sort.with_chunk_size_bytes(tmp_file_size);
    line_sort.sort()
}
