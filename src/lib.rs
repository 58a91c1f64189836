//! This crate sorts text files that do not fit in memory, line by line, by raw byte value.
//!
//! Sorting runs in two phases. First the input is read in chunks bounded by a configured number
//! of bytes, each chunk is sorted in memory and written to its own spill file. Then the spill
//! files are merged into the output with a k-way merge that holds a single line per spill file in
//! memory. When the whole input fits into one chunk the spill file is moved to the output
//! instead of being merged.
//!
//! Lines are compared as bytes, no locale or case folding is applied. Equal lines coming from
//! different chunks are written in the order the chunks were read. The last line of the input
//! may lack the terminating '\n'. It is sorted as if it had one and gets one only when another
//! line follows it in the output, so lines are never joined.
//!
//! Known limitations:
//! * a failed merge leaves the partially written output and all spill files on disk, spill files
//!   are removed only after a successful sort
//! * all spill files are open at the same time during the merge, the number of spill files is
//!   bounded by the input size divided by the chunk size
//!
//! # Examples
//! ```
//! use std::path::PathBuf;
//! use line_merge_sort::sort::Sort;
//!
//! fn sort_lines(input: PathBuf, output: PathBuf, tmp: PathBuf) -> Result<(), anyhow::Error> {
//!     let mut line_sort = Sort::new(input, output);
//!
//!     // set the directory for spill files. The default is the system temp dir -
//!     // std::env::temp_dir(), however, for large files it is recommended to provide a dedicated
//!     // directory for spill files, preferably on the same file system as the output.
//!     line_sort.with_tmp_dir(tmp);
//!
//!     // memory used for sorting is bounded by the chunk size. It must not exceed the physical
//!     // memory of the machine.
//!     line_sort.with_chunk_size_mb(100);
//!
//!     line_sort.sort()
//! }
//! ```
//!

pub(crate) mod line_reader;
pub(crate) mod merge_source;
pub(crate) mod memory;

pub mod chunk_sorter;
pub mod config;
pub mod error;
pub mod generator;
pub mod merger;
pub mod sort;
pub mod spill_store;
