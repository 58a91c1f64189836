use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::merge_source::MergeSource;

/// Merge sorted files into `output`.
///
/// `output` is created before anything else, so an empty `files` list yields an empty output.
/// The position of a path in `files` is its source index: when heads are equal, the line from the
/// lower index is written first. Only one head line per source is held in memory.
/// Lines are written verbatim. An unterminated line stays unterminated when it is the last line
/// written, otherwise a '\n' is written after it so that it does not run into the next line.
///
/// On error the partially written output is left in place.
/// Returns the number of lines written.
pub fn merge(files: &[PathBuf], output: &Path, max_line_length: usize) -> Result<usize, anyhow::Error> {
    let output_file = File::create(output)
        .with_context(|| format!("create output: {}", output.to_string_lossy()))?;
    let mut merged_writer = BufWriter::new(output_file);

    log::info!("Merging {} sorted files into {}", files.len(), output.to_string_lossy());
    let mut unmerged_files = BinaryHeap::with_capacity(files.len());
    for (index, path) in files.iter().enumerate() {
        let merge_source = MergeSource::new(index, path.clone(), max_line_length)?;
        if !merge_source.is_exhausted() {
            unmerged_files.push(merge_source);
        }
    }

    let mut merged_len: usize = 0;
    let mut missing_terminator = false;
    while let Some(mut current_min) = unmerged_files.pop() {
        let line = current_min.pop_line()?;
        if missing_terminator {
            merged_writer.write_all(b"\n")
                .with_context(|| format!("write output: {}", output.to_string_lossy()))?;
        }
        missing_terminator = line.last() != Some(&b'\n');
        merged_writer.write_all(&line)
            .with_context(|| format!("write output: {}", output.to_string_lossy()))?;
        merged_len += 1;
        if !current_min.is_exhausted() {
            unmerged_files.push(current_min);
        }
    }

    merged_writer.flush()
        .with_context(|| format!("flush output: {}", output.to_string_lossy()))?;
    log::info!("Finished merging sorted files, merged length: {} lines", merged_len);
    Ok(merged_len)
}
