use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::line_reader::LineReader;
use crate::spill_store::SpillStore;

/// Split `source` into chunks of about `chunk_size_bytes`, sort each chunk and write it to a new
/// spill file in `spill_store`.
///
/// A chunk is closed as soon as the bytes read into it reach `chunk_size_bytes`, so a chunk
/// holds at most one line beyond the budget. An empty source produces no spill file.
///
/// A last line without '\n' is sorted and spilled with the terminator added, so it stays a
/// separate record and compares like every other line. It is recorded in `spill_store`, see
/// [SpillStore::unterminated_last_line].
/// Returns the spill file paths in chunk index order. Spill files are not removed here.
pub fn split_and_sort(
    source: &Path,
    chunk_size_bytes: u64,
    max_line_length: usize,
    spill_store: &mut SpillStore,
) -> Result<Vec<PathBuf>, anyhow::Error> {
    let file = File::open(source).with_context(|| format!("open source: {}", source.to_string_lossy()))?;
    let mut reader = LineReader::new(BufReader::new(file), max_line_length);

    loop {
        let (mut chunk, exhausted) = read_chunk(&mut reader, chunk_size_bytes, spill_store)
            .with_context(|| format!("read source: {}, chunk: {}", source.to_string_lossy(), spill_store.len()))?;
        if !chunk.is_empty() {
            chunk.sort();
            write_sorted_chunk(spill_store, chunk)?;
        }
        if exhausted {
            break;
        }
    }

    log::info!("Split {} into {} sorted chunks", source.to_string_lossy(), spill_store.len());
    Ok(spill_store.paths().clone())
}

// Returns the chunk and whether the source is exhausted
fn read_chunk<R: std::io::BufRead>(
    reader: &mut LineReader<R>,
    chunk_size_bytes: u64,
    spill_store: &mut SpillStore,
) -> Result<(Vec<Vec<u8>>, bool), anyhow::Error> {
    let mut chunk = Vec::new();
    let mut read: u64 = 0;
    while read < chunk_size_bytes {
        match reader.read_line()? {
            Some(mut line) => {
                read += line.len() as u64;
                if line.last() != Some(&b'\n') {
                    // only the last line of the source can end without a terminator
                    line.push(b'\n');
                    spill_store.set_unterminated_last_line(line.clone());
                }
                chunk.push(line);
            }
            None => {
                return Ok((chunk, true));
            }
        }
    }
    Ok((chunk, false))
}

fn write_sorted_chunk(spill_store: &mut SpillStore, chunk: Vec<Vec<u8>>) -> Result<(), anyhow::Error> {
    let (index, path, mut writer) = spill_store.create_next()?;
    let mut bytes = 0;
    for line in &chunk {
        writer.write_all(line)
            .with_context(|| format!("write spill file: {}", path.to_string_lossy()))?;
        bytes += line.len();
    }
    writer.flush()
        .with_context(|| format!("flush spill file: {}", path.to_string_lossy()))?;
    log::debug!("Spilled chunk {}, lines: {}, bytes: {}, path: {}", index, chunk.len(), bytes, path.to_string_lossy());
    Ok(())
}
