use std::fs;
use std::path::{Path, PathBuf};

use data_encoding::HEXLOWER;
use line_merge_sort::sort::Sort;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[allow(dead_code)]
pub fn write_lines(path: &Path, lines: &[&str]) -> Result<(), anyhow::Error> {
    fs::write(path, lines.concat())?;
    Ok(())
}

/// Lines of a file, terminators kept
#[allow(dead_code)]
pub fn read_lines(path: &Path) -> Result<Vec<Vec<u8>>, anyhow::Error> {
    Ok(read_lines_from(&fs::read(path)?))
}

/// Lines of a file with a missing final terminator added, so records can be compared as a multiset
#[allow(dead_code)]
pub fn read_records(path: &Path) -> Result<Vec<Vec<u8>>, anyhow::Error> {
    let mut lines = read_lines(path)?;
    if let Some(last) = lines.last_mut() {
        if last.last() != Some(&b'\n') {
            last.push(b'\n');
        }
    }
    Ok(lines)
}

#[allow(dead_code)]
pub fn read_lines_from(content: &[u8]) -> Vec<Vec<u8>> {
    content.split_inclusive(|b| *b == b'\n').map(|line| line.to_vec()).collect()
}

/// Random newline terminated lines of lowercase letters, short alphabet to produce duplicates
#[allow(dead_code)]
pub fn random_lines(seed: u64, count: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = Vec::new();
    for _ in 0..count {
        let length = rng.gen_range(0..6);
        for _ in 0..length {
            data.push(b"abcd"[rng.gen_range(0..4)]);
        }
        data.push(b'\n');
    }
    data
}

#[allow(dead_code)]
pub fn temp_file_name(dir: &Path) -> PathBuf {
    dir.join(HEXLOWER.encode(&rand::random::<[u8; 16]>()))
}

/// A sort that accepts chunk sizes of any positive number of bytes
#[allow(dead_code)]
pub fn small_chunk_sort(input: &Path, output: &Path, tmp: &Path, chunk_size_bytes: u64) -> Sort {
    let mut line_sort = Sort::new(input.to_path_buf(), output.to_path_buf());
    line_sort.with_tmp_dir(tmp.to_path_buf());
    line_sort.with_min_chunk_size_bytes(1);
    line_sort.with_chunk_size_bytes(chunk_size_bytes);
    line_sort
}

#[allow(dead_code)]
pub fn spill_files(tmp: &Path) -> Result<usize, anyhow::Error> {
    let mut count = 0;
    for entry in fs::read_dir(tmp)? {
        if entry?.file_name().to_string_lossy().starts_with(".sorter.tmp.") {
            count += 1;
        }
    }
    Ok(count)
}
