use std::cmp::{max, min};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};

use crate::chunk_sorter::split_and_sort;
use crate::config::{validate_chunk_size, Config, DEFAULT_MAX_LINE_LENGTH, MAX_CHUNK_SIZE_BYTES, MIN_CHUNK_SIZE_BYTES};
use crate::error::SortError;
use crate::line_reader::LineReader;
use crate::memory::total_memory;
use crate::merger::merge;
use crate::spill_store::SpillStore;

/// Sort a text file line by line, by raw byte value, using bounded memory.
///
/// # Examples
/// ```
/// use std::path::PathBuf;
/// use line_merge_sort::sort::Sort;
///
/// fn sort_lines(input: PathBuf, output: PathBuf, tmp: PathBuf) -> Result<(), anyhow::Error> {
///     let mut line_sort = Sort::new(input, output);
///     // set the directory for spill files. The default is the system temp dir -
///     // std::env::temp_dir(), for large files it is recommended to provide a dedicated
///     // directory on the same file system as the output.
///     line_sort.with_tmp_dir(tmp);
///     // each chunk read into memory holds about 64 MB of lines
///     line_sort.with_chunk_size_bytes(64 * 1024 * 1024);
///     line_sort.sort()
/// }
/// ```
pub struct Sort {
    input: PathBuf,
    output: PathBuf,
    tmp: PathBuf,
    chunk_size_bytes: u64,
    min_chunk_size_bytes: u64,
    max_line_length: usize,
}

impl Sort {
    /// Create a default Sort definition.
    ///
    /// * spill files go to std::env::temp_dir()
    /// * input is read in chunks of 10 MB
    /// * the smallest accepted chunk size is 1 MiB
    /// * the longest accepted line is 1 MiB, terminator included
    pub fn new(input: PathBuf, output: PathBuf) -> Sort {
        Sort {
            input,
            output,
            tmp: std::env::temp_dir(),
            chunk_size_bytes: 10_000_000,
            min_chunk_size_bytes: MIN_CHUNK_SIZE_BYTES,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }

    /// Set directory for spill files. By default use std::env::temp_dir()
    pub fn with_tmp_dir(&mut self, tmp: PathBuf) {
        self.tmp = tmp;
    }

    /// The input will be read in chunks of 'chunk_size_bytes' respecting line boundaries
    pub fn with_chunk_size_bytes(&mut self, chunk_size_bytes: u64) {
        self.chunk_size_bytes = chunk_size_bytes;
    }

    /// The input will be read in chunks of 'chunk_size_mb' decimal megabytes (1 MB = 1,000,000
    /// bytes) respecting line boundaries. Sizes that do not fit into u64 saturate and are then
    /// rejected by the chunk size ceiling.
    pub fn with_chunk_size_mb(&mut self, chunk_size_mb: u64) {
        self.chunk_size_bytes = chunk_size_mb.saturating_mul(1_000_000);
    }

    /// Lower or raise the smallest accepted chunk size. A zero chunk size is always rejected.
    pub fn with_min_chunk_size_bytes(&mut self, min_chunk_size_bytes: u64) {
        self.min_chunk_size_bytes = min_chunk_size_bytes;
    }

    /// Set the maximum line length, terminator included. Longer lines fail the sort.
    pub fn with_max_line_length(&mut self, max_line_length: usize) {
        self.max_line_length = max_line_length;
    }

    /// Sort the input file into the output file.
    ///
    /// Every line, including an unterminated last line of the input, is sorted as a '\n'
    /// terminated record. The output ends without '\n' only when the input did and its last line
    /// is also the last line of the output.
    ///
    /// Spill files are removed only when the sort succeeds. On failure they are left in the
    /// temp directory together with any partially written output.
    pub fn sort(&self) -> Result<(), anyhow::Error> {
        let config = self.create_config()?;
        log::info!(
            "Start sort of {} into {}, chunk size: {} bytes, tmp: {}",
            self.input.to_string_lossy(),
            self.output.to_string_lossy(),
            config.chunk_size_bytes(),
            config.tmp().to_string_lossy(),
        );

        let mut spill_store = SpillStore::new(config.tmp());
        let spills = split_and_sort(&self.input, config.chunk_size_bytes(), config.max_line_length(), &mut spill_store)
            .context("split and sort")?;

        if spills.len() == 1 {
            log::info!("Single chunk, moving {} to {}", spills[0].to_string_lossy(), self.output.to_string_lossy());
            move_file(&spills[0], &self.output)?;
        } else {
            Self::internal_merge(&spills, &self.output, &config).context("merge")?;
        }

        if let Some(line) = spill_store.unterminated_last_line() {
            strip_terminator_if_last(&self.output, line).context("restore unterminated last line")?;
        }

        spill_store.remove_all().context("cleanup")?;
        log::info!("Finish sort");
        Ok(())
    }

    /// Check that the input file is sorted by raw byte value
    pub fn check(&self) -> Result<bool, anyhow::Error> {
        check(&self.input, self.max_line_length)
    }

    fn create_config(&self) -> Result<Config, anyhow::Error> {
        validate_chunk_size(
            self.chunk_size_bytes,
            self.min_chunk_size_bytes,
            MAX_CHUNK_SIZE_BYTES,
            total_memory(),
        )?;

        if self.max_line_length == 0 {
            return Err(SortError::InvalidArgument("max line length must be greater than zero".to_string()).into());
        }

        Ok(Config::new(self.tmp.clone(), self.chunk_size_bytes, self.max_line_length))
    }

    fn internal_merge(spills: &[PathBuf], output: &Path, config: &Config) -> Result<usize, anyhow::Error> {
        let limits = raise_nofile_limit(spills.len())?;
        let result = merge(spills, output, config.max_line_length());
        if let Some((current_soft, current_hard)) = limits {
            log::info!("Restore rlimit NOFILE, soft: {}, hard: {}", current_soft, current_hard);
            set_nofile_limit(current_soft, current_hard)?;
        }
        result
    }
}

/// Sort `source` into `output` using `tmp` for spill files and chunks of `chunk_size_bytes`
pub fn sort(source: &Path, output: &Path, tmp: &Path, chunk_size_bytes: u64) -> Result<(), anyhow::Error> {
    let mut line_sort = Sort::new(source.to_path_buf(), output.to_path_buf());
    line_sort.with_tmp_dir(tmp.to_path_buf());
    line_sort.with_chunk_size_bytes(chunk_size_bytes);
    line_sort.sort()
}

/// Check that the lines of `path` are in non decreasing raw byte order. A last line without
/// '\n' compares as if it had one, the same way [Sort::sort] orders it.
pub fn check(path: &Path, max_line_length: usize) -> Result<bool, anyhow::Error> {
    let file = File::open(path).with_context(|| format!("open: {}", path.to_string_lossy()))?;
    let mut reader = LineReader::new(BufReader::new(file), max_line_length);
    let mut previous: Option<Vec<u8>> = None;
    while let Some(mut line) = reader.read_line()? {
        if line.last() != Some(&b'\n') {
            line.push(b'\n');
        }
        if let Some(previous_line) = &previous {
            if previous_line > &line {
                return Ok(false);
            }
        }
        previous = Some(line);
    }
    Ok(true)
}

/// Remove the final '\n' of `output` when its last line is `line`.
///
/// `line` is the unterminated last input line with '\n' added. Equal lines sort before it, so
/// the output ends with `line` exactly when that input line was written last.
pub(crate) fn strip_terminator_if_last(output: &Path, line: &[u8]) -> Result<bool, anyhow::Error> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(output)
        .with_context(|| format!("open output: {}", output.to_string_lossy()))?;
    let len = file.metadata()?.len();
    let line_len = line.len() as u64;
    if line_len == 0 || len < line_len {
        return Ok(false);
    }

    // read one byte before the line too, it must be a line boundary
    let start = (len - line_len).saturating_sub(1);
    file.seek(SeekFrom::Start(start))?;
    let mut tail = vec![0u8; (len - start) as usize];
    file.read_exact(&mut tail)?;
    let last_line = if len == line_len {
        &tail[..]
    } else if tail[0] == b'\n' {
        &tail[1..]
    } else {
        return Ok(false);
    };

    if last_line != line {
        return Ok(false);
    }
    file.set_len(len - 1)
        .with_context(|| format!("truncate output: {}", output.to_string_lossy()))?;
    log::debug!("Removed terminator added to the last line of {}", output.to_string_lossy());
    Ok(true)
}

/// Move `from` to `to`, copying when a rename is not possible, e.g. across file systems
pub(crate) fn move_file(from: &Path, to: &Path) -> Result<(), anyhow::Error> {
    if let Err(e) = std::fs::rename(from, to) {
        log::debug!("Rename {} to {} failed: {}, falling back to copy", from.to_string_lossy(), to.to_string_lossy(), e);
        std::fs::copy(from, to)
            .with_context(|| anyhow!("Copy {} to {}", from.to_string_lossy(), to.to_string_lossy()))?;
        std::fs::remove_file(from)
            .with_context(|| anyhow!("Remove {}", from.to_string_lossy()))?;
    }
    Ok(())
}

#[cfg(unix)]
fn raise_nofile_limit(files: usize) -> Result<Option<(u64, u64)>, anyhow::Error> {
    let (current_soft, current_hard) = rlimit::getrlimit(rlimit::Resource::NOFILE).with_context(|| "getrlimit")?;
    log::info!("Current rlimit NOFILE, soft: {}, hard: {}", current_soft, current_hard);
    let new_soft = min(max((files + 256) as u64, current_soft), current_hard);
    if new_soft == current_soft {
        return Ok(None);
    }
    log::info!("Set new rlimit NOFILE, soft: {}, hard: {}", new_soft, current_hard);
    set_nofile_limit(new_soft, current_hard)?;
    Ok(Some((current_soft, current_hard)))
}

#[cfg(not(unix))]
fn raise_nofile_limit(_files: usize) -> Result<Option<(u64, u64)>, anyhow::Error> {
    Ok(None)
}

#[cfg(unix)]
fn set_nofile_limit(soft: u64, hard: u64) -> Result<(), anyhow::Error> {
    rlimit::setrlimit(rlimit::Resource::NOFILE, soft, hard)
        .with_context(|| format!("set rlimit NOFILE, soft: {}, hard: {}", soft, hard))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_nofile_limit(_soft: u64, _hard: u64) -> Result<(), anyhow::Error> {
    Ok(())
}
