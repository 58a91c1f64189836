use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use rand::Rng;

use crate::config::{GB, MB};
use crate::error::SortError;

/// Longest line the generator produces, terminator excluded
pub const MAX_GENERATED_LINE_LENGTH: u64 = MB;
/// Largest file the generator produces
pub const MAX_GENERATED_FILE_SIZE: u64 = 100 * GB;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const BUFFER_SIZE: usize = 10 * MB as usize;

/// Writes files of random fixed length lines of ASCII letters, used as sort input.
///
/// # Examples
/// ```no_run
/// use std::path::Path;
/// use line_merge_sort::generator::Generator;
///
/// fn generate(output: &Path) -> Result<(), anyhow::Error> {
///     // 1000 lines, each of 32 letters followed by '\n'
///     Generator::new(output, 1000, 32)?.run()
/// }
/// ```
#[derive(Debug)]
pub struct Generator {
    output: PathBuf,
    line_count: u64,
    line_length: u64,
}

impl Generator {
    /// Validate the requested shape. The line length must be in 1..=1 MiB and the resulting file
    /// must not exceed 100 GiB.
    pub fn new(output: &Path, line_count: u64, line_length: u64) -> Result<Generator, anyhow::Error> {
        if line_length == 0 || line_length > MAX_GENERATED_LINE_LENGTH {
            return Err(
                SortError::InvalidArgument(
                    format!("line length can not be zero or greater than {} (got {})", MAX_GENERATED_LINE_LENGTH, line_length)
                ).into()
            );
        }

        match line_length.checked_mul(line_count) {
            Some(file_size) if file_size <= MAX_GENERATED_FILE_SIZE => {}
            _ => {
                return Err(
                    SortError::InvalidArgument(
                        format!("resulting file size is too big, maximum is {}", MAX_GENERATED_FILE_SIZE)
                    ).into()
                );
            }
        }

        Ok(
            Generator {
                output: output.to_path_buf(),
                line_count,
                line_length,
            }
        )
    }

    /// Generate the file using the thread local random generator
    pub fn run(&self) -> Result<(), anyhow::Error> {
        self.run_with_rng(&mut rand::thread_rng())
    }

    /// Generate the file using the given random generator
    pub fn run_with_rng<R: Rng>(&self, rng: &mut R) -> Result<(), anyhow::Error> {
        let file = File::create(&self.output)
            .with_context(|| format!("create: {}", self.output.to_string_lossy()))?;
        let mut writer = BufWriter::with_capacity(BUFFER_SIZE, file);
        let mut line = Vec::with_capacity(self.line_length as usize + 1);
        for _ in 0..self.line_count {
            line.clear();
            line.extend((0..self.line_length).map(|_| LETTERS[rng.gen_range(0..LETTERS.len())]));
            line.push(b'\n');
            writer.write_all(&line)
                .with_context(|| format!("write: {}", self.output.to_string_lossy()))?;
        }
        writer.flush()
            .with_context(|| format!("flush: {}", self.output.to_string_lossy()))?;
        log::info!("Generated {} lines of {} bytes into {}", self.line_count, self.line_length, self.output.to_string_lossy());
        Ok(())
    }
}
